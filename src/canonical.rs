//! The normalized strings that Hawk MACs and payload hashes are computed over.
//!
//! Fields are inserted verbatim, one per line, each followed by `\n`.  Absent optional fields
//! are written as empty lines so that every field keeps its position.

use crate::b64::STANDARD_ENGINE;
use crate::mac::MacType;
use crate::util::unix_secs;
use base64::Engine;
use std::fmt::Write;
use std::time::SystemTime;

const HEADER_VERSION: &str = "1";

/// The request attributes covered by a header, response, or bewit MAC.
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
    pub ts: SystemTime,
    pub nonce: &'a str,
    pub method: &'a str,
    /// Path and query of the request URI.
    pub path: &'a str,
    pub host: &'a str,
    pub port: u16,
    /// Raw payload hash; it appears base64-encoded in the normalized string.
    pub hash: Option<&'a [u8]>,
    pub ext: Option<&'a str>,
    pub app: Option<&'a str>,
    pub dlg: Option<&'a str>,
}

/// Build the normalized string for a MAC of the given type.
///
/// Bewits carry neither a nonce nor a method, so the bewit form always uses an empty nonce and
/// `GET`, whatever the artifacts say.
pub(crate) fn mac_string(mac_type: MacType, artifacts: &Artifacts) -> String {
    let (nonce, method) = match mac_type {
        MacType::Bewit => ("", "GET".to_string()),
        _ => (artifacts.nonce, artifacts.method.to_ascii_uppercase()),
    };

    let mut s = String::with_capacity(128);
    // writing to a String cannot fail
    let _ = write!(
        s,
        "hawk.{}.{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
        HEADER_VERSION,
        mac_type,
        unix_secs(artifacts.ts),
        nonce,
        method,
        artifacts.path,
        artifacts.host,
        artifacts.port,
    );
    if let Some(hash) = artifacts.hash {
        STANDARD_ENGINE.encode_string(hash, &mut s);
    }
    s.push('\n');
    s.push_str(artifacts.ext.unwrap_or_default());
    s.push('\n');

    if let Some(app) = artifacts.app {
        s.push_str(app);
        s.push('\n');
        s.push_str(artifacts.dlg.unwrap_or_default());
        s.push('\n');
    }
    s
}

/// The normalized string for a timestamp MAC.
pub(crate) fn ts_string(ts: SystemTime) -> String {
    format!("hawk.{}.ts\n{}\n", HEADER_VERSION, unix_secs(ts))
}

/// The prefix of the normalized payload string; the payload and a final `\n` follow it.
pub(crate) fn payload_prefix(content_type: &str) -> String {
    format!(
        "hawk.{}.payload\n{}\n",
        HEADER_VERSION,
        normalize_content_type(content_type)
    )
}

/// Drop any parameters (`; charset=..`) and normalize case and whitespace.
pub(crate) fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

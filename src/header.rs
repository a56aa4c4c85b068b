use crate::b64::STANDARD_ENGINE;
use crate::error::*;
use crate::mac::Mac;
use crate::util::{from_unix_secs, unix_secs};
use base64::Engine;
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// The authentication scheme name; it is matched case-sensitively.
pub const SCHEME: &str = "Hawk";

/// Representation of a Hawk `Authorization` header value (the part following "`Hawk `").
///
/// All fields are optional, as the header may be used in several contexts: a request header
/// carries at least `id`, `ts`, `nonce`, and `mac`, while a `Server-Authorization` header
/// carries only `mac`, `ext`, and `hash`.
///
/// The fields are public so that servers can examine them, but clients should build headers
/// with `Request::make_header`.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Header {
    pub id: Option<String>,
    pub ts: Option<SystemTime>,
    pub nonce: Option<String>,
    pub mac: Option<Mac>,
    pub ext: Option<String>,
    pub hash: Option<Vec<u8>>,
    pub app: Option<String>,
    pub dlg: Option<String>,
}

impl Header {
    /// Create a new Header with the full set of Hawk fields.
    ///
    /// This is a low-level function. Headers are more often created from Requests or Responses.
    ///
    /// Note that none of the string-formatted header components can contain the character `\"`.
    #[allow(clippy::too_many_arguments)]
    pub fn new<S>(
        id: Option<S>,
        ts: Option<SystemTime>,
        nonce: Option<S>,
        mac: Option<Mac>,
        ext: Option<S>,
        hash: Option<Vec<u8>>,
        app: Option<S>,
        dlg: Option<S>,
    ) -> Result<Header>
    where
        S: Into<String>,
    {
        Ok(Header {
            id: Header::check_component(id)?,
            ts,
            nonce: Header::check_component(nonce)?,
            mac,
            ext: Header::check_component(ext)?,
            hash,
            app: Header::check_component(app)?,
            dlg: Header::check_component(dlg)?,
        })
    }

    /// Parse a complete `Authorization` header value, including the `Hawk` scheme.
    ///
    /// Parsing is lenient: unknown attributes are skipped, an attribute whose value cannot be
    /// decoded is left unset (as is an empty `hash`), and malformed syntax or a repeated
    /// attribute stops parsing while keeping whatever was read before it.  Callers must treat any attribute they require but find unset as a
    /// verification failure.
    pub fn parse(value: &str) -> Header {
        let mut header = Header::default();
        let mut seen: Vec<&str> = Vec::with_capacity(8);

        let mut p = match Header::strip_scheme(value) {
            Some(rest) => rest,
            None => {
                debug!("Authorization header does not use the {} scheme", SCHEME);
                return header;
            }
        };

        loop {
            // Skip whitespace and commas used as separators
            p = p.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
            if p.is_empty() {
                break;
            }

            // Find first '=' which delimits attribute name from value
            let eq = match p.find('=') {
                Some(v) => v,
                None => {
                    debug!("Hawk header attribute without a value; stopped parsing");
                    break;
                }
            };
            let attr = p[..eq].trim();
            p = p[eq + 1..].trim_start();

            // Hawk does not allow backslash-escapes, so a value is everything up to the
            // next quote.
            if !p.starts_with('"') {
                debug!("unquoted value for Hawk attribute {:?}; stopped parsing", attr);
                break;
            }
            p = &p[1..];
            let end = match p.find('"') {
                Some(v) => v,
                None => {
                    debug!("unterminated value for Hawk attribute {:?}; stopped parsing", attr);
                    break;
                }
            };
            let val = &p[..end];
            p = &p[end + 1..];

            if seen.contains(&attr) {
                debug!("repeated Hawk attribute {:?}; stopped parsing", attr);
                break;
            }
            seen.push(attr);

            match attr {
                "id" => header.id = Some(val.to_string()),
                "ts" => header.ts = i64::from_str(val).ok().and_then(from_unix_secs),
                "nonce" => header.nonce = Some(val.to_string()),
                "mac" => header.mac = STANDARD_ENGINE.decode(val).ok().map(Mac::from),
                "ext" => header.ext = Some(val.to_string()),
                "hash" => {
                    header.hash = STANDARD_ENGINE.decode(val).ok().filter(|h| !h.is_empty())
                }
                "app" => header.app = Some(val.to_string()),
                "dlg" => header.dlg = Some(val.to_string()),
                _ => trace!("ignoring unknown Hawk attribute {:?}", attr),
            };
        }

        header
    }

    /// True if an `Authorization` value names the Hawk scheme.
    pub fn uses_scheme(value: &str) -> bool {
        Header::strip_scheme(value).is_some()
    }

    fn strip_scheme(value: &str) -> Option<&str> {
        value
            .strip_prefix(SCHEME)
            .filter(|rest| rest.starts_with(char::is_whitespace))
    }

    /// Format the header for transmission in an Authorization header, including the `"Hawk "`
    /// prefix.
    pub fn header_value(&self) -> String {
        format!("{} {}", SCHEME, self)
    }

    /// Check a header component for validity.
    fn check_component<S>(value: Option<S>) -> Result<Option<String>>
    where
        S: Into<String>,
    {
        if let Some(value) = value {
            let value = value.into();
            if value.contains('\"') {
                return Err(Error::InvalidHeaderComponent(value));
            }
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Format the header value (without the scheme).
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";

        // write attributes in the order the protocol documents them
        if let Some(ref id) = self.id {
            write!(f, "{}id=\"{}\"", sep, id)?;
            sep = ", ";
        }
        if let Some(ts) = self.ts {
            write!(f, "{}ts=\"{}\"", sep, unix_secs(ts))?;
            sep = ", ";
        }
        if let Some(ref nonce) = self.nonce {
            write!(f, "{}nonce=\"{}\"", sep, nonce)?;
            sep = ", ";
        }
        if let Some(ref mac) = self.mac {
            write!(f, "{}mac=\"{}\"", sep, mac)?;
            sep = ", ";
        }
        if let Some(ref ext) = self.ext {
            write!(f, "{}ext=\"{}\"", sep, ext)?;
            sep = ", ";
        }
        if let Some(ref hash) = self.hash {
            write!(f, "{}hash=\"{}\"", sep, STANDARD_ENGINE.encode(hash))?;
            sep = ", ";
        }
        if let Some(ref app) = self.app {
            write!(f, "{}app=\"{}\"", sep, app)?;
            sep = ", ";
        }
        if let Some(ref dlg) = self.dlg {
            write!(f, "{}dlg=\"{}\"", sep, dlg)?;
        }
        Ok(())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)
    }
}

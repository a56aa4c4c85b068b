use crate::bewit::Bewit;
use crate::canonical::Artifacts;
use crate::credentials::{Credentials, Key};
use crate::crypto::get_cryptographer;
use crate::error::*;
use crate::header::Header;
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use crate::request::RequestState;
use crate::response::ResponseBuilder;
use crate::util::{from_unix_secs, unix_millis, unix_secs};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use log::debug;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::time::{Duration, SystemTime};

/// The default allowed difference between a request's timestamp and the server clock.
pub const DEFAULT_TIMESTAMP_SKEW: Duration = Duration::from_secs(60);

/// A source of credentials, keyed by Hawk id.
///
/// Any error from the store is reported to the caller as `Error::CredentialNotFound`; the
/// underlying error is logged at debug level.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, id: &str) -> std::result::Result<Credentials, failure::Error>;
}

impl<S> CredentialStore for HashMap<String, Credentials, S>
where
    S: BuildHasher + Send + Sync,
{
    fn lookup(&self, id: &str) -> std::result::Result<Credentials, failure::Error> {
        self.get(id)
            .cloned()
            .ok_or_else(|| failure::err_msg(format!("no credentials with id {:?}", id)))
    }
}

/// Replay protection.  `seen` returns true if the nonce has been used before, in which case
/// the request is rejected.  Implementations that remember nonces should do so atomically.
pub trait NonceValidator: Send + Sync {
    fn seen(&self, nonce: &str) -> bool;
}

/// A wall clock, in milliseconds since the epoch.  `offset_msec` is added to the reading to
/// compensate for known local drift.
pub trait Clock: Send + Sync {
    fn now(&self, offset_msec: i64) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, offset_msec: i64) -> i64 {
        unix_millis(SystemTime::now()).saturating_add(offset_msec)
    }
}

/// A clock stopped at the given number of milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self, offset_msec: i64) -> i64 {
        self.0.saturating_add(offset_msec)
    }
}

/// A fresh server timestamp and its MAC, sent with a stale-timestamp rejection so that the
/// client can correct its clock.  `Display` gives the `WWW-Authenticate` header value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampChallenge {
    pub ts: SystemTime,
    pub tsm: Mac,
}

impl fmt::Display for TimestampChallenge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Hawk ts=\"{}\", tsm=\"{}\", error=\"Stale timestamp\"",
            unix_secs(self.ts),
            self.tsm
        )
    }
}

/// Per-request options for `Server::authenticate`.
///
/// # Examples
///
/// ```
/// use hawk::AuthOptions;
/// let body = b"{\"a\": 1}";
/// let options = AuthOptions::new()
///     .host_port("example.com", 443)
///     .payload(body)
///     .content_type("application/json");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthOptions<'a> {
    host_name_header: Option<&'a str>,
    host_port: Option<(&'a str, u16)>,
    payload: Option<&'a [u8]>,
    content_type: Option<&'a str>,
}

impl<'a> AuthOptions<'a> {
    pub fn new() -> Self {
        AuthOptions::default()
    }

    /// Read the request host from this header instead of `Host`, for example
    /// `X-Forwarded-Host` behind a trusted proxy.
    pub fn host_name_header(mut self, name: &'a str) -> Self {
        self.host_name_header = Some(name);
        self
    }

    /// Use this host and port unconditionally, ignoring everything the request says.
    pub fn host_port(mut self, host: &'a str, port: u16) -> Self {
        self.host_port = Some((host, port));
        self
    }

    /// Verify the request's payload hash against this body.  An empty body skips payload
    /// verification.
    pub fn payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Content type for the payload hash; by default the request's `Content-Type` header.
    pub fn content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// The server side of Hawk: verifies request headers and bewits, and signs responses.
///
/// A Server holds no per-request state, and can be shared between threads.
///
/// # Examples
///
/// ```
/// use hawk::{Credentials, Key, ServerBuilder, AuthOptions, SHA256};
/// use std::collections::HashMap;
/// use std::time::Duration;
///
/// let mut store = HashMap::new();
/// store.insert(
///     "dh37fgj492je".to_string(),
///     Credentials {
///         id: "dh37fgj492je".to_string(),
///         key: Key::new("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", SHA256).unwrap(),
///     },
/// );
/// let server = ServerBuilder::new(store)
///     .timestamp_skew(Duration::from_secs(120))
///     .server();
///
/// let req = http::Request::get("https://example.com/resource")
///     .body(())
///     .unwrap();
/// assert!(server.authenticate(&req, &AuthOptions::new()).is_err());
/// ```
pub struct Server {
    credentials: Box<dyn CredentialStore>,
    nonce_validator: Option<Box<dyn NonceValidator>>,
    clock: Box<dyn Clock>,
    timestamp_skew: Duration,
    localtime_offset_msec: i64,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Server")
            .field("nonce_validator", &self.nonce_validator.is_some())
            .field("timestamp_skew", &self.timestamp_skew)
            .field("localtime_offset_msec", &self.localtime_offset_msec)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Authenticate a request carrying a Hawk `Authorization` header, returning the credentials
    /// of the client that signed it.
    ///
    /// The MAC is checked before anything else the header claims; the payload hash, nonce, and
    /// timestamp are only examined for requests with a valid MAC.
    pub fn authenticate<B>(
        &self,
        req: &http::Request<B>,
        options: &AuthOptions,
    ) -> Result<Credentials> {
        let header = self.parse_authorization(req)?;
        let ts = match header.ts {
            Some(ts) => ts,
            None => {
                debug!("Hawk header has no valid ts");
                return Err(Error::InvalidTimestamp);
            }
        };
        let nonce = header.nonce.as_deref().unwrap_or_default();

        let credentials = self.credentials(header.id.as_deref().unwrap_or_default())?;
        let (host, port) = resolve_host_port(req, options)?;
        let path = request_path(req);

        let artifacts = Artifacts {
            ts,
            nonce,
            method: req.method().as_str(),
            path,
            host: &host,
            port,
            hash: header.hash.as_deref(),
            ext: header.ext.as_deref(),
            app: header.app.as_deref(),
            dlg: header.dlg.as_deref(),
        };
        let mac = Mac::new(MacType::Header, &credentials.key, &artifacts)?;
        match header.mac {
            Some(ref header_mac) if *header_mac == mac => {}
            _ => {
                debug!("bad mac for request by {:?}", credentials.id);
                return Err(Error::BadMac);
            }
        }

        if let Some(payload) = options.payload.filter(|p| !p.is_empty()) {
            let header_hash = match header.hash {
                Some(ref hash) => hash,
                None => {
                    debug!("payload hash required but not given");
                    return Err(Error::MissingPayloadHash);
                }
            };
            let content_type = match options.content_type {
                Some(ct) => ct,
                None => req
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default(),
            };
            let hash = PayloadHasher::hash(content_type, credentials.key.algorithm(), payload)?;
            if !get_cryptographer().constant_time_compare(&hash, header_hash) {
                debug!("bad payload hash for request by {:?}", credentials.id);
                return Err(Error::BadPayloadHash);
            }
        }

        if let Some(ref validator) = self.nonce_validator {
            if validator.seen(nonce) {
                debug!("replayed nonce {:?}", nonce);
                return Err(Error::InvalidNonce);
            }
        }

        let now = self.clock.now(self.localtime_offset_msec);
        let skew = unix_secs(ts).saturating_mul(1000).abs_diff(now);
        if u128::from(skew) > self.timestamp_skew.as_millis() {
            debug!("stale timestamp: request is {}ms from server time", skew);
            return Err(Error::StaleTimestamp(
                self.timestamp_challenge(&credentials.key)?,
            ));
        }

        Ok(credentials)
    }

    /// Authenticate a GET or HEAD request carrying a bewit in its query, returning the
    /// credentials that issued it.
    pub fn authenticate_bewit<B>(
        &self,
        req: &http::Request<B>,
        options: &AuthOptions,
    ) -> Result<Credentials> {
        let method = req.method();
        if *method != http::Method::GET && *method != http::Method::HEAD {
            debug!("bewit used with method {}", method);
            return Err(Error::InvalidMethod(method.to_string()));
        }

        let mut path = Cow::Borrowed(request_path(req));
        let bewit = match Bewit::from_path(&mut path)? {
            Some(bewit) => bewit,
            None => return Err(InvalidBewit::Missing.into()),
        };

        let credentials = self.credentials(bewit.id())?;

        let now = self.clock.now(self.localtime_offset_msec);
        if unix_secs(bewit.exp()) < now.div_euclid(1000) {
            debug!("expired bewit for {:?}", credentials.id);
            return Err(Error::StaleBewit);
        }

        let (host, port) = resolve_host_port(req, options)?;
        let artifacts = Artifacts {
            ts: bewit.exp(),
            nonce: "",
            method: "GET",
            path: &path,
            host: &host,
            port,
            hash: None,
            ext: bewit.ext(),
            app: None,
            dlg: None,
        };
        let mac = Mac::new(MacType::Bewit, &credentials.key, &artifacts)?;
        if bewit.mac() != &mac {
            debug!("bad bewit mac for {:?}", credentials.id);
            return Err(Error::BadMac);
        }

        Ok(credentials)
    }

    /// Build the `Server-Authorization` header for a response to an authenticated request.
    ///
    /// `hash` should be the payload hash of the response body, if the client is to verify it.
    pub fn response_header<B>(
        &self,
        req: &http::Request<B>,
        options: &AuthOptions,
        credentials: &Credentials,
        hash: Option<Vec<u8>>,
        ext: Option<&str>,
    ) -> Result<Header> {
        let header = self.parse_authorization(req)?;
        let state = RequestState {
            ts: header.ts.ok_or(Error::InvalidTimestamp)?,
            nonce: header.nonce.clone().unwrap_or_default(),
        };
        let (host, port) = resolve_host_port(req, options)?;
        ResponseBuilder::from_request_state(
            &state,
            req.method().as_str(),
            &host,
            port,
            request_path(req),
        )
        .hash(hash)
        .ext(ext)
        .app(header.app.as_deref())
        .dlg(header.dlg.as_deref())
        .response()
        .make_header(&credentials.key)
    }

    /// Generate a fresh timestamp MAC from the server clock, for a `WWW-Authenticate` header.
    pub fn timestamp_challenge(&self, key: &Key) -> Result<TimestampChallenge> {
        let now = self.clock.now(self.localtime_offset_msec);
        let ts = from_unix_secs(now.div_euclid(1000)).ok_or(Error::InvalidTimestamp)?;
        Ok(TimestampChallenge {
            ts,
            tsm: Mac::new_ts(key, ts)?,
        })
    }

    fn parse_authorization<B>(&self, req: &http::Request<B>) -> Result<Header> {
        let value = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| Header::uses_scheme(v))
            .ok_or_else(|| {
                debug!("request has no Hawk Authorization header");
                Error::MissingAuthorization
            })?;
        Ok(Header::parse(value))
    }

    fn credentials(&self, id: &str) -> Result<Credentials> {
        let credentials = self.credentials.lookup(id).map_err(|e| {
            debug!("credential lookup for {:?} failed: {}", id, e);
            Error::CredentialNotFound(id.to_string())
        })?;
        if credentials.key.is_empty() {
            debug!("credentials for {:?} have an empty key", id);
            return Err(Error::InvalidCredential);
        }
        Ok(credentials)
    }
}

/// Builder for a `Server`.  Only the credential store is required.
pub struct ServerBuilder(Server);

impl ServerBuilder {
    pub fn new<C>(credentials: C) -> Self
    where
        C: CredentialStore + 'static,
    {
        ServerBuilder(Server {
            credentials: Box::new(credentials),
            nonce_validator: None,
            clock: Box::new(SystemClock),
            timestamp_skew: DEFAULT_TIMESTAMP_SKEW,
            localtime_offset_msec: 0,
        })
    }

    /// Reject requests whose nonce the validator has seen.  Without one, nonces are not checked.
    pub fn nonce_validator<N>(mut self, validator: N) -> Self
    where
        N: NonceValidator + 'static,
    {
        self.0.nonce_validator = Some(Box::new(validator));
        self
    }

    /// Replace the system clock.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.0.clock = Box::new(clock);
        self
    }

    /// Set the allowed timestamp skew.  Zero restores the default of 60 seconds.
    pub fn timestamp_skew(mut self, skew: Duration) -> Self {
        self.0.timestamp_skew = if skew.is_zero() {
            DEFAULT_TIMESTAMP_SKEW
        } else {
            skew
        };
        self
    }

    /// Offset, in milliseconds, added to every clock reading.
    pub fn localtime_offset_msec(mut self, offset: i64) -> Self {
        self.0.localtime_offset_msec = offset;
        self
    }

    pub fn server(self) -> Server {
        self.0
    }
}

fn request_path<B>(req: &http::Request<B>) -> &str {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
}

/// Determine the host and port the client signed: the configured override, else the alternate
/// host header, else `Host`, else the request URI.
fn resolve_host_port<B>(req: &http::Request<B>, options: &AuthOptions) -> Result<(String, u16)> {
    if let Some((host, port)) = options.host_port {
        return Ok((host.to_string(), port));
    }

    let default_port = match req.uri().scheme_str() {
        Some("https") => 443,
        _ => 80,
    };

    let header_value = options
        .host_name_header
        .and_then(|name| req.headers().get(name))
        .or_else(|| req.headers().get(HOST));
    if let Some(value) = header_value {
        let value = value
            .to_str()
            .map_err(|_| Error::InvalidUrl("host header is not valid ASCII".to_string()))?;
        let (host, port) = split_host_port(value)?;
        return Ok((host.to_string(), port.unwrap_or(default_port)));
    }

    match req.uri().host() {
        Some(host) => Ok((
            host.to_string(),
            req.uri().port_u16().unwrap_or(default_port),
        )),
        None => Err(Error::InvalidUrl(format!("request {} has no host", req.uri()))),
    }
}

/// Split `host[:port]`, where the host may be a bracketed IPv6 address.
fn split_host_port(value: &str) -> Result<(&str, Option<u16>)> {
    let invalid = || Error::InvalidUrl(format!("invalid host {:?}", value));
    let value = value.trim();

    let (host, rest) = if value.starts_with('[') {
        let end = value.find(']').ok_or_else(invalid)?;
        value.split_at(end + 1)
    } else {
        match value.find(':') {
            Some(i) => value.split_at(i),
            None => (value, ""),
        }
    };
    if host.is_empty() {
        return Err(invalid());
    }

    let port = if rest.is_empty() {
        None
    } else {
        let port = rest.strip_prefix(':').ok_or_else(invalid)?;
        Some(port.parse::<u16>().map_err(|_| invalid())?)
    };
    Ok((host, port))
}

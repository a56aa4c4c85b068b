use crate::bewit::Bewit;
use crate::canonical::Artifacts;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::Header;
use crate::mac::{Mac, MacType};
use crate::response::ResponseBuilder;
use crate::server::{Clock, SystemClock};
use crate::util::{from_unix_secs, random_string};
use std::time::{Duration, SystemTime};
use url::{Position, Url};

/// The parts of an HTTP request that a Hawk MAC covers.
///
/// Built with a [`RequestBuilder`].  The string fields borrow from the caller, and a builder
/// with the fixed parts filled in (host and port, say) can be cloned for each request.  A
/// client uses a `Request` to produce an `Authorization` header or a bewit, and a server to
/// start building its signed response.
///
/// # Examples
///
/// ```
/// use hawk::RequestBuilder;
/// let bldr = RequestBuilder::new("GET", "mysite.com", 443, "/");
/// let request1 = bldr.clone().method("POST").path("/api/user").request();
/// let request2 = bldr.path("/api/users").request();
/// ```
///
/// The crate root has complete client and server examples.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    method: &'a str,
    host: &'a str,
    port: u16,
    path: &'a str,
    hash: Option<Vec<u8>>,
    ext: Option<&'a str>,
    app: Option<&'a str>,
    dlg: Option<&'a str>,
}

impl<'a> Request<'a> {
    /// Sign the request with a fresh [`RequestState`]: the current time and a random nonce.
    pub fn make_header(&self, credentials: &Credentials) -> Result<Header> {
        self.make_header_full(credentials, &RequestState::new()?)
    }

    /// Sign the request with a caller-supplied timestamp and nonce.  Keep `state` to validate
    /// the response.
    pub fn make_header_full(
        &self,
        credentials: &Credentials,
        state: &RequestState,
    ) -> Result<Header> {
        let mac = Mac::new(
            MacType::Header,
            &credentials.key,
            &self.artifacts(state.ts, &state.nonce),
        )?;

        Header::new(
            Some(credentials.id.as_str()),
            Some(state.ts),
            Some(state.nonce.as_str()),
            Some(mac),
            self.ext,
            self.hash.clone(),
            self.app,
            self.dlg,
        )
    }

    /// Make a "bewit" that can be attached to a URL to authenticate GET access.
    ///
    /// The bewit expires at `exp`.  The path and host of this request are covered by the MAC,
    /// so the bewit is only good for this URL; `ext` is carried in the bewit itself.
    pub fn make_bewit(&self, credentials: &'a Credentials, exp: SystemTime) -> Result<Bewit<'a>> {
        // The request "nonce" and method are fixed for bewits, and the expiration time stands
        // in for the timestamp.
        let mac = Mac::new(MacType::Bewit, &credentials.key, &self.artifacts(exp, ""))?;
        Ok(Bewit::new(&credentials.id, exp, mac, self.ext))
    }

    /// Variant of `make_bewit` that takes a time-to-live instead of an explicit expiration.
    pub fn make_bewit_with_ttl(
        &self,
        credentials: &'a Credentials,
        ttl: Duration,
    ) -> Result<Bewit<'a>> {
        self.make_bewit_with_clock(credentials, ttl, &SystemClock)
    }

    /// Variant of `make_bewit_with_ttl` that reads the current time from `clock`.  The
    /// expiration is truncated to whole seconds.
    pub fn make_bewit_with_clock(
        &self,
        credentials: &'a Credentials,
        ttl: Duration,
        clock: &dyn Clock,
    ) -> Result<Bewit<'a>> {
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| Error::InvalidTimestamp)?;
        let exp = (clock.now(0) / 1000)
            .checked_add(ttl_secs)
            .and_then(from_unix_secs)
            .ok_or(Error::InvalidTimestamp)?;
        self.make_bewit(credentials, exp)
    }

    /// Get a Response instance for a response to this request.  This is a convenience
    /// wrapper around `Response::from_request_state`.
    pub fn make_response_builder(&self, req_state: &'a RequestState) -> ResponseBuilder<'a> {
        ResponseBuilder::from_request_state(
            req_state,
            self.method,
            self.host,
            self.port,
            self.path,
        )
        .app(self.app)
        .dlg(self.dlg)
    }

    pub(crate) fn artifacts<'b>(&'b self, ts: SystemTime, nonce: &'b str) -> Artifacts<'b> {
        Artifacts {
            ts,
            nonce,
            method: self.method,
            path: self.path,
            host: self.host,
            port: self.port,
            hash: self.hash.as_deref(),
            ext: self.ext,
            app: self.app,
            dlg: self.dlg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder<'a>(Request<'a>);

impl<'a> RequestBuilder<'a> {
    /// Start a request from its method and target.
    pub fn new(method: &'a str, host: &'a str, port: u16, path: &'a str) -> Self {
        RequestBuilder(Request {
            method,
            host,
            port,
            path,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        })
    }

    /// Start a request for `url`.  The port falls back to the scheme's default, and the path
    /// keeps the query string.
    pub fn from_url(method: &'a str, url: &'a Url) -> Result<Self> {
        let (host, port, path) = RequestBuilder::parse_url(url)?;
        Ok(RequestBuilder(Request {
            method,
            host,
            port,
            path,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        }))
    }

    /// Upper-case HTTP method, such as `GET`.
    pub fn method(mut self, method: &'a str) -> Self {
        self.0.method = method;
        self
    }

    /// Path and query, exactly as sent.
    pub fn path(mut self, path: &'a str) -> Self {
        self.0.path = path;
        self
    }

    pub fn host(mut self, host: &'a str) -> Self {
        self.0.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.0.port = port;
        self
    }

    /// Replace the host, port and path with those of `url`.
    pub fn url(self, url: &'a Url) -> Result<Self> {
        let (host, port, path) = RequestBuilder::parse_url(url)?;
        Ok(self.path(path).host(host).port(port))
    }

    /// Payload hash, as produced by `PayloadHasher`.
    pub fn hash<H: Into<Option<Vec<u8>>>>(mut self, hash: H) -> Self {
        self.0.hash = hash.into();
        self
    }

    /// Application data to sign along with the request.
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    pub fn app<S: Into<Option<&'a str>>>(mut self, app: S) -> Self {
        self.0.app = app.into();
        self
    }

    /// `app` and `dlg` identify the application and its delegate, and are signed when set.
    pub fn dlg<S: Into<Option<&'a str>>>(mut self, dlg: S) -> Self {
        self.0.dlg = dlg.into();
        self
    }

    pub fn request(self) -> Request<'a> {
        self.0
    }

    fn parse_url(url: &'a Url) -> Result<(&'a str, u16, &'a str)> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no port", url)))?;
        let path = &url[Position::BeforePath..Position::AfterQuery];
        Ok((host, port, path))
    }
}

/// The per-request state a client generates: the timestamp and nonce of its `Authorization`
/// header.  Keep it around to validate the server's response.
#[derive(Debug, Clone)]
pub struct RequestState {
    pub ts: SystemTime,
    pub nonce: String,
}

impl RequestState {
    /// Generate state for a new request: the current time and a random nonce.
    pub fn new() -> Result<RequestState> {
        Ok(RequestState {
            ts: SystemTime::now(),
            nonce: random_string(10)?,
        })
    }
}

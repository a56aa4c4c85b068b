use crate::canonical::Artifacts;
use crate::credentials::Key;
use crate::crypto::get_cryptographer;
use crate::error::*;
use crate::header::Header;
use crate::mac::{Mac, MacType};
use crate::request::RequestState;
use log::debug;

/// The server's half of a Hawk exchange.
///
/// A server uses it to sign a `Server-Authorization` header, and a client to check one.  The
/// response MAC reuses the request's timestamp, nonce, method, target, `app` and `dlg`, so it
/// only verifies as the reply to that one request.  Build it with a [`ResponseBuilder`].
#[derive(Debug, Clone)]
pub struct Response<'a> {
    method: &'a str,
    host: &'a str,
    port: u16,
    path: &'a str,
    reqstate: &'a RequestState,
    hash: Option<Vec<u8>>,
    ext: Option<&'a str>,
    app: Option<&'a str>,
    dlg: Option<&'a str>,
}

impl<'a> Response<'a> {
    /// Sign the response.  The header carries only `mac`, `hash` and `ext`.
    pub fn make_header(&self, key: &Key) -> Result<Header> {
        let mac = Mac::new(
            MacType::Response,
            key,
            &self.artifacts(self.hash.as_deref(), self.ext),
        )?;

        Header::new(
            None,
            None,
            None,
            Some(mac),
            self.ext,
            self.hash.clone(),
            None,
            None,
        )
    }

    /// Check a server's `Server-Authorization` header against this response.
    ///
    /// The MAC must match.  When a payload hash was set on this response, the header must
    /// carry the same hash; a hash the client did not ask about is covered by the MAC alone.
    pub fn validate_header(&self, response_header: &Header, key: &Key) -> bool {
        match self.check_header(response_header, key) {
            Ok(()) => true,
            Err(reason) => {
                debug!("rejecting Server-Authorization header: {}", reason);
                false
            }
        }
    }

    fn check_header(&self, header: &Header, key: &Key) -> std::result::Result<(), String> {
        let given = header.mac.as_ref().ok_or("no mac")?;
        let artifacts = self.artifacts(header.hash.as_deref(), header.ext.as_deref());
        let expected = Mac::new(MacType::Response, key, &artifacts).map_err(|e| e.to_string())?;
        if &expected != given {
            return Err("mac mismatch".into());
        }

        // ts and nonce came from this client, so only the payload hash is left
        if let Some(local) = &self.hash {
            let remote = header.hash.as_ref().ok_or("payload hash required but not given")?;
            if !get_cryptographer().constant_time_compare(local, remote) {
                return Err("payload hash mismatch".into());
            }
        }
        Ok(())
    }

    fn artifacts<'b>(&'b self, hash: Option<&'b [u8]>, ext: Option<&'b str>) -> Artifacts<'b> {
        Artifacts {
            ts: self.reqstate.ts,
            nonce: &self.reqstate.nonce,
            method: self.method,
            path: self.path,
            host: self.host,
            port: self.port,
            hash,
            ext,
            app: self.app,
            dlg: self.dlg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseBuilder<'a>(Response<'a>);

impl<'a> ResponseBuilder<'a> {
    /// Start a response to the request signed with `reqstate`.  `Request::make_response_builder`
    /// fills in the rest from the request itself.
    pub fn from_request_state(
        reqstate: &'a RequestState,
        method: &'a str,
        host: &'a str,
        port: u16,
        path: &'a str,
    ) -> Self {
        ResponseBuilder(Response {
            method,
            host,
            port,
            path,
            reqstate,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        })
    }

    /// Payload hash of the response body.  On the client, compute it from the body that
    /// arrived; never copy it from the header being validated.
    pub fn hash<H: Into<Option<Vec<u8>>>>(mut self, hash: H) -> Self {
        self.0.hash = hash.into();
        self
    }

    /// Server-side application data.  Validation reads `ext` from the header instead.
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    /// The `app` and `dlg` of the request being answered.  They are part of the response MAC
    /// when `app` is set.
    pub fn app<S: Into<Option<&'a str>>>(mut self, app: S) -> Self {
        self.0.app = app.into();
        self
    }

    pub fn dlg<S: Into<Option<&'a str>>>(mut self, dlg: S) -> Self {
        self.0.dlg = dlg.into();
        self
    }

    pub fn response(self) -> Response<'a> {
        self.0
    }
}

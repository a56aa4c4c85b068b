use crate::error::*;
use crate::{Credentials, RequestBuilder, RequestState};
use http::header::AUTHORIZATION;

pub trait SignRequest: Sized {
    /// Sign a request using the given credentials.  The `build` callable can add any additional
    /// desired attributes to the hawk::RequestBuilder, such as `ext` or a hash.
    ///
    /// The method and URI must already be set on the request.  A URI without a port uses the
    /// default for its scheme.
    fn sign_hawk<F>(self, credentials: &Credentials, rs: &RequestState, build: F) -> Result<Self>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder;
}

impl SignRequest for http::request::Builder {
    fn sign_hawk<F>(self, credentials: &Credentials, rs: &RequestState, build: F) -> Result<Self>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let header = {
            let method = self
                .method_ref()
                .ok_or_else(|| Error::InvalidMethod("request does not have a method".to_string()))?
                .as_str();
            let uri = self
                .uri_ref()
                .ok_or_else(|| Error::InvalidUrl("request does not have a uri".to_string()))?;
            let host = uri
                .host()
                .ok_or_else(|| Error::InvalidUrl(format!("request uri {} has no host", uri)))?;
            let port = uri.port_u16().unwrap_or(match uri.scheme_str() {
                Some("https") => 443,
                _ => 80,
            });
            let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

            let bldr = build(RequestBuilder::new(method, host, port, path));
            bldr.request().make_header_full(credentials, rs)?
        };
        Ok(self.header(AUTHORIZATION, header.header_value()))
    }
}

//! The `hawk` crate provides support for [Hawk](https://github.com/hueniverse/hawk)
//! authentication: signing requests on the client, verifying them on the server, signed
//! responses, and bewits.  It does not perform any I/O; servers pass it `http::Request` values.
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client can attach a Hawk Authorization header to requests by providing credentials to a
//! Request instance, which will generate the header.
//!
//! ```
//! use hawk::{RequestBuilder, Credentials, Key, SHA256, PayloadHasher};
//!
//! // provide the Hawk id and key
//! let credentials = Credentials {
//!     id: "test-client".to_string(),
//!     key: Key::new(vec![99u8; 32], SHA256).unwrap(),
//! };
//!
//! let payload_hash = PayloadHasher::hash("text/plain", SHA256, "request-body").unwrap();
//!
//! // provide the details of the request to be authorized
//! let request = RequestBuilder::new("POST", "example.com", 80, "/v1/users")
//!     .hash(payload_hash)
//!     .request();
//!
//! // Get the resulting header, including the calculated MAC; this involves a random
//! // nonce, so the MAC will be different on every request.
//! let header = request.make_header(&credentials).unwrap();
//!
//! // the header would then be attached to the request
//! assert_eq!(header.id.unwrap(), "test-client");
//! assert_eq!(header.mac.unwrap().len(), 32);
//! assert_eq!(header.hash.unwrap().len(), 32);
//! ```
//!
//! A client that wishes to use a bewit (URL parameter) can do so as follows:
//!
//! ```
//! use hawk::{RequestBuilder, Credentials, Key, SHA256};
//! use std::time::Duration;
//!
//! let credentials = Credentials {
//!     id: "me".to_string(),
//!     key: Key::new("tok", SHA256).unwrap(),
//! };
//!
//! let client_req = RequestBuilder::new("GET", "mysite.com", 443, "/resource").request();
//! let client_bewit = client_req
//!     .make_bewit_with_ttl(&credentials, Duration::from_secs(10))
//!     .unwrap();
//! let request_path = format!("/resource?bewit={}", client_bewit.to_str());
//! // .. make the request
//! ```
//!
//! ## Hawk Server
//!
//! To act as a server, build a `Server` over a credential store and hand it each incoming
//! request.  On success it returns the credentials of the client that signed the request.
//!
//! ```
//! use hawk::{AuthOptions, Credentials, Error, FixedClock, Key, RequestBuilder, RequestState,
//!            ServerBuilder, SHA256};
//! use std::collections::HashMap;
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let credentials = Credentials {
//!     id: "dh37fgj492je".to_string(),
//!     key: Key::new("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", SHA256).unwrap(),
//! };
//! let mut store = HashMap::new();
//! store.insert(credentials.id.clone(), credentials.clone());
//!
//! let server = ServerBuilder::new(store)
//!     .clock(FixedClock(1353832234000))
//!     .server();
//!
//! // a client signs its request..
//! let state = RequestState {
//!     ts: UNIX_EPOCH + Duration::from_secs(1353832234),
//!     nonce: "j4h3g2".to_string(),
//! };
//! let header = RequestBuilder::new("GET", "example.com", 8000, "/resource/1?b=1&a=2")
//!     .ext("some-app-ext-data")
//!     .request()
//!     .make_header_full(&credentials, &state)
//!     .unwrap();
//!
//! // ..and the server authenticates it
//! let req = http::Request::get("/resource/1?b=1&a=2")
//!     .header("host", "example.com:8000")
//!     .header("authorization", header.header_value())
//!     .body(())
//!     .unwrap();
//! let client = server.authenticate(&req, &AuthOptions::new()).unwrap();
//! assert_eq!(client.id, "dh37fgj492je");
//!
//! // a request without a signature is refused
//! let req = http::Request::get("/resource/1?b=1&a=2")
//!     .header("host", "example.com:8000")
//!     .body(())
//!     .unwrap();
//! assert!(matches!(
//!     server.authenticate(&req, &AuthOptions::new()),
//!     Err(Error::MissingAuthorization)
//! ));
//! ```
//!
//! ## Features
//!
//! By default, the `use_ring` feature is enabled, which means that this crate will
//! use `ring` for all cryptographic operations.
//!
//! Alternatively, one can configure the crate with the `use_openssl`
//! feature to use the `openssl` crate.
//!
//! If no features are enabled, you must provide a custom implementation of the
//! [`crypto::Cryptographer`] trait to the `set_cryptographer` function, or
//! the cryptographic operations will panic.
//!
//! Attempting to configure both the `use_ring` and `use_openssl` features will
//! result in a build error.

#[cfg(all(feature = "use_ring", feature = "use_openssl"))]
compile_error!(
    "`use_ring` and `use_openssl` are mutually exclusive, \
     use `default-features = false` to select `use_openssl`"
);

mod b64;
mod bewit;
mod canonical;
mod credentials;
mod error;
mod header;
mod mac;
mod payload;
mod request;
mod response;
mod server;
mod sign;
mod util;

pub mod crypto;

pub use crate::bewit::Bewit;
pub use crate::canonical::Artifacts;
pub use crate::credentials::{Credentials, Key};
pub use crate::crypto::DigestAlgorithm;
pub use crate::error::*;
pub use crate::header::Header;
pub use crate::mac::{Mac, MacType};
pub use crate::payload::PayloadHasher;
pub use crate::request::{Request, RequestBuilder, RequestState};
pub use crate::response::{Response, ResponseBuilder};
pub use crate::server::{
    AuthOptions, Clock, CredentialStore, FixedClock, NonceValidator, Server, ServerBuilder,
    SystemClock, TimestampChallenge, DEFAULT_TIMESTAMP_SKEW,
};
pub use crate::sign::SignRequest;

/// SHA256, the digest used by most Hawk deployments.
pub const SHA256: DigestAlgorithm = DigestAlgorithm::Sha256;
/// SHA512
pub const SHA512: DigestAlgorithm = DigestAlgorithm::Sha512;

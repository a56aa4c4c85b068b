use crate::crypto::CryptoError;
use crate::server::TimestampChallenge;
use failure::Fail;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way in which signing or verifying a Hawk request can fail.
///
/// Verification failures are ordinary negative results; each variant names a distinct reason.
/// Services facing untrusted clients may want to collapse some of these (for example
/// `CredentialNotFound` and `BadMac`) before reporting them.
#[derive(Fail, Debug)]
pub enum Error {
    #[fail(display = "Missing Authorization header")]
    MissingAuthorization,

    #[fail(display = "Invalid ts value")]
    InvalidTimestamp,

    #[fail(display = "Unknown credentials for id {:?}", _0)]
    CredentialNotFound(String),

    #[fail(display = "Invalid credentials")]
    InvalidCredential,

    #[fail(display = "Bad MAC")]
    BadMac,

    #[fail(display = "Missing required payload hash")]
    MissingPayloadHash,

    #[fail(display = "Bad payload hash")]
    BadPayloadHash,

    #[fail(display = "Invalid nonce")]
    InvalidNonce,

    /// The request timestamp is outside the allowed skew. The challenge carries a fresh
    /// server timestamp and its MAC, suitable for a `WWW-Authenticate` header.
    #[fail(display = "Stale timestamp")]
    StaleTimestamp(TimestampChallenge),

    #[fail(display = "{}", _0)]
    MalformedBewit(#[fail(cause)] InvalidBewit),

    #[fail(display = "Access expired")]
    StaleBewit,

    #[fail(display = "Invalid method for bewit authentication: {}", _0)]
    InvalidMethod(String),

    #[fail(display = "Invalid url: {}", _0)]
    InvalidUrl(String),

    #[fail(display = "Unsupported digest algorithm: {}", _0)]
    UnsupportedAlgorithm(String),

    #[fail(display = "Hawk header components cannot contain `\"`: {}", _0)]
    InvalidHeaderComponent(String),

    #[fail(display = "{}", _0)]
    Crypto(#[fail(cause)] CryptoError),
}

#[derive(Fail, Debug, PartialEq)]
pub enum InvalidBewit {
    #[fail(display = "Multiple bewits in URL")]
    Multiple,
    #[fail(display = "Missing bewit in URL")]
    Missing,
    #[fail(display = "Invalid bewit encoding")]
    Base64,
    #[fail(display = "Invalid bewit format")]
    Format,
    #[fail(display = "Invalid bewit id")]
    Id,
    #[fail(display = "Invalid bewit exp")]
    Exp,
    #[fail(display = "Invalid bewit mac")]
    Mac,
    #[fail(display = "Invalid bewit ext")]
    Ext,
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

impl From<InvalidBewit> for Error {
    fn from(e: InvalidBewit) -> Self {
        Error::MalformedBewit(e)
    }
}

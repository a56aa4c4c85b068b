//! Pluggable cryptographic backends.
//!
//! By default the `ring` backend is used.  Applications that cannot use `ring` may enable the
//! `use_openssl` feature instead, or disable both and install their own [`Cryptographer`] with
//! [`set_cryptographer`] before performing any Hawk operation.

use crate::error::Error;
use failure::Fail;
use std::fmt;
use std::str::FromStr;

mod holder;
pub(crate) use holder::get_cryptographer;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_openssl")]
mod openssl;
#[cfg(feature = "use_openssl")]
pub use self::openssl::OpensslCryptographer;

#[cfg(feature = "use_ring")]
mod ring;
#[cfg(feature = "use_ring")]
pub use self::ring::RingCryptographer;

#[derive(Debug, Fail)]
pub enum CryptoError {
    /// The configured backend cannot compute this digest.
    #[fail(display = "Digest algorithm {} is unsupported by this Cryptographer", _0)]
    UnsupportedDigest(DigestAlgorithm),

    #[fail(display = "{}", _0)]
    Other(failure::Error),
}

/// The hash algorithms Hawk credentials may use.  The same algorithm is used for request MACs
/// and payload hashes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

const ALGORITHM_NAMES: &[(&str, DigestAlgorithm)] = &[
    ("sha256", DigestAlgorithm::Sha256),
    ("sha512", DigestAlgorithm::Sha512),
];

impl DigestAlgorithm {
    /// The lower-case name used for this algorithm in Hawk credentials.
    pub fn name(self) -> &'static str {
        ALGORITHM_NAMES
            .iter()
            .find(|(_, alg)| *alg == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    /// Digest length, in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        ALGORITHM_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, alg)| *alg)
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}

/// A keyed HMAC computation.
pub trait HmacKey: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An incremental, unkeyed digest.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

/// The set of cryptographic primitives Hawk needs from a backend.
pub trait Cryptographer: Send + Sync + 'static {
    fn rand_bytes(&self, output: &mut [u8]) -> Result<(), CryptoError>;
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;
    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;

    /// Compare two byte strings without revealing, through timing, where they first differ.
    /// Inputs of different lengths are never equal.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}

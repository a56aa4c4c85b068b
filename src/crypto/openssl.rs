use super::{CryptoError, Cryptographer, DigestAlgorithm, Hasher, HmacKey};
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;

impl From<ErrorStack> for CryptoError {
    fn from(e: ErrorStack) -> Self {
        CryptoError::Other(e.into())
    }
}

/// A [`Cryptographer`] backed by OpenSSL.  This is installed automatically when the
/// `use_openssl` feature is enabled and `use_ring` is not.
#[derive(Debug, Clone, Copy)]
pub struct OpensslCryptographer;

struct OpensslHmacKey {
    key: PKey<Private>,
    digest: MessageDigest,
}

impl HmacKey for OpensslHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut signer = Signer::new(self.digest, &self.key)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }
}

struct OpensslHasher(openssl::hash::Hasher);

impl Hasher for OpensslHasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.0.update(data)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, CryptoError> {
        Ok(self.0.finish()?.to_vec())
    }
}

impl Cryptographer for OpensslCryptographer {
    fn rand_bytes(&self, output: &mut [u8]) -> Result<(), CryptoError> {
        openssl::rand::rand_bytes(output)?;
        Ok(())
    }

    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        Ok(Box::new(OpensslHmacKey {
            key: PKey::hmac(key)?,
            digest: message_digest(algorithm),
        }))
    }

    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        // memcmp::eq panics on unequal lengths
        a.len() == b.len() && openssl::memcmp::eq(a, b)
    }

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
        let hasher = openssl::hash::Hasher::new(message_digest(algorithm))?;
        Ok(Box::new(OpensslHasher(hasher)))
    }
}

fn message_digest(algorithm: DigestAlgorithm) -> MessageDigest {
    match algorithm {
        DigestAlgorithm::Sha256 => MessageDigest::sha256(),
        DigestAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

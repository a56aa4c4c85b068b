use crate::crypto::{get_cryptographer, DigestAlgorithm};
use crate::error::*;
use std::fmt;

/// Hawk key.
///
/// While any sequence of bytes can be specified as a key, note that each digest algorithm has
/// a suggested key length, and that passwords should *not* be used as keys.  Keys of incorrect
/// length are handled according to the digest's implementation.
#[derive(Clone)]
pub struct Key {
    secret: Vec<u8>,
    algorithm: DigestAlgorithm,
}

impl Key {
    /// Create a key, checking that the active cryptographer supports `algorithm`.
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: AsRef<[u8]>,
    {
        let secret = key.as_ref().to_vec();
        get_cryptographer().new_key(algorithm, &secret)?;
        Ok(Key { secret, algorithm })
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = get_cryptographer().new_key(self.algorithm, &self.secret)?;
        Ok(key.sign(data)?)
    }

    /// The digest used for MACs and payload hashes made with this key.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Hawk credentials: an ID and a key associated with that ID.  The digest algorithm
/// must be agreed between the server and the client, and the length of the key is
/// specific to that algorithm.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub id: String,
    pub key: Key,
}

impl Credentials {
    pub fn new<S, B>(id: S, key: B, algorithm: DigestAlgorithm) -> Result<Credentials>
    where
        S: Into<String>,
        B: AsRef<[u8]>,
    {
        Ok(Credentials {
            id: id.into(),
            key: Key::new(key, algorithm)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_sha256() {
        let key = vec![77u8; 32];
        let key = Key::new(key, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(key.algorithm(), DigestAlgorithm::Sha256);
        assert!(!key.is_empty());
    }

    #[test]
    fn test_new_sha256_bad_length() {
        let key = vec![0u8; 99];
        Key::new(key, DigestAlgorithm::Sha256).unwrap();
    }

    #[test]
    fn test_empty_key() {
        let key = Key::new("", DigestAlgorithm::Sha512).unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = Credentials::new("me", "tok-secret", DigestAlgorithm::Sha256).unwrap();
        let dbg = format!("{:?}", creds);
        assert!(dbg.contains("me"));
        assert!(!dbg.contains("tok-secret"));
    }

    #[test]
    fn test_sign_depends_on_algorithm() {
        let k256 = Key::new("tok", DigestAlgorithm::Sha256).unwrap();
        let k512 = Key::new("tok", DigestAlgorithm::Sha512).unwrap();
        assert_eq!(k256.sign(b"data").unwrap().len(), 32);
        assert_eq!(k512.sign(b"data").unwrap().len(), 64);
    }
}

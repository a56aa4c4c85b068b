use crate::b64::STANDARD_ENGINE;
use crate::canonical;
use crate::crypto::{get_cryptographer, DigestAlgorithm, Hasher};
use crate::error::*;
use base64::Engine;

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a request or response.
///
/// The hash is not keyed: it binds the payload into the MAC, which is what provides
/// authenticity.
pub struct PayloadHasher {
    hasher: Box<dyn Hasher>,
}

impl PayloadHasher {
    /// Create a new PayloadHasher. Parameters of the `content_type` are dropped and it is
    /// lower-cased before hashing. The algorithm should be the one used by the credentials
    /// for the request.
    pub fn new(content_type: &str, algorithm: DigestAlgorithm) -> Result<Self> {
        let mut hasher = PayloadHasher {
            hasher: get_cryptographer().new_hasher(algorithm)?,
        };
        hasher.update(canonical::payload_prefix(content_type))?;
        Ok(hasher)
    }

    /// Hash a single value and return it
    pub fn hash<B>(content_type: &str, algorithm: DigestAlgorithm, payload: B) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Hash a single value and return it as standard base64, the form used in the `hash`
    /// header attribute.
    pub fn hash_base64<B>(content_type: &str, algorithm: DigestAlgorithm, payload: B) -> Result<String>
    where
        B: AsRef<[u8]>,
    {
        Ok(STANDARD_ENGINE.encode(PayloadHasher::hash(content_type, algorithm, payload)?))
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        self.hasher.update(data.as_ref())?;
        Ok(())
    }

    /// Finish hashing and return the result
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.update(b"\n")?;
        Ok(self.hasher.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::PayloadHasher;
    use crate::crypto::DigestAlgorithm::{Sha256, Sha512};

    #[test]
    fn hash_consistency() {
        let mut hasher1 = PayloadHasher::new("text/plain", Sha256).unwrap();
        hasher1.update("pay").unwrap();
        hasher1.update("load").unwrap();
        let hash1 = hasher1.finish().unwrap();

        let mut hasher2 = PayloadHasher::new("text/plain", Sha256).unwrap();
        hasher2.update("payload").unwrap();
        let hash2 = hasher2.finish().unwrap();

        let hash3 = PayloadHasher::hash("text/plain", Sha256, "payload").unwrap();

        // "pay" as the content-type, "load" as the payload
        let hash4 = PayloadHasher::hash("pay", Sha256, "load").unwrap();

        assert_eq!(hash2, hash1);
        assert_eq!(hash3, hash1);
        assert_ne!(hash4, hash1);
    }

    #[test]
    fn protocol_example() {
        assert_eq!(
            PayloadHasher::hash_base64("text/plain", Sha256, "Thank you for flying Hawk").unwrap(),
            "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY="
        );
    }

    #[test]
    fn content_type_parameters_ignored() {
        assert_eq!(
            PayloadHasher::hash("Text/Plain; charset=utf-8", Sha256, "body").unwrap(),
            PayloadHasher::hash("text/plain", Sha256, "body").unwrap(),
        );
    }

    #[test]
    fn algorithm_sensitivity() {
        let h256 = PayloadHasher::hash("text/plain", Sha256, "body").unwrap();
        let h512 = PayloadHasher::hash("text/plain", Sha512, "body").unwrap();
        assert_eq!(h256.len(), 32);
        assert_eq!(h512.len(), 64);
    }
}

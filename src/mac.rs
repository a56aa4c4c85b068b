use crate::b64::STANDARD_ENGINE;
use crate::canonical::{self, Artifacts};
use crate::credentials::Key;
use crate::crypto::get_cryptographer;
use crate::error::*;
use base64::Engine;
use log::trace;
use std::fmt;
use std::ops::Deref;
use std::time::SystemTime;

/// The kind of MAC to calculate.  Each kind has its own tag in the normalized string, so a MAC
/// of one kind never validates as another.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
}

impl fmt::Display for MacType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            MacType::Header => "header",
            MacType::Response => "response",
            MacType::Bewit => "bewit",
        })
    }
}

/// Mac represents a message authentication code, the signature in a Hawk transaction.
///
/// Equality is constant-time, so comparing a received MAC against a computed one does not
/// leak how many leading bytes matched.
#[derive(Debug, Clone)]
pub struct Mac(Vec<u8>);

impl Mac {
    pub fn new(mac_type: MacType, key: &Key, artifacts: &Artifacts) -> Result<Mac> {
        let normalized = canonical::mac_string(mac_type, artifacts);
        trace!("normalized {} string: {:?}", mac_type, normalized);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Calculate the MAC of a bare timestamp.  Servers send this alongside their current time
    /// so that clients can correct for clock skew.
    pub fn new_ts(key: &Key, ts: SystemTime) -> Result<Mac> {
        let normalized = canonical::ts_string(ts);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Standard base64 (with padding) of the MAC, as it appears in headers.
    pub fn to_base64(&self) -> String {
        STANDARD_ENGINE.encode(&self.0)
    }
}

impl From<Vec<u8>> for Mac {
    fn from(original: Vec<u8>) -> Self {
        Mac(original)
    }
}

impl Deref for Mac {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Mac) -> bool {
        get_cryptographer().constant_time_compare(&self.0, &other.0)
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

#[cfg(test)]
mod test {
    use super::{Mac, MacType};
    use crate::canonical::Artifacts;
    use crate::credentials::Key;
    use crate::crypto::DigestAlgorithm;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn key() -> Key {
        Key::new(
            vec![
                11u8, 19, 228, 209, 79, 189, 200, 59, 166, 47, 86, 254, 235, 184, 120, 197, 75,
                152, 201, 79, 115, 61, 111, 242, 219, 187, 173, 14, 227, 108, 60, 232,
            ],
            DigestAlgorithm::Sha256,
        )
        .unwrap()
    }

    fn artifacts(ts: SystemTime) -> Artifacts<'static> {
        Artifacts {
            ts,
            nonce: "nonny",
            method: "POST",
            path: "/v1/api",
            host: "mysite.com",
            port: 443,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        }
    }

    #[test]
    fn test_make_mac() {
        let mac = Mac::new(
            MacType::Header,
            &key(),
            &artifacts(UNIX_EPOCH + Duration::new(1000, 100)),
        )
        .unwrap();
        assert!(
            mac == Mac::from(vec![
                192, 227, 235, 121, 157, 185, 197, 79, 189, 214, 235, 139, 9, 232, 99, 55, 67, 30,
                68, 0, 150, 187, 192, 238, 21, 200, 209, 107, 245, 159, 243, 178
            ])
        );
    }

    #[test]
    fn test_make_mac_hash() {
        let a = Artifacts {
            hash: Some(&[1, 2, 3, 4, 5]),
            ..artifacts(UNIX_EPOCH + Duration::new(1000, 100))
        };
        let mac = Mac::new(MacType::Header, &key(), &a).unwrap();
        assert!(
            mac == Mac::from(vec![
                61, 128, 208, 253, 88, 135, 190, 196, 1, 69, 153, 193, 124, 4, 195, 87, 38, 96,
                181, 34, 65, 234, 58, 157, 175, 175, 145, 151, 61, 0, 57, 5
            ])
        );
    }

    #[test]
    fn test_make_mac_ext() {
        let a = Artifacts {
            ext: Some("ext-data"),
            ..artifacts(UNIX_EPOCH + Duration::new(1000, 100))
        };
        let mac = Mac::new(MacType::Header, &key(), &a).unwrap();
        assert!(
            mac == Mac::from(vec![
                187, 104, 238, 100, 168, 112, 37, 68, 187, 141, 168, 155, 177, 193, 113, 0, 50,
                105, 127, 36, 24, 117, 200, 251, 138, 199, 108, 14, 105, 123, 234, 119
            ])
        );
    }

    #[test]
    fn test_protocol_example() {
        let key = Key::new(
            "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
            DigestAlgorithm::Sha256,
        )
        .unwrap();
        let a = Artifacts {
            ts: UNIX_EPOCH + Duration::new(1353832234, 0),
            nonce: "j4h3g2",
            method: "GET",
            path: "/resource/1?b=1&a=2",
            host: "example.com",
            port: 8000,
            hash: None,
            ext: Some("some-app-ext-data"),
            app: None,
            dlg: None,
        };
        let mac = Mac::new(MacType::Header, &key, &a).unwrap();
        assert_eq!(
            mac.to_base64(),
            "6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="
        );
        // deterministic
        assert_eq!(mac, Mac::new(MacType::Header, &key, &a).unwrap());
    }

    #[test]
    fn test_ts_mac() {
        let key = Key::new("2983d45yun89q", DigestAlgorithm::Sha256).unwrap();
        let mac = Mac::new_ts(&key, UNIX_EPOCH + Duration::from_secs(1365741469)).unwrap();
        assert_eq!(
            format!("{}", mac),
            "h/Ff6XI1euObD78ZNflapvLKXGuaw1RiLI4Q6Q5sAbM="
        );
    }

    #[test]
    fn test_mac_types_differ() {
        let a = artifacts(UNIX_EPOCH + Duration::new(1000, 0));
        let header = Mac::new(MacType::Header, &key(), &a).unwrap();
        let response = Mac::new(MacType::Response, &key(), &a).unwrap();
        assert!(header != response);
    }

    #[test]
    fn test_algorithm_sensitivity() {
        let a = artifacts(UNIX_EPOCH + Duration::new(1000, 0));
        let k256 = Key::new("tok", DigestAlgorithm::Sha256).unwrap();
        let k512 = Key::new("tok", DigestAlgorithm::Sha512).unwrap();
        let m256 = Mac::new(MacType::Header, &k256, &a).unwrap();
        let m512 = Mac::new(MacType::Header, &k512, &a).unwrap();
        assert_eq!(m256.len(), 32);
        assert_eq!(m512.len(), 64);
        assert!(m256 != m512);
    }

    #[test]
    fn test_tamper_sensitivity() {
        let base = Artifacts {
            hash: Some(b"hash"),
            ext: Some("ext"),
            ..artifacts(UNIX_EPOCH + Duration::new(1000, 0))
        };
        let key = key();
        let expected = Mac::new(MacType::Header, &key, &base).unwrap();
        let variants = vec![
            Artifacts {
                ts: UNIX_EPOCH + Duration::new(1001, 0),
                ..base
            },
            Artifacts {
                nonce: "nonnz",
                ..base
            },
            Artifacts {
                method: "PUT",
                ..base
            },
            Artifacts {
                path: "/v1/apj",
                ..base
            },
            Artifacts {
                ext: Some("exu"),
                ..base
            },
            Artifacts {
                host: "mysite.org",
                ..base
            },
            Artifacts { port: 444, ..base },
            Artifacts {
                hash: Some(b"hasi"),
                ..base
            },
            Artifacts { hash: None, ..base },
        ];
        for v in variants {
            assert!(Mac::new(MacType::Header, &key, &v).unwrap() != expected);
        }
    }
}

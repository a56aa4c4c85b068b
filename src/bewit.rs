use crate::b64::{BEWIT_ENGINE, STANDARD_ENGINE};
use crate::error::*;
use crate::mac::Mac;
use crate::util::{from_unix_secs, unix_secs};
use base64::Engine;
use std::borrow::Cow;
use std::str;
use std::str::FromStr;
use std::time::SystemTime;

/// A bewit: a self-contained, expiring credential carried in the `bewit` query parameter of a
/// GET or HEAD request, standing in for an `Authorization` header.
///
/// On the wire it is `id\\exp\\mac\\ext`, URL-safe base64 encoded.  The fields are joined
/// with `\\`, so an `ext` containing a backslash cannot be decoded unambiguously; this is a
/// protocol constraint and is not checked here.
#[derive(Clone, Debug, PartialEq)]
pub struct Bewit<'a> {
    id: Cow<'a, str>,
    exp: SystemTime,
    mac: Cow<'a, Mac>,
    ext: Option<Cow<'a, str>>,
}

impl<'a> Bewit<'a> {
    /// Assemble a bewit from its parts.  Clients normally use `Request::make_bewit`, which
    /// also calculates the MAC.
    pub fn new(id: &'a str, exp: SystemTime, mac: Mac, ext: Option<&'a str>) -> Bewit<'a> {
        Bewit {
            id: Cow::Borrowed(id),
            exp,
            mac: Cow::Owned(mac),
            ext: ext.map(Cow::Borrowed),
        }
    }

    /// Remove the `bewit` query parameter from `path` and decode it.
    ///
    /// Returns `Ok(None)`, leaving the path alone, if there is no bewit.  Otherwise the path is
    /// rewritten without the parameter, keeping the order of the others, which yields the path
    /// the bewit's MAC was calculated over.  More than one bewit parameter is an error.
    pub fn from_path(path: &mut Cow<'a, str>) -> Result<Option<Bewit<'a>>> {
        const PARAM: &str = "bewit=";

        // only the query is split; `?` and `&` may appear literally in the path or in values
        let (base, query) = match path.split_once('?') {
            Some(parts) => parts,
            None => return Ok(None),
        };
        let (bewits, others): (Vec<&str>, Vec<&str>) =
            query.split('&').partition(|param| param.starts_with(PARAM));
        let encoded = match bewits.as_slice() {
            [] => return Ok(None),
            [bewit] => &bewit[PARAM.len()..],
            _ => return Err(InvalidBewit::Multiple.into()),
        };

        let bewit = Bewit::from_str(encoded)?;
        let stripped = if others.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, others.join("&"))
        };
        *path = Cow::Owned(stripped);

        Ok(Some(bewit))
    }

    /// The encoded bewit, ready for use as a query parameter value.
    pub fn to_str(&self) -> String {
        let raw = format!(
            "{}\\{}\\{}\\{}",
            self.id,
            unix_secs(self.exp),
            STANDARD_ENGINE.encode(self.mac.as_ref()),
            self.ext().unwrap_or_default(),
        );

        BEWIT_ENGINE.encode(raw)
    }

    /// The id of the credentials that issued the bewit.
    pub fn id(&self) -> &str {
        self.id.as_ref()
    }

    pub fn exp(&self) -> SystemTime {
        self.exp
    }

    pub fn mac(&self) -> &Mac {
        self.mac.as_ref()
    }

    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }
}

const BACKSLASH: u8 = b'\\';

impl<'a> FromStr for Bewit<'a> {
    type Err = Error;
    fn from_str(bewit: &str) -> Result<Bewit<'a>> {
        let bewit = BEWIT_ENGINE
            .decode(bewit)
            .map_err(|_| InvalidBewit::Base64)?;

        let parts: Vec<&[u8]> = bewit.split(|c| *c == BACKSLASH).collect();
        if parts.len() != 4 {
            return Err(InvalidBewit::Format.into());
        }

        let id = String::from_utf8(parts[0].to_vec()).map_err(|_| InvalidBewit::Id)?;

        let exp = str::from_utf8(parts[1]).map_err(|_| InvalidBewit::Exp)?;
        let exp = i64::from_str(exp).map_err(|_| InvalidBewit::Exp)?;
        let exp = from_unix_secs(exp).ok_or(InvalidBewit::Exp)?;

        let mac = str::from_utf8(parts[2]).map_err(|_| InvalidBewit::Mac)?;
        let mac = Mac::from(STANDARD_ENGINE.decode(mac).map_err(|_| InvalidBewit::Mac)?);

        let ext = match parts[3].len() {
            0 => None,
            _ => Some(Cow::Owned(
                String::from_utf8(parts[3].to_vec()).map_err(|_| InvalidBewit::Ext)?,
            )),
        };

        Ok(Bewit {
            id: Cow::Owned(id),
            exp,
            mac: Cow::Owned(mac),
            ext,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::canonical::Artifacts;
    use crate::credentials::Key;
    use crate::crypto::DigestAlgorithm;
    use crate::mac::{Mac, MacType};
    use std::str::FromStr;
    use std::time::{Duration, UNIX_EPOCH};

    // "me\1353832834\<mac>\" and the same with ext "abcd", both unpadded
    const NO_EXT: &str =
        "bWVcMTM1MzgzMjgzNFxmaXk0ZTV3QmRhcEROeEhIZUExOE5yU3JVMVUzaVM2NmdtMFhqVEpwWXlVPVw";
    const WITH_EXT: &str =
        "bWVcMTM1MzgzMjgzNFxmaXk0ZTV3QmRhcEROeEhIZUExOE5yU3JVMVUzaVM2NmdtMFhqVEpwWXlVPVxhYmNk";

    fn expiry() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1353832834)
    }

    fn mac() -> Mac {
        let key = Key::new(
            vec![
                11u8, 19, 228, 209, 79, 189, 200, 59, 166, 47, 86, 254, 235, 184, 120, 197, 75,
                152, 201, 79, 115, 61, 111, 242, 219, 187, 173, 14, 227, 108, 60, 232,
            ],
            DigestAlgorithm::Sha256,
        )
        .unwrap();
        let artifacts = Artifacts {
            ts: UNIX_EPOCH + Duration::new(1353832834, 100),
            nonce: "nonny",
            method: "POST",
            path: "/v1/api",
            host: "mysite.com",
            port: 443,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        };
        Mac::new(MacType::Header, &key, &artifacts).unwrap()
    }

    /// Encode raw bytes the way a bewit travels, without any validation.
    fn encoded(raw: &[u8]) -> String {
        BEWIT_ENGINE.encode(raw)
    }

    fn decode_err(raw: &[u8]) -> Option<InvalidBewit> {
        match Bewit::from_str(&encoded(raw)) {
            Err(Error::MalformedBewit(kind)) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn encodes_padded() {
        let bewit = Bewit::new("me", expiry(), mac(), None);
        assert_eq!(bewit.to_str(), format!("{}=", NO_EXT));

        let bewit = Bewit::new("me", expiry(), mac(), Some("abcd"));
        assert_eq!(bewit.to_str(), WITH_EXT);
    }

    #[test]
    fn decodes_with_or_without_padding() {
        for input in &[NO_EXT.to_string(), format!("{}=", NO_EXT)] {
            let bewit = Bewit::from_str(input).unwrap();
            assert_eq!(bewit.id(), "me");
            assert_eq!(bewit.exp(), expiry());
            assert_eq!(bewit.mac(), &mac());
            assert_eq!(bewit.ext(), None);
        }
    }

    #[test]
    fn survives_encoding() {
        let bewit = Bewit::new(
            "some-id",
            UNIX_EPOCH + Duration::from_secs(4519311458),
            mac(),
            Some("some-app-data"),
        );
        assert_eq!(Bewit::from_str(&bewit.to_str()).unwrap(), bewit);
    }

    #[test]
    fn rejects_bad_base64() {
        let err = Bewit::from_str("!/==").unwrap_err();
        assert_eq!(err.to_string(), "Invalid bewit encoding");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(decode_err(b"a\\123\\abc"), Some(InvalidBewit::Format));
        assert_eq!(
            decode_err(b"a\\123\\abc\\ext\\more"),
            Some(InvalidBewit::Format)
        );
    }

    #[test]
    fn rejects_bad_fields() {
        assert_eq!(decode_err(b"a\\soon\\abc\\"), Some(InvalidBewit::Exp));
        assert_eq!(decode_err(b"a\\1\\%%%\\"), Some(InvalidBewit::Mac));

        let junk = [0u8, 159];
        let field = |n: usize| -> Vec<u8> {
            let mut fields: Vec<&[u8]> = vec![&b"a"[..], &b"1"[..], &b""[..], &b"x"[..]];
            fields[n] = &junk;
            fields.join(&b'\\')
        };
        assert_eq!(decode_err(&field(0)), Some(InvalidBewit::Id));
        assert_eq!(decode_err(&field(1)), Some(InvalidBewit::Exp));
        assert_eq!(decode_err(&field(2)), Some(InvalidBewit::Mac));
        assert_eq!(decode_err(&field(3)), Some(InvalidBewit::Ext));
    }

    #[test]
    fn from_path_strips_bewit() {
        let cases = [
            ("/abc?bewit={}", "/abc"),
            ("/abc?bewit={}&y=y", "/abc?y=y"),
            ("/abc?x=x&bewit={}&y=y", "/abc?x=x&y=y"),
            ("/abc?x=x&bewit={}", "/abc?x=x"),
            ("/abc?next=/a?b&bewit={}", "/abc?next=/a?b"),
            ("/a&b/abc?bewit={}&x=1", "/a&b/abc?x=1"),
            ("/a&bewit=b/abc?bewit={}", "/a&bewit=b/abc"),
        ];
        for (template, expected) in cases.iter() {
            let mut path = Cow::Owned(template.replace("{}", WITH_EXT));
            let bewit = Bewit::from_path(&mut path).unwrap().unwrap();
            assert_eq!(path, *expected);
            assert_eq!(bewit.id(), "me");
            assert_eq!(bewit.exp(), expiry());
            assert_eq!(bewit.ext(), Some("abcd"));
        }
    }

    #[test]
    fn from_path_without_bewit() {
        let paths = [
            "/abc",
            "/abc?x=1",
            "/abc?notbewit=1",
            "/abc&bewit=x",
            "/abc?x=a?bewit=y",
        ];
        for original in &paths {
            let mut path = Cow::Borrowed(*original);
            assert_eq!(Bewit::from_path(&mut path).unwrap(), None);
            assert_eq!(path, *original);
        }
    }

    #[test]
    fn from_path_errors() {
        let mut path = Cow::Borrowed("/abc?x=x&bewit=!!");
        assert!(matches!(
            Bewit::from_path(&mut path),
            Err(Error::MalformedBewit(InvalidBewit::Base64))
        ));

        let mut path = Cow::Borrowed("/abc?bewit=x&bewit=y");
        assert!(matches!(
            Bewit::from_path(&mut path),
            Err(Error::MalformedBewit(InvalidBewit::Multiple))
        ));
    }
}

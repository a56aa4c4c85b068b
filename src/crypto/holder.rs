use super::Cryptographer;
use failure::Fail;
use once_cell::sync::OnceCell;

static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

#[derive(Debug, Fail)]
#[fail(display = "Cryptographer already initialized")]
pub struct SetCryptographerError(());

/// Like [`set_cryptographer`], for an implementation that is not already `'static`.  The box is
/// leaked.
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    set_cryptographer(Box::leak(c))
}

/// Install the process-wide [`Cryptographer`].
///
/// Only the first installation wins.  With `use_ring` or `use_openssl` enabled, the built-in
/// backend is installed as soon as anything in the crate needs cryptography, so this must run
/// before the first signature or verification to have any effect.  Without either feature,
/// cryptographic operations panic until it has been called.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

pub(crate) fn get_cryptographer() -> &'static dyn Cryptographer {
    if let Some(builtin) = builtin() {
        let _ = CRYPTOGRAPHER.set(builtin);
    }
    match CRYPTOGRAPHER.get() {
        Some(c) => *c,
        None => panic!(
            "`hawk` has no cryptographer; enable `use_ring` or `use_openssl`, \
             or call `set_cryptographer`"
        ),
    }
}

#[cfg(feature = "use_ring")]
fn builtin() -> Option<&'static dyn Cryptographer> {
    Some(&super::ring::RingCryptographer)
}

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
fn builtin() -> Option<&'static dyn Cryptographer> {
    Some(&super::openssl::OpensslCryptographer)
}

#[cfg(not(any(feature = "use_openssl", feature = "use_ring")))]
fn builtin() -> Option<&'static dyn Cryptographer> {
    None
}

#[cfg(all(test, feature = "use_ring"))]
mod test {
    use super::*;

    #[test]
    fn builtin_installed_first() {
        let _ = get_cryptographer();
        assert!(set_cryptographer(&crate::crypto::RingCryptographer).is_err());
    }
}

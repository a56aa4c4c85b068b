use crate::b64::STANDARD_ENGINE;
use crate::crypto::get_cryptographer;
use crate::error::Result;
use base64::Engine;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Create a random string with `bytes` bytes of entropy.  The string
/// is base64-encoded. so it will be longer than bytes characters.
pub(crate) fn random_string(bytes: usize) -> Result<String> {
    let mut bytes = vec![0u8; bytes];
    get_cryptographer().rand_bytes(&mut bytes)?;
    Ok(STANDARD_ENGINE.encode(&bytes))
}

/// Whole seconds since the epoch; negative for times before it.
pub(crate) fn unix_secs(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
    }
}

pub(crate) fn from_unix_secs(secs: i64) -> Option<SystemTime> {
    let magnitude = Duration::from_secs(secs.unsigned_abs());
    if secs >= 0 {
        UNIX_EPOCH.checked_add(magnitude)
    } else {
        UNIX_EPOCH.checked_sub(magnitude)
    }
}

/// Milliseconds since the epoch, as used by [`crate::Clock`].
pub(crate) fn unix_millis(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

//! UTF-16 helpers for crossing the Win32 wide-string boundary.

use std::ffi::{OsStr, OsString};
use std::iter::once;
use std::os::windows::ffi::{OsStrExt, OsStringExt};

/// Converts a UTF-8 Rust string into a null-terminated wide string, as
/// expected by Win32 `W` entry points.
pub fn to_wide_null(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

/// Decodes UTF-16 units (terminator excluded) into an `OsString`, keeping
/// unpaired surrogates intact.
pub fn from_wide(units: &[u16]) -> OsString {
    OsString::from_wide(units)
}

/// Lossy UTF-8 narrowing of UTF-16 units, for display and logging.
pub fn narrow_lossy(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

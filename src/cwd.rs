//! Extraction of the CWD string from the remote parameters block.

use std::ffi::OsString;

use log::debug;

use crate::errors::CwdError;
use crate::layout::{ParamsLayout, RemoteUnicodeString};
use crate::process::ProcessHandle;
use crate::wide;

/// NT caps paths at 0x7FFF UTF-16 units. A descriptor claiming more comes
/// from corrupted or hostile remote memory and must not drive allocation.
const MAX_PATH_BYTES: usize = 0x7FFF * 2;

/// Caller-owned, null-terminated wide copy of a remote CWD.
pub struct CwdBuffer {
    /// `char_len + 1` units, last unit zero.
    units: Box<[u16]>,
    char_len: usize,
}

impl CwdBuffer {
    /// Character count, terminator excluded.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The terminated buffer, `char_len() + 1` units long.
    pub fn as_wide(&self) -> &[u16] {
        &self.units
    }

    pub fn to_os_string(&self) -> OsString {
        wide::from_wide(&self.units[..self.char_len])
    }

    /// UTF-8 narrowing for display; unpaired surrogates are replaced.
    pub fn to_string_lossy(&self) -> String {
        wide::narrow_lossy(&self.units[..self.char_len])
    }

    /// Hands the allocation to the C ABI. Released by `get_cwd_by_pid_free`.
    pub(crate) fn into_raw(self) -> *mut u16 {
        Box::into_raw(self.units) as *mut u16
    }
}

/// Reads the CWD descriptor at the layout offset inside the remote
/// parameters block, then the described buffer itself.
///
/// `params_remote` is the remote base address of the target's
/// `RTL_USER_PROCESS_PARAMETERS`. Both reads are bounded; either failing
/// fails the extraction with nothing allocated for the caller.
pub fn extract_cwd(
    process: &ProcessHandle,
    params_remote: usize,
) -> Result<CwdBuffer, CwdError> {
    let layout = ParamsLayout::native();
    let descriptor: RemoteUnicodeString =
        process.read_value(params_remote + layout.current_directory)?;

    let byte_len = descriptor.length as usize;
    if byte_len > MAX_PATH_BYTES {
        return Err(CwdError::PathTooLong { bytes: byte_len });
    }
    let char_len = byte_len / 2;
    debug!(
        "CWD descriptor of process {}: {byte_len} bytes at {:#x}",
        process.pid(),
        descriptor.buffer
    );

    let mut units = vec![0u16; char_len + 1];
    if byte_len > 0 {
        // SAFETY: units owns (char_len + 1) * 2 bytes, which covers byte_len.
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(units.as_mut_ptr().cast::<u8>(), byte_len)
        };
        process.read_exact(descriptor.buffer, bytes)?;
    }
    units[char_len] = 0;

    Ok(CwdBuffer {
        units: units.into_boxed_slice(),
        char_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peb::read_process_peb;
    use crate::process::ProcessHandle;

    #[test]
    fn extracts_own_cwd() {
        let process = ProcessHandle::open(std::process::id()).unwrap();
        let peb = read_process_peb(&process).unwrap();
        let cwd = extract_cwd(&process, peb.ProcessParameters as usize).unwrap();

        assert!(cwd.char_len() > 0);
        assert_eq!(cwd.as_wide().len(), cwd.char_len() + 1);
        assert_eq!(*cwd.as_wide().last().unwrap(), 0);

        let reported = std::fs::canonicalize(cwd.to_os_string()).unwrap();
        let actual = std::fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
        assert_eq!(reported, actual);
    }
}

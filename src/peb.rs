//! Remote PEB retrieval via the resolved native query.

use std::ffi::c_void;
use std::mem;

use log::debug;
use windows_sys::Win32::System::Threading::{PEB, PROCESS_BASIC_INFORMATION};

use crate::errors::CwdError;
use crate::ntdll::{native_query, nt_success, PROCESS_BASIC_INFORMATION_CLASS};
use crate::process::ProcessHandle;

/// Copies the target's PEB into local memory.
///
/// Two gates guard the copy: the basic-information query must both succeed
/// and report at least the full structure size, and the subsequent remote
/// read must transfer the full PEB. A partially filled PEB is never
/// returned.
///
/// The `ProcessParameters` field of the copy is an address in the target's
/// address space; it is only usable for further remote reads, never for a
/// local dereference.
pub fn read_process_peb(process: &ProcessHandle) -> Result<PEB, CwdError> {
    let query = native_query()?;

    // SAFETY: PROCESS_BASIC_INFORMATION is plain data; zeroed is a valid value.
    let mut info: PROCESS_BASIC_INFORMATION = unsafe { mem::zeroed() };
    let mut returned: u32 = 0;
    let expected = mem::size_of::<PROCESS_BASIC_INFORMATION>() as u32;
    // SAFETY: info is writable for the advertised size; returned receives the
    // actual length.
    let status = unsafe {
        (query.query_information_process)(
            process.raw(),
            PROCESS_BASIC_INFORMATION_CLASS,
            &mut info as *mut _ as *mut c_void,
            expected,
            &mut returned,
        )
    };
    if !nt_success(status) {
        return Err(CwdError::Query { status });
    }
    if returned < expected {
        return Err(CwdError::ShortQuery { returned, expected });
    }

    let peb_address = info.PebBaseAddress as usize;
    debug!("PEB of process {} at {peb_address:#x}", process.pid());
    process.read_value::<PEB>(peb_address)
}

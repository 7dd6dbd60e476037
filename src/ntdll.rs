//! Run-once resolution of the undocumented ntdll query entry point.
//!
//! `NtQueryInformationProcess` is not part of the stable public import
//! surface, so it is resolved by name from ntdll.dll at runtime. Resolution
//! happens exactly once per process behind a one-time guard; the outcome,
//! success or failure, is cached and replayed unchanged on every later call.
//! Privilege elevation runs first, inside the same guard, so it is complete
//! before any remote handle can be opened.

use std::ffi::c_void;
use std::mem;
use std::sync::OnceLock;

use log::debug;
use windows_sys::Win32::Foundation::{HANDLE, NTSTATUS};
use windows_sys::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};

use crate::errors::{last_error, CwdError};
use crate::privilege::ensure_debug_privilege;

/// Signature of `NtQueryInformationProcess`.
pub type NtQueryInformationProcess = unsafe extern "system" fn(
    processhandle: HANDLE,
    processinformationclass: u32,
    processinformation: *mut c_void,
    processinformationlength: u32,
    returnlength: *mut u32,
) -> NTSTATUS;

/// `ProcessBasicInformation` class id for the query above.
pub const PROCESS_BASIC_INFORMATION_CLASS: u32 = 0;

/// The resolved capability, immutable after initialization.
#[derive(Clone, Copy)]
pub(crate) struct NativeQuery {
    pub query_information_process: NtQueryInformationProcess,
}

static NATIVE_QUERY: OnceLock<Result<NativeQuery, CwdError>> = OnceLock::new();

/// Returns the process-wide resolved query capability.
///
/// The first caller elevates privilege, loads ntdll.dll and resolves the
/// symbol. The module handle is intentionally never released: the resolved
/// pointer must stay valid for the rest of the process, and ntdll stays
/// mapped for the process lifetime regardless.
pub(crate) fn native_query() -> Result<NativeQuery, CwdError> {
    NATIVE_QUERY
        .get_or_init(|| {
            ensure_debug_privilege()?;

            // SAFETY: plain load by name of a system library.
            let ntdll = unsafe { LoadLibraryA(b"ntdll.dll\0".as_ptr()) };
            if ntdll == 0 {
                return Err(CwdError::NtdllLoad { code: last_error() });
            }

            // SAFETY: ntdll is a live module handle, the name is null-terminated.
            let address = unsafe { GetProcAddress(ntdll, b"NtQueryInformationProcess\0".as_ptr()) };
            let Some(address) = address else {
                return Err(CwdError::NtdllSymbol { code: last_error() });
            };
            debug!("resolved NtQueryInformationProcess");

            // SAFETY: the export carries the NtQueryInformationProcess signature.
            let query = unsafe {
                mem::transmute::<unsafe extern "system" fn() -> isize, NtQueryInformationProcess>(
                    address,
                )
            };
            Ok(NativeQuery {
                query_information_process: query,
            })
        })
        .clone()
}

/// NTSTATUS success check: non-negative values are success or informational.
pub(crate) fn nt_success(status: NTSTATUS) -> bool {
    status >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_initializes_once() {
        // ntdll is always present, so resolution must succeed, and the second
        // call must replay the cached capability.
        assert!(native_query().is_ok());
        assert!(native_query().is_ok());
    }

    #[test]
    fn nt_success_is_sign_based() {
        assert!(nt_success(0));
        assert!(nt_success(0x40000000));
        assert!(!nt_success(-1073741790)); // STATUS_ACCESS_DENIED
    }
}

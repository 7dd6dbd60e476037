//! Debug-privilege elevation for cross-process memory access.
//!
//! Reading another principal's process requires `SeDebugPrivilege` on the
//! calling token. Enabling it mutates the process-wide effective privilege
//! set for the remaining process lifetime, so this runs once, before the
//! first remote handle is opened.

use log::{debug, warn};
use windows_sys::Win32::Foundation::{CloseHandle, ERROR_NOT_ALL_ASSIGNED, HANDLE, LUID};
use windows_sys::Win32::Security::{
    AdjustTokenPrivileges, LookupPrivilegeValueW, LUID_AND_ATTRIBUTES, SE_PRIVILEGE_ENABLED,
    TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES,
};
use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

use crate::errors::{last_error, CwdError};
use crate::wide::to_wide_null;

const DEBUG_PRIVILEGE: &str = "SeDebugPrivilege";

/// Token handle closed on every exit path.
struct TokenHandle(HANDLE);

impl Drop for TokenHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by OpenProcessToken and is closed once.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

/// Enables `SeDebugPrivilege` on the current process token.
///
/// Succeeds even when the caller is not an administrator and the privilege
/// is therefore not actually assigned: the adjustment call itself reports
/// success, and same-user targets stay readable. That condition is logged.
pub fn ensure_debug_privilege() -> Result<(), CwdError> {
    let mut token: HANDLE = 0;
    // SAFETY: GetCurrentProcess returns a pseudo handle; token receives the result.
    let opened =
        unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_ADJUST_PRIVILEGES, &mut token) };
    if opened == 0 {
        return Err(CwdError::PrivilegeAdjust {
            code: last_error(),
            context: "OpenProcessToken",
        });
    }
    let token = TokenHandle(token);

    let name = to_wide_null(DEBUG_PRIVILEGE);
    let mut luid = LUID {
        LowPart: 0,
        HighPart: 0,
    };
    // SAFETY: name is null-terminated, luid receives the value.
    if unsafe { LookupPrivilegeValueW(std::ptr::null(), name.as_ptr(), &mut luid) } == 0 {
        return Err(CwdError::PrivilegeAdjust {
            code: last_error(),
            context: "LookupPrivilegeValueW",
        });
    }

    let privileges = TOKEN_PRIVILEGES {
        PrivilegeCount: 1,
        Privileges: [LUID_AND_ATTRIBUTES {
            Luid: luid,
            Attributes: SE_PRIVILEGE_ENABLED,
        }],
    };
    // SAFETY: token is a valid TOKEN_ADJUST_PRIVILEGES handle; the previous-state
    // out parameters are unused and may be null.
    let adjusted = unsafe {
        AdjustTokenPrivileges(
            token.0,
            0,
            &privileges,
            0,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };
    if adjusted == 0 {
        return Err(CwdError::PrivilegeAdjust {
            code: last_error(),
            context: "AdjustTokenPrivileges",
        });
    }

    if last_error() == ERROR_NOT_ALL_ASSIGNED {
        warn!("SeDebugPrivilege not held; only same-user processes will be readable");
    } else {
        debug!("SeDebugPrivilege enabled");
    }
    Ok(())
}

use thiserror::Error;

/// Errors produced while resolving a remote process working directory.
///
/// Three families matter to callers:
/// - initialization failures (`PrivilegeAdjust`, `NtdllLoad`, `NtdllSymbol`)
///   happen at most once per process and are replayed unchanged on every
///   later call;
/// - expected per-call failures (`ProcessOpen`, `ArchitectureQuery`,
///   `UnsupportedArchitecture`) describe targets that simply cannot be
///   queried right now;
/// - integrity failures (`Query`, `ShortQuery`, `Read`, `ShortRead`,
///   `NullProcessParameters`, `PathTooLong`) mean the undocumented structure
///   walk went wrong and nothing partial was returned.
#[derive(Debug, Clone, Error)]
pub enum CwdError {
    /// The current process token could not be adjusted.
    #[error("debug privilege adjustment failed (Win32 error {code} during {context})")]
    PrivilegeAdjust { code: u32, context: &'static str },

    /// ntdll.dll failed to load.
    #[error("ntdll.dll failed to load (Win32 error {code})")]
    NtdllLoad { code: u32 },

    /// The query entry point is missing from ntdll.dll.
    #[error("NtQueryInformationProcess not found in ntdll.dll (Win32 error {code})")]
    NtdllSymbol { code: u32 },

    /// The target could not be opened (bad PID, access denied, exited).
    #[error("could not open process {pid} (Win32 error {code})")]
    ProcessOpen { pid: u32, code: u32 },

    /// The emulation query itself failed.
    #[error("architecture query failed (Win32 error {code})")]
    ArchitectureQuery { code: u32 },

    /// The target runs under instruction-set emulation, where the parameters
    /// layout differs from the one this crate walks.
    #[error("process runs under emulation (machine {machine:#06x}), layout unsupported")]
    UnsupportedArchitecture { machine: u16 },

    /// `NtQueryInformationProcess` returned a failure status.
    #[error("NtQueryInformationProcess failed with status {status:#010x}")]
    Query { status: i32 },

    /// The query reported fewer bytes than the information structure holds.
    #[error("process information truncated: {returned} of {expected} bytes")]
    ShortQuery { returned: u32, expected: u32 },

    /// A remote read failed outright.
    #[error("failed to read {size} bytes at {address:#x} (Win32 error {code})")]
    Read { address: usize, size: usize, code: u32 },

    /// The OS transferred fewer bytes than requested. A truncated structure
    /// is never interpreted.
    #[error("short read at {address:#x}: {read} of {expected} bytes")]
    ShortRead {
        address: usize,
        read: usize,
        expected: usize,
    },

    /// The copied PEB carries no process-parameters pointer.
    #[error("PEB copy holds a null ProcessParameters pointer")]
    NullProcessParameters,

    /// The remote descriptor claims a length beyond the NT path ceiling,
    /// which only corrupted or hostile memory does.
    #[error("current directory descriptor claims {bytes} bytes, over the path ceiling")]
    PathTooLong { bytes: usize },
}

/// Raw `GetLastError` for embedding into error variants at the failure site.
pub(crate) fn last_error() -> u32 {
    // SAFETY: GetLastError is always safe to call.
    unsafe { windows_sys::Win32::Foundation::GetLastError() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_with_context() {
        let err = CwdError::ProcessOpen { pid: 4, code: 5 };
        assert_eq!(err.to_string(), "could not open process 4 (Win32 error 5)");

        let err = CwdError::ShortRead {
            address: 0x1000,
            read: 8,
            expected: 16,
        };
        assert!(err.to_string().contains("8 of 16"));
    }
}

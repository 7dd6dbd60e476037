#![cfg(windows)]
#![deny(unsafe_op_in_unsafe_fn)]

//! Query the current working directory of another process by PID.
//!
//! Windows exposes no public API for this, so the crate takes the only
//! viable route: `NtQueryInformationProcess` (resolved from ntdll.dll at
//! runtime) locates the target's PEB, and two bounded `ReadProcessMemory`
//! calls lift the `CurrentDirectoryPath` string out of the remote
//! `RTL_USER_PROCESS_PARAMETERS` block, whose relevant layout is
//! reverse-engineered rather than contractual.
//!
//! ```no_run
//! let cwd = proccwd::cwd_by_pid(std::process::id())?;
//! println!("{}", cwd.to_string_lossy());
//! # Ok::<(), proccwd::CwdError>(())
//! ```
//!
//! Every remote read is validated against the byte count the OS actually
//! transferred; a query either yields the complete CWD string or fails with
//! nothing partial. Targets running under instruction-set emulation (WOW64)
//! are rejected, since their parameters block uses a different layout.
//!
//! A C ABI mirror of this entry point lives in [`ffi`] for host runtimes
//! loading the crate as a dynamic library.

pub mod cwd;
pub mod errors;
pub mod ffi;
pub mod layout;
pub mod ntdll;
pub mod peb;
pub mod privilege;
pub mod process;
pub mod wide;

pub use cwd::CwdBuffer;
pub use errors::CwdError;

use log::debug;

use crate::process::ProcessHandle;

/// Resolves the CWD of the process identified by `pid`.
///
/// Steps: one-time initialization (privilege elevation plus ntdll symbol
/// resolution), open the target, reject emulated architectures, copy the
/// PEB, extract the CWD string. The first failing step fails the whole
/// query; nothing is retried, and the process handle is released on every
/// path. Callers may re-invoke later if the target's state changes.
pub fn cwd_by_pid(pid: u32) -> Result<CwdBuffer, CwdError> {
    // Initialization failures are terminal for the process, not just for
    // this call; the resolver replays them without retrying.
    ntdll::native_query()?;

    let process = ProcessHandle::open(pid)?;
    process.ensure_native_machine()?;

    let peb = peb::read_process_peb(&process)?;
    let params_remote = peb.ProcessParameters as usize;
    if params_remote == 0 {
        return Err(CwdError::NullProcessParameters);
    }

    let buffer = cwd::extract_cwd(&process, params_remote)?;
    debug!("process {pid} cwd: {}", buffer.to_string_lossy());
    Ok(buffer)
}

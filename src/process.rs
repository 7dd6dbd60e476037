//! Remote process handle with bounded cross-process reads.

use std::ffi::c_void;
use std::mem;

use log::debug;
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows_sys::Win32::System::SystemInformation::{
    IMAGE_FILE_MACHINE, IMAGE_FILE_MACHINE_UNKNOWN,
};
use windows_sys::Win32::System::Threading::{
    IsWow64Process2, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

use crate::errors::{last_error, CwdError};

/// Owned handle to a remote process, opened with exactly the two rights the
/// query needs. Closed exactly once on drop, on every exit path.
#[derive(Debug)]
pub struct ProcessHandle {
    raw: HANDLE,
    pid: u32,
}

impl ProcessHandle {
    /// Opens `pid` for information queries and memory reads.
    ///
    /// Denial is an expected, recoverable condition: invalid PID, access
    /// denied, or a process that already exited.
    pub fn open(pid: u32) -> Result<Self, CwdError> {
        // SAFETY: OpenProcess has no memory-safety preconditions.
        let raw = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid) };
        if raw == 0 {
            return Err(CwdError::ProcessOpen {
                pid,
                code: last_error(),
            });
        }
        debug!("opened process {pid}");
        Ok(Self { raw, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) fn raw(&self) -> HANDLE {
        self.raw
    }

    /// Fails unless the target's instruction set matches the host's.
    ///
    /// Emulated (WOW64) targets keep their parameters block in a different
    /// layout, so they are rejected before any structure walk.
    pub fn ensure_native_machine(&self) -> Result<(), CwdError> {
        let mut process_machine: IMAGE_FILE_MACHINE = 0;
        let mut native_machine: IMAGE_FILE_MACHINE = 0;
        // SAFETY: raw is a live PROCESS_QUERY_INFORMATION handle.
        let ok = unsafe { IsWow64Process2(self.raw, &mut process_machine, &mut native_machine) };
        if ok == 0 {
            return Err(CwdError::ArchitectureQuery { code: last_error() });
        }
        // IMAGE_FILE_MACHINE_UNKNOWN here means "not running under WOW64".
        if process_machine != IMAGE_FILE_MACHINE_UNKNOWN {
            return Err(CwdError::UnsupportedArchitecture {
                machine: process_machine,
            });
        }
        Ok(())
    }

    /// Bounded remote read. The OS-reported transfer count must cover the
    /// whole request; a short read is an error, never padded data.
    pub fn read_exact(&self, address: usize, buf: &mut [u8]) -> Result<(), CwdError> {
        let mut transferred: usize = 0;
        // SAFETY: buf is valid for buf.len() writable bytes; the OS validates
        // the remote range.
        let ok = unsafe {
            ReadProcessMemory(
                self.raw,
                address as *const c_void,
                buf.as_mut_ptr().cast(),
                buf.len(),
                &mut transferred,
            )
        };
        if ok == 0 {
            let code = last_error();
            debug!(
                "ReadProcessMemory failed at {address:#x} ({} bytes, Win32 error {code})",
                buf.len()
            );
            return Err(CwdError::Read {
                address,
                size: buf.len(),
                code,
            });
        }
        if transferred < buf.len() {
            return Err(CwdError::ShortRead {
                address,
                read: transferred,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    /// Reads one `T` from remote memory, unaligned.
    pub fn read_value<T: Copy>(&self, address: usize) -> Result<T, CwdError> {
        let mut buf = vec![0u8; mem::size_of::<T>()];
        self.read_exact(address, &mut buf)?;
        // SAFETY: exactly size_of::<T>() bytes were transferred and T: Copy.
        Ok(unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const T) })
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: raw is an owned handle, closed exactly once.
        unsafe {
            CloseHandle(self.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_current_process() {
        let pid = std::process::id();
        let process = ProcessHandle::open(pid).expect("own process must open");
        assert_eq!(process.pid(), pid);
        assert_ne!(process.raw(), 0);
    }

    #[test]
    fn open_reserved_pid_fails() {
        match ProcessHandle::open(0) {
            Err(CwdError::ProcessOpen { pid: 0, .. }) => {}
            other => panic!("expected ProcessOpen for pid 0, got {other:?}"),
        }
    }

    #[test]
    fn current_process_is_native() {
        let process = ProcessHandle::open(std::process::id()).unwrap();
        process
            .ensure_native_machine()
            .expect("test binary matches host architecture");
    }

    #[test]
    fn read_exact_round_trips_own_memory() {
        static PATTERN: [u8; 8] = [0xde, 0xad, 0xbe, 0xef, 0x10, 0x32, 0x54, 0x76];
        let process = ProcessHandle::open(std::process::id()).unwrap();

        let mut buf = [0u8; 8];
        process
            .read_exact(PATTERN.as_ptr() as usize, &mut buf)
            .expect("reading own memory");
        assert_eq!(buf, PATTERN);

        let value: u64 = process.read_value(PATTERN.as_ptr() as usize).unwrap();
        assert_eq!(value, u64::from_le_bytes(PATTERN));
    }

    #[test]
    fn read_from_unmapped_address_fails() {
        let process = ProcessHandle::open(std::process::id()).unwrap();
        let mut buf = [0u8; 16];
        assert!(matches!(
            process.read_exact(1, &mut buf),
            Err(CwdError::Read { address: 1, .. })
        ));
    }
}

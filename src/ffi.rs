//! C ABI surface for host runtimes embedding the crate as a dynamic library.
//!
//! The contract is deliberately minimal: one call that returns an owned wide
//! string or null, and one call that releases it. Every internal failure
//! collapses to the null return here; the distinction between failure
//! classes is available through logging and through the Rust API.

use std::ptr;

use log::debug;

use crate::cwd_by_pid;

/// Returns a newly allocated, null-terminated wide-character copy of the
/// working directory of process `pid`, writing the character count
/// (terminator excluded) through `length`.
///
/// On failure (process not found, access denied, architecture mismatch,
/// query or read failure) returns null and does not write `length`, so
/// callers must not read it unless the return value is non-null. Ownership
/// of a non-null buffer transfers to the caller, who must release it with
/// [`get_cwd_by_pid_free`] exactly once.
///
/// # Safety
/// `length` must be null or valid for a single `usize` write.
#[no_mangle]
pub unsafe extern "C" fn get_cwd_by_pid(pid: u32, length: *mut usize) -> *mut u16 {
    match cwd_by_pid(pid) {
        Ok(buffer) => {
            if !length.is_null() {
                // SAFETY: caller guarantees length is writable.
                unsafe { *length = buffer.char_len() };
            }
            buffer.into_raw()
        }
        Err(err) => {
            debug!("query for pid {pid} failed: {err}");
            ptr::null_mut()
        }
    }
}

/// Releases a buffer returned by [`get_cwd_by_pid`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by
/// [`get_cwd_by_pid`] that has not already been freed.
#[no_mangle]
pub unsafe extern "C" fn get_cwd_by_pid_free(ptr: *mut u16) {
    if ptr.is_null() {
        return;
    }
    // Paths hold no interior nulls, so the terminator recovers the exact
    // allocation length.
    let mut len = 0usize;
    // SAFETY: the buffer is terminated by construction.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: reconstructs the boxed slice handed out by into_raw.
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len + 1)) });
}

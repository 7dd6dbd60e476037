//! Reverse-engineered location of the CWD string inside the remote
//! process-parameters block.
//!
//! The public `RTL_USER_PROCESS_PARAMETERS` declaration hides everything
//! before `ImagePathName` behind reserved fields. The `CurrentDirectoryPath`
//! descriptor sits in the sixth pointer slot of `Reserved2`:
//!
//! ```text
//! MaximumLength  u32          0
//! Length         u32          4
//! Flags          u32          8
//! DebugFlags     u32          12
//! ConsoleHandle  ptr          16   Reserved2[0]
//! ConsoleFlags   u32 (+pad)   24   Reserved2[1]
//! StdInput       ptr          32   Reserved2[2]
//! StdOutput      ptr          40   Reserved2[3]
//! StdError       ptr          48   Reserved2[4]
//! CurrentDirectoryPath  UNICODE_STRING  56   Reserved2[5..7]
//! ```
//!
//! This is a contract with the OS structure revision it was derived against,
//! not with any public header.

use std::ffi::c_void;
use std::mem;

use windows_sys::Win32::System::Threading::RTL_USER_PROCESS_PARAMETERS;

/// Length-prefixed descriptor of a wide string owned by the target process.
/// `buffer` is an address in the remote address space and is never valid
/// locally. Lengths are in bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RemoteUnicodeString {
    pub length: u16,
    pub maximum_length: u16,
    pub buffer: usize,
}

/// Field offsets inside `RTL_USER_PROCESS_PARAMETERS`, grouped into one
/// value so a future layout revision is a data update, not a logic change.
#[derive(Debug, Clone, Copy)]
pub struct ParamsLayout {
    /// Byte offset of the `CurrentDirectoryPath` descriptor.
    pub current_directory: usize,
}

impl ParamsLayout {
    /// Layout for targets whose architecture matches the host's. Emulated
    /// targets use a different layout and are rejected before this is used.
    pub const fn native() -> Self {
        Self {
            current_directory: mem::offset_of!(RTL_USER_PROCESS_PARAMETERS, Reserved2)
                + 5 * mem::size_of::<*mut c_void>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_matches_unicode_string_abi() {
        // u16, u16, pointer-aligned buffer.
        #[cfg(target_pointer_width = "64")]
        {
            assert_eq!(mem::size_of::<RemoteUnicodeString>(), 16);
            assert_eq!(mem::align_of::<RemoteUnicodeString>(), 8);
        }
        #[cfg(target_pointer_width = "32")]
        {
            assert_eq!(mem::size_of::<RemoteUnicodeString>(), 8);
            assert_eq!(mem::align_of::<RemoteUnicodeString>(), 4);
        }
    }

    #[test]
    fn native_layout_pins_current_directory_offset() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(ParamsLayout::native().current_directory, 0x38);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(ParamsLayout::native().current_directory, 0x24);
    }
}

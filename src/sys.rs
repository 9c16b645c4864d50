// src/sys.rs

//! Thin wrappers around the raw syscalls. Every descriptor handed back is an
//! `OwnedFd` and is closed when dropped.

use std::fs::OpenOptions;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::decode::ObjectHandle;

pub use imp::{fanotify_init, fanotify_mark, open_by_handle_at};

/// Open `dir` as a directory descriptor, used as the mount reference for
/// handle reopens.
pub fn open_directory(dir: &Path) -> io::Result<OwnedFd> {
    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_DIRECTORY)
        .open(dir)?;
    Ok(OwnedFd::from(file))
}

#[cfg(target_os = "linux")]
mod imp {
    use std::ffi::CString;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use super::ObjectHandle;
    use crate::abi::FILE_HANDLE_HEADER_LEN;

    fn owned(ret: libc::c_long) -> io::Result<OwnedFd> {
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        let fd = i32::try_from(ret).map_err(|_| io::Error::other("descriptor out of range"))?;
        // SAFETY: the kernel just returned this descriptor and nothing else owns it.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    /// Open a notification group. Event descriptors, if the kernel ever hands
    /// any over, are read-only and close-on-exec.
    pub fn fanotify_init(flags: u32) -> io::Result<OwnedFd> {
        let event_f_flags = (libc::O_RDONLY | libc::O_LARGEFILE | libc::O_CLOEXEC) as u32;
        // SAFETY: plain syscall with integer arguments.
        let ret = unsafe { libc::fanotify_init(flags, event_f_flags) };
        owned(libc::c_long::from(ret))
    }

    pub fn fanotify_mark(fd: &OwnedFd, flags: u32, mask: u64, path: &Path) -> io::Result<()> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: `c_path` is NUL-terminated and outlives the call.
        let ret = unsafe {
            libc::fanotify_mark(fd.as_raw_fd(), flags, mask, libc::AT_FDCWD, c_path.as_ptr())
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Reopen the object named by `handle` on the filesystem of `mount_fd`.
    ///
    /// The descriptor is opened with `O_PATH`: it is only ever used to read
    /// back its path, which works for every file type and needs no read
    /// permission on the object itself.
    pub fn open_by_handle_at(mount_fd: &OwnedFd, handle: &ObjectHandle) -> io::Result<OwnedFd> {
        let buf = file_handle_words(handle)?;
        let flags = libc::O_PATH | libc::O_CLOEXEC;
        // SAFETY: `buf` is a 4-byte aligned `struct file_handle` whose
        // `handle_bytes` matches the payload that follows it.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_open_by_handle_at,
                mount_fd.as_raw_fd(),
                buf.as_ptr(),
                flags,
            )
        };
        owned(ret)
    }

    /// Lay out a `struct file_handle` in `u32` words so the header fields are
    /// naturally aligned.
    fn file_handle_words(handle: &ObjectHandle) -> io::Result<Vec<u32>> {
        let handle_bytes = u32::try_from(handle.bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "handle too large"))?;
        let words = FILE_HANDLE_HEADER_LEN / 4 + handle.bytes.len().div_ceil(4);

        let mut buf = Vec::with_capacity(words);
        buf.push(handle_bytes);
        buf.push(u32::from_ne_bytes(handle.handle_type.to_ne_bytes()));
        for chunk in handle.bytes.chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            buf.push(u32::from_ne_bytes(word));
        }
        Ok(buf)
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use std::io;
    use std::os::fd::OwnedFd;
    use std::path::Path;

    use super::ObjectHandle;

    fn unsupported() -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, "fanotify requires Linux 5.1+")
    }

    pub fn fanotify_init(_flags: u32) -> io::Result<OwnedFd> {
        Err(unsupported())
    }

    pub fn fanotify_mark(_fd: &OwnedFd, _flags: u32, _mask: u64, _path: &Path) -> io::Result<()> {
        Err(unsupported())
    }

    pub fn open_by_handle_at(_mount_fd: &OwnedFd, _handle: &ObjectHandle) -> io::Result<OwnedFd> {
        Err(unsupported())
    }
}

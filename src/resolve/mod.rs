// src/resolve/mod.rs

//! Turning object handles back into paths.

use std::fmt::Debug;
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::PathBuf;

use crate::decode::ObjectHandle;
use crate::errors::ResolveError;
use crate::sys;

pub mod mock;

/// Abstract handle-to-path resolution.
pub trait PathResolver: Send + Debug {
    fn resolve(&self, handle: &ObjectHandle) -> Result<PathBuf, ResolveError>;
}

/// Resolver backed by `open_by_handle_at(2)` and `/proc/self/fd`.
///
/// Handles are opened relative to `mount_fd`, a descriptor on the watched
/// filesystem, so resolution does not depend on the process working
/// directory.
#[derive(Debug)]
pub struct KernelResolver {
    mount_fd: OwnedFd,
}

impl KernelResolver {
    pub fn new(mount_fd: OwnedFd) -> Self {
        Self { mount_fd }
    }
}

impl PathResolver for KernelResolver {
    fn resolve(&self, handle: &ObjectHandle) -> Result<PathBuf, ResolveError> {
        // Dropped on every return below, including a failed read_link.
        let fd = sys::open_by_handle_at(&self.mount_fd, handle).map_err(ResolveError::Handle)?;
        descriptor_path(&fd)
    }
}

/// Current path of an open descriptor, via the `/proc/self/fd` symlink.
///
/// The link target is read into a growable buffer, so long paths come back
/// whole rather than truncated.
pub fn descriptor_path(fd: &OwnedFd) -> Result<PathBuf, ResolveError> {
    let link = format!("/proc/self/fd/{}", fd.as_raw_fd());
    std::fs::read_link(link).map_err(ResolveError::PathRead)
}

// src/resolve/mock.rs

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::PathResolver;
use crate::decode::ObjectHandle;
use crate::errors::ResolveError;

/// In-memory resolver keyed by handle bytes.
///
/// Unknown handles fail the way a stale kernel handle does (`ESTALE`).
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    paths: Arc<Mutex<HashMap<Vec<u8>, PathBuf>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handle: impl Into<Vec<u8>>, path: impl AsRef<Path>) {
        let mut paths = self.paths.lock().unwrap_or_else(|p| p.into_inner());
        paths.insert(handle.into(), path.as_ref().to_path_buf());
    }

    pub fn remove(&self, handle: &[u8]) {
        let mut paths = self.paths.lock().unwrap_or_else(|p| p.into_inner());
        paths.remove(handle);
    }
}

impl PathResolver for MockResolver {
    fn resolve(&self, handle: &ObjectHandle) -> Result<PathBuf, ResolveError> {
        let paths = self.paths.lock().unwrap_or_else(|p| p.into_inner());
        paths
            .get(&handle.bytes)
            .cloned()
            .ok_or_else(|| ResolveError::Handle(io::Error::from_raw_os_error(libc::ESTALE)))
    }
}

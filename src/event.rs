// src/event.rs

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Kind of change reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Delete,
    Modify,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Delete => "delete",
            ChangeKind::Modify => "modify",
        };
        f.write_str(s)
    }
}

/// A single normalized change.
///
/// For `Create` and `Delete`, `path` is the directory that contains the
/// created/removed/moved entry, not the entry itself: in file-identifier mode
/// the kernel reports directory-entry events against the parent directory.
/// For `Modify`, `path` is the modified object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

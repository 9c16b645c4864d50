// src/filter.rs

//! Path filters applied before an event is dispatched.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;

/// Decides whether a resolved path should be dropped.
///
/// Returning `true` drops the event silently.
pub trait PathFilter: Send {
    fn is_filtered(&self, path: &Path) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&Path) -> bool + Send,
{
    fn is_filtered(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Keep every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathFilter for AcceptAll {
    fn is_filtered(&self, _path: &Path) -> bool {
        false
    }
}

/// Glob-based filter built from `include` / `exclude` pattern lists.
///
/// Patterns are matched against the absolute resolved path. A path is kept
/// when it lies under `root` (if set), matches at least one include pattern
/// (or there are none), and matches no exclude pattern.
#[derive(Clone)]
pub struct GlobFilter {
    root: Option<PathBuf>,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for GlobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobFilter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GlobFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            root: None,
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    /// Only keep paths at or below `root`.
    ///
    /// The mark covers the whole filesystem, so this is how a caller narrows
    /// events down to the directory it asked for.
    pub fn within(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }
}

impl PathFilter for GlobFilter {
    fn is_filtered(&self, path: &Path) -> bool {
        if let Some(root) = &self.root {
            if !path.starts_with(root) {
                return true;
            }
        }
        if let Some(include) = &self.include {
            if !include.is_match(path) {
                return true;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(path) {
                return true;
            }
        }
        false
    }
}

/// Build a GlobSet, or `None` for an empty list.
fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(Some(builder.build()?))
}

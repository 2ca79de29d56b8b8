//! Per-entry decisions and the ordered chain that applies them.
//!
//! A [`Filter`] looks at one [`Entry`] and returns a [`Decision`]. The walker
//! runs every registered filter in order and acts on the first decision that
//! is not [`Decision::Pass`].

use crate::error::WalkError;
use crate::types::Entry;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// What the walker does with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Hand the entry to the consumer.
    Pass,
    /// Drop the entry. Directories are still descended into.
    Discard,
    /// Drop the entry and, for a directory, everything below it.
    SkipSubtree,
    /// Drop the entry and stop the whole walk.
    Abort,
}

/// Decides what happens to each visited entry.
///
/// Filters run on the traversal thread while consumers read on theirs, so
/// they must be `Send + Sync`. Any `Fn(&Entry) -> Decision` closure with
/// those bounds is a filter.
pub trait Filter: Send + Sync {
    fn decide(&self, entry: &Entry) -> Decision;

    /// Label used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Filter for F
where
    F: Fn(&Entry) -> Decision + Send + Sync,
{
    fn decide(&self, entry: &Entry) -> Decision {
        self(entry)
    }
}

/// Shared handle to a filter, as stored in a [`FilterChain`].
pub type FilterRef = Arc<dyn Filter>;

/// Ordered, append-only list of filters.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<FilterRef>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: FilterRef) {
        self.filters.push(filter);
    }

    /// Appends every `Some` item, in order. `None` items are ignored.
    pub fn extend<I>(&mut self, filters: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<FilterRef>>,
    {
        self.filters.extend(filters.into_iter().filter_map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the first non-[`Pass`](Decision::Pass) decision, or `Pass`
    /// when every filter (or no filter at all) lets the entry through.
    pub fn evaluate(&self, entry: &Entry) -> Decision {
        for filter in &self.filters {
            let decision = filter.decide(entry);
            if decision != Decision::Pass {
                #[cfg(feature = "logging")]
                tracing::trace!(
                    "{:?} on {} by {}",
                    decision,
                    entry.path().display(),
                    filter.name()
                );
                return decision;
            }
        }
        Decision::Pass
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

/// Wraps a closure as a [`FilterRef`].
pub fn from_fn<F>(f: F) -> FilterRef
where
    F: Fn(&Entry) -> Decision + Send + Sync + 'static,
{
    Arc::new(f)
}

struct DiscardDirs;

impl Filter for DiscardDirs {
    fn decide(&self, entry: &Entry) -> Decision {
        if entry.is_dir() {
            Decision::Discard
        } else {
            Decision::Pass
        }
    }

    fn name(&self) -> &str {
        "discard_dirs"
    }
}

/// Removes directories from the output. Their contents are still walked.
pub fn discard_dirs() -> FilterRef {
    Arc::new(DiscardDirs)
}

struct DiscardRegular;

impl Filter for DiscardRegular {
    fn decide(&self, entry: &Entry) -> Decision {
        if entry.is_file() {
            Decision::Discard
        } else {
            Decision::Pass
        }
    }

    fn name(&self) -> &str {
        "discard_regular"
    }
}

/// Removes regular files from the output.
pub fn discard_regular() -> FilterRef {
    Arc::new(DiscardRegular)
}

struct SkipPaths {
    paths: Vec<PathBuf>,
}

impl Filter for SkipPaths {
    fn decide(&self, entry: &Entry) -> Decision {
        if self.paths.iter().any(|p| p.as_path() == entry.path()) {
            Decision::SkipSubtree
        } else {
            Decision::Pass
        }
    }

    fn name(&self) -> &str {
        "skip_paths"
    }
}

/// Skips entries whose relative path equals one of `paths`, along with
/// everything beneath them.
///
/// Matching is exact and component-wise: `"b"` skips `b` but not `bb` or
/// `a/b`.
pub fn skip_paths<I, P>(paths: I) -> FilterRef
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Arc::new(SkipPaths {
        paths: paths.into_iter().map(Into::into).collect(),
    })
}

fn build_globset<I, S>(patterns: I) -> Result<GlobSet, WalkError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern)
            .map_err(|e| WalkError::Pattern(format!("'{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| WalkError::Pattern(format!("Failed to build glob set: {}", e)))
}

struct SkipGlobs {
    set: GlobSet,
}

impl Filter for SkipGlobs {
    fn decide(&self, entry: &Entry) -> Decision {
        if self.set.is_match(entry.path()) {
            Decision::SkipSubtree
        } else {
            Decision::Pass
        }
    }

    fn name(&self) -> &str {
        "skip_globs"
    }
}

/// Skips any entry (and its subtree) whose relative path matches one of the
/// glob `patterns`.
pub fn skip_globs<I, S>(patterns: I) -> Result<FilterRef, WalkError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Arc::new(SkipGlobs {
        set: build_globset(patterns)?,
    }))
}

struct DiscardUnmatched {
    set: GlobSet,
}

impl Filter for DiscardUnmatched {
    fn decide(&self, entry: &Entry) -> Decision {
        if self.set.is_match(entry.path()) {
            Decision::Pass
        } else {
            Decision::Discard
        }
    }

    fn name(&self) -> &str {
        "discard_unmatched"
    }
}

/// Keeps only entries whose relative path matches one of the glob
/// `patterns`. Unmatched directories are still walked, so `*.rs` finds
/// files at any depth.
pub fn discard_unmatched<I, S>(patterns: I) -> Result<FilterRef, WalkError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Arc::new(DiscardUnmatched {
        set: build_globset(patterns)?,
    }))
}

/// Stops the walk at the first entry for which `pred` holds.
pub fn abort_when<F>(pred: F) -> FilterRef
where
    F: Fn(&Entry) -> bool + Send + Sync + 'static,
{
    from_fn(move |entry: &Entry| {
        if pred(entry) {
            Decision::Abort
        } else {
            Decision::Pass
        }
    })
}

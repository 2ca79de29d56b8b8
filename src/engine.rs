use crate::context::Context;
use crate::error::WalkError;
use crate::filter::{Decision, FilterChain};
use crate::options::WalkOptions;
use crate::types::Entry;
use crossbeam_channel::Sender;
use std::path::Path;
use walkdir::WalkDir;
#[cfg(feature = "logging")]
use tracing;

fn build_walkdir(root: &Path, options: &WalkOptions) -> WalkDir {
    let mut builder = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(if options.include_root { 0 } else { 1 });
    if let Some(depth) = options.max_depth {
        builder = builder.max_depth(depth);
    }
    builder
}

/// Walks `root` depth-first and hands every entry the chain passes to `tx`.
///
/// Returns `Ok(())` only when the whole tree was visited. Any other stop,
/// including a filter abort, comes back as the error that caused it.
pub(crate) fn run(
    root: &Path,
    options: &WalkOptions,
    chain: &FilterChain,
    ctx: &Context,
    tx: &Sender<Entry>,
) -> Result<(), WalkError> {
    #[cfg(feature = "logging")]
    tracing::debug!("Starting walk of {}", root.display());
    let mut inner = build_walkdir(root, options).into_iter();
    while let Some(result) = inner.next() {
        // An enumeration error has no usable entry behind it.
        let dent = result?;
        let entry = Entry::from_dir_entry(root, &dent);
        match chain.evaluate(&entry) {
            Decision::Pass => {
                ctx.send(tx, entry)?;
            }
            Decision::Discard => {}
            Decision::SkipSubtree => {
                if dent.file_type().is_dir() {
                    inner.skip_current_dir();
                }
            }
            Decision::Abort => {
                #[cfg(feature = "logging")]
                tracing::debug!("Walk aborted by filter at {}", entry.path().display());
                return Err(WalkError::Aborted);
            }
        }
    }
    #[cfg(feature = "logging")]
    tracing::debug!("Walk of {} finished", root.display());
    Ok(())
}

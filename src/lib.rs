//! # Treewalk
//!
//! `treewalk` walks a directory tree on a background thread and streams each visited entry
//! to the caller through a bounded channel. The walk is lazy: with the default zero-capacity
//! channel the traversal only advances when a consumer asks for the next entry.
//!
//! Filters decide, per entry, whether it is delivered, dropped, skipped together with its
//! subtree, or whether the whole walk stops. A [`Context`] lets the caller cancel a walk or
//! give it a deadline. Errors never travel through the entry stream; once the stream ends,
//! [`Walker::last_error`] (or [`Entries::error`]) tells why.
//!
//! # Features
//!
//! - `logging`: Enables debug logging via the `tracing` crate.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use treewalk::{Context, Walker, filter};
//!
//! let walker = Walker::new()
//!     .with_filters([filter::discard_dirs(), filter::skip_paths(["target"])])
//!     .max_depth(8);
//!
//! let ctx = Context::background().with_timeout(Duration::from_secs(5));
//! for entry in walker.walk(&ctx, ".") {
//!     println!("{} ({:?})", entry.path().display(), entry.kind());
//! }
//!
//! match walker.last_error() {
//!     None => {}
//!     Some(err) if !err.is_fatal() => println!("stopped early: {err}"),
//!     Some(err) => eprintln!("walk failed: {err}"),
//! }
//! ```

mod context;
mod engine;
mod error;
pub mod filter;
mod options;
pub mod output;
mod types;
mod walker;

pub use context::{CancelHandle, Context};
pub use error::WalkError;
pub use filter::{Decision, Filter, FilterChain, FilterRef};
pub use options::WalkOptions;
pub use types::{Entry, EntryKind};
pub use walker::{Entries, Walker};

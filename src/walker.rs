use crate::context::Context;
use crate::engine;
use crate::error::WalkError;
use crate::filter::{Filter, FilterChain, FilterRef};
use crate::options::WalkOptions;
use crate::types::Entry;
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::iter::FusedIterator;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;
#[cfg(feature = "logging")]
use tracing;

/// Terminal outcome of one walk, written once by the traversal thread
/// before it closes the channel.
type Outcome = Arc<OnceLock<Option<WalkError>>>;

/// Walks directory trees on a background thread and streams the entries.
///
/// A `Walker` holds the filter chain and [`WalkOptions`]; each call to
/// [`Walker::walk`] starts a fresh traversal.
///
/// ```no_run
/// use treewalk::{Context, Walker, filter};
///
/// let walker = Walker::new().with_filters([filter::discard_dirs()]);
/// for entry in walker.walk(&Context::background(), "src") {
///     println!("{}", entry.path().display());
/// }
/// if let Some(err) = walker.last_error() {
///     eprintln!("walk stopped: {err}");
/// }
/// ```
#[derive(Debug, Default)]
pub struct Walker {
    chain: FilterChain,
    options: WalkOptions,
    last: Mutex<Option<Outcome>>,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends filters in order. `None` items and empty iterators are
    /// ignored.
    pub fn with_filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<FilterRef>>,
    {
        self.chain.extend(filters);
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.chain.push(Arc::new(filter));
        self
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn include_root(mut self, yes: bool) -> Self {
        self.options.include_root = yes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = Some(depth);
        self
    }

    pub fn no_limit_depth(mut self) -> Self {
        self.options.max_depth = None;
        self
    }

    /// Lets the producer run up to `capacity` entries ahead of consumers.
    /// Cancelling still ends the sequence at once; queued entries are
    /// dropped.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.options.channel_capacity = capacity;
        self
    }

    pub fn filters(&self) -> &FilterChain {
        &self.chain
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Starts walking `root` and returns the lazy entry sequence right away.
    ///
    /// The traversal runs on its own thread and blocks whenever the handoff
    /// channel is full. That thread finishes once the sequence is drained or
    /// `ctx` is cancelled; dropping every clone of the returned [`Entries`]
    /// also stops it.
    pub fn walk(&self, ctx: &Context, root: impl AsRef<Path>) -> Entries {
        self.spawn(ctx, root.as_ref(), self.chain.clone())
    }

    /// Like [`Walker::walk`], with `extra` filters applied after the
    /// configured chain for this walk only.
    pub fn walk_with<I>(&self, ctx: &Context, root: impl AsRef<Path>, extra: I) -> Entries
    where
        I: IntoIterator,
        I::Item: Into<Option<FilterRef>>,
    {
        let mut chain = self.chain.clone();
        chain.extend(extra);
        self.spawn(ctx, root.as_ref(), chain)
    }

    /// The terminal error of the most recently started walk.
    ///
    /// `None` means either the walk finished cleanly or it has not finished
    /// yet; only read this after the sequence has ended.
    pub fn last_error(&self) -> Option<WalkError> {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.as_ref().and_then(|outcome| outcome.get().cloned().flatten())
    }

    fn spawn(&self, ctx: &Context, root: &Path, chain: FilterChain) -> Entries {
        let (tx, rx) = crossbeam_channel::bounded(self.options.channel_capacity);
        let outcome: Outcome = Arc::new(OnceLock::new());
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&outcome));

        let root: PathBuf = root.to_path_buf();
        let options = self.options.clone();
        let producer_ctx = ctx.clone();
        let producer_outcome = Arc::clone(&outcome);
        let spawned = thread::Builder::new()
            .name("treewalk-producer".to_string())
            .spawn(move || {
                let result = engine::run(&root, &options, &chain, &producer_ctx, &tx);
                #[cfg(feature = "logging")]
                tracing::debug!("Walk of {} ended: {:?}", root.display(), result.as_ref().err());
                let _ = producer_outcome.set(result.err());
                // Consumers see end-of-sequence only after the outcome is set.
                drop(tx);
            });

        if let Err(e) = spawned {
            // The closure (and its sender) was dropped, so `rx` is already
            // disconnected.
            let _ = outcome.set(Some(WalkError::Spawn(Arc::new(e))));
        }
        Entries {
            rx,
            outcome,
            ctx: ctx.clone(),
        }
    }
}

/// Lazy sequence of entries produced by one walk.
///
/// Iteration blocks until the traversal thread hands over the next entry
/// and ends when that thread is done. Clones read from the same channel,
/// so several consumers can share one walk; each entry goes to exactly one
/// of them.
///
/// Once the walk's context is cancelled or past its deadline, the sequence
/// ends even if entries are still queued in a buffered channel.
#[derive(Debug, Clone)]
pub struct Entries {
    rx: Receiver<Entry>,
    outcome: Outcome,
    ctx: Context,
}

impl Entries {
    /// Terminal error of this walk, once the sequence has ended.
    pub fn error(&self) -> Option<WalkError> {
        self.outcome.get().cloned().flatten()
    }

    /// Whether the traversal thread has finished.
    pub fn is_finished(&self) -> bool {
        self.outcome.get().is_some()
    }
}

impl Iterator for Entries {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if self.ctx.err().is_some() {
            // Discard whatever is queued and wait for the producer to close
            // the channel, so the outcome is set before we report the end.
            while self.rx.recv().is_ok() {}
            return None;
        }
        self.rx.recv().ok()
    }
}

impl FusedIterator for Entries {}

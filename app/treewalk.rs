//! Command-line interface for treewalk.
//!
//! Streams the entries of a directory tree to stdout as they are found, applying the
//! library's built-in filters.

use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;
use treewalk::output::{self, write_entries};
use treewalk::{Context, FilterRef, Walker, filter};

/// treewalk — lazy directory walker
#[derive(Parser)]
#[command(name = "treewalk", version, about, long_about = None)]
struct Cli {
    /// Root directory (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Leave directories out of the output (their contents are still listed)
    #[arg(long)]
    no_dirs: bool,

    /// Leave regular files out of the output
    #[arg(long)]
    no_files: bool,

    /// Relative path to skip together with everything below it (can be repeated)
    #[arg(long = "skip")]
    skip_paths: Vec<String>,

    /// Glob of relative paths to skip with their subtrees (can be repeated)
    #[arg(long = "skip-glob")]
    skip_globs: Vec<String>,

    /// Only list entries whose relative path matches one of these globs (can be repeated)
    #[arg(long = "only")]
    only: Vec<String>,

    /// Max depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Emit the root itself as "."
    #[arg(long)]
    include_root: bool,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

impl From<OutputFormat> for output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => output::OutputFormat::Plain,
            OutputFormat::Json => output::OutputFormat::Json,
        }
    }
}

impl Cli {
    fn filters(&self) -> Result<Vec<Option<FilterRef>>, treewalk::WalkError> {
        let mut filters = vec![
            self.no_dirs.then(filter::discard_dirs),
            self.no_files.then(filter::discard_regular),
        ];
        if !self.skip_paths.is_empty() {
            filters.push(Some(filter::skip_paths(self.skip_paths.iter().cloned())));
        }
        if !self.skip_globs.is_empty() {
            filters.push(Some(filter::skip_globs(&self.skip_globs)?));
        }
        if !self.only.is_empty() {
            filters.push(Some(filter::discard_unmatched(&self.only)?));
        }
        Ok(filters)
    }

    fn into_walker(self) -> Result<(Walker, Context, PathBuf, OutputFormat), treewalk::WalkError> {
        let mut walker = Walker::new()
            .with_filters(self.filters()?)
            .include_root(self.include_root);

        walker = if let Some(depth) = self.max_depth {
            walker.max_depth(depth)
        } else {
            walker.no_limit_depth()
        };

        let ctx = match self.timeout_ms {
            Some(ms) => Context::background().with_timeout(Duration::from_millis(ms)),
            None => Context::background(),
        };

        Ok((walker, ctx, self.root, self.format))
    }
}

#[cfg(feature = "logging")]
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

fn main() {
    #[cfg(feature = "logging")]
    init_logging();

    let cli = Cli::parse();
    let (walker, ctx, root, format) = match cli.into_walker() {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(2);
        }
    };

    let entries = walker.walk(&ctx, &root);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = write_entries(entries, format.into(), &mut handle) {
        eprintln!("Failed to write to stdout: {}", e);
        exit(1);
    }

    match walker.last_error() {
        Some(e) if e.is_fatal() => {
            eprintln!("Error: {}", e);
            exit(1);
        }
        _ => {}
    }
}

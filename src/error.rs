use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why a walk stopped, or why a walker could not be configured.
///
/// Errors are cheap to clone so the same terminal outcome can be read any
/// number of times through [`Walker::last_error`](crate::Walker::last_error)
/// and [`Entries::error`](crate::Entries::error).
#[derive(Debug, Clone, Error)]
pub enum WalkError {
    /// The directory enumeration failed to read or stat a path.
    #[error("I/O error on {}: {source}", display_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Walk error: {0}")]
    Walk(String),
    /// The context was cancelled while an entry was waiting to be handed off.
    #[error("walk cancelled")]
    Cancelled,
    #[error("walk deadline exceeded")]
    DeadlineExceeded,
    /// A filter returned [`Decision::Abort`](crate::Decision::Abort).
    ///
    /// This is a deliberate stop, not a failure; see [`WalkError::is_fatal`].
    #[error("walk aborted by filter")]
    Aborted,
    /// Every consumer dropped its handle to the output sequence.
    #[error("all consumers dropped the entry sequence")]
    Detached,
    #[error("Invalid pattern: {0}")]
    Pattern(String),
    #[error("failed to spawn walker thread: {0}")]
    Spawn(Arc<io::Error>),
}

impl WalkError {
    pub(crate) fn io(path: Option<PathBuf>, source: io::Error) -> Self {
        WalkError::Io {
            path,
            source: Arc::new(source),
        }
    }

    /// Returns `false` only for [`WalkError::Aborted`], the one outcome a
    /// filter asks for on purpose.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WalkError::Aborted)
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, WalkError::Cancelled | WalkError::DeadlineExceeded)
    }

    /// The underlying I/O error, if this is an enumeration failure.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            WalkError::Io { source, .. } | WalkError::Spawn(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for WalkError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let message = err.to_string();
        match err.into_io_error() {
            Some(source) => WalkError::io(path, source),
            None => WalkError::Walk(message),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<unknown>".to_string(),
    }
}

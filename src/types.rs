use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The kind of filesystem node an [`Entry`] refers to.
///
/// Symlinks are reported as themselves; the walker never follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
    /// Fifos, sockets and device nodes.
    Other,
}

impl EntryKind {
    pub(crate) fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }
}

/// A single node visited by a walk.
///
/// Entries are built by the traversal thread and handed to consumers as
/// owned values; nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Path relative to the walk root. The root itself is `.`.
    #[serde(serialize_with = "serialize_lossy")]
    path: PathBuf,
    name: String,
    kind: EntryKind,
    depth: usize,
    #[serde(skip)]
    full_path: PathBuf,
}

// Non-UTF-8 names are written with replacement characters rather than
// failing the whole record.
fn serialize_lossy<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl Entry {
    pub(crate) fn from_dir_entry(root: &Path, dent: &walkdir::DirEntry) -> Self {
        let relative = match dent.path().strip_prefix(root) {
            Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rel) => rel.to_path_buf(),
            Err(_) => dent.path().to_path_buf(),
        };
        Self {
            path: relative,
            name: dent.file_name().to_string_lossy().into_owned(),
            kind: EntryKind::from_file_type(dent.file_type()),
            depth: dent.depth(),
            full_path: dent.path().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final component of the path, as reported by the directory listing.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// True for regular files only.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Depth below the root; the root is `0`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The root path joined with [`Entry::path`].
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Stats the entry on demand without following symlinks.
    pub fn metadata(&self) -> io::Result<fs::Metadata> {
        fs::symlink_metadata(&self.full_path)
    }
}

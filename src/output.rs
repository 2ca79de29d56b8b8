//! Output formatting for streamed entries.
//!
//! Each entry is formatted on its own line as soon as it arrives, so output can be piped
//! while the walk is still running.

use crate::{Entry, EntryKind};
use std::io::{self, Write};

/// Supported line formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Relative path, with a trailing `/` for directories.
    Plain,
    /// One JSON object per line.
    Json,
}

/// Formats one entry as a single line, without the trailing newline.
pub fn format_entry(entry: &Entry, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Plain => Ok(format_plain(entry)),
        OutputFormat::Json => serde_json::to_string(entry),
    }
}

/// Writes every entry from `entries` to `out`, one line each, and returns how many were written.
///
/// Stops at the first write failure.
pub fn write_entries<I, W>(entries: I, format: OutputFormat, out: &mut W) -> io::Result<usize>
where
    I: IntoIterator<Item = Entry>,
    W: Write,
{
    let mut count = 0;
    for entry in entries {
        let line = format_entry(&entry, format)?;
        writeln!(out, "{}", line)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

// ----------------------- Internal formatting -----------------------

fn format_plain(entry: &Entry) -> String {
    let path = entry.path().display().to_string();
    match entry.kind() {
        EntryKind::Dir if path != "." => format!("{}/", path),
        _ => path,
    }
}

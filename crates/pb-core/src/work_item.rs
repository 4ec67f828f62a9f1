//! The work item model (C2): one input to be processed exactly once per
//! attempt, as a closed two-variant union rather than a trait object — the
//! variant set is fixed, so there's nothing an `impl WorkItem` trait would
//! buy over matching directly.

use std::fs::File;
use std::path::{Path, PathBuf};

use pb_platform::Result;

use crate::abspath::abspath;

/// One input to be processed: either a file (from a directory source) or
/// a line (from a file source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// `name` is `path`'s basename.
    File { name: String, path: PathBuf },
    /// `line` is the raw text, trailing newline preserved when read from
    /// the source file.
    Line { name: String, line: String },
}

impl WorkItem {
    pub fn name(&self) -> &str {
        match self {
            WorkItem::File { name, .. } => name,
            WorkItem::Line { name, .. } => name,
        }
    }

    /// Whether the item's source still exists. File items can disappear
    /// between enumeration and scheduling (§8 scenario 7); line items are
    /// immutable in-memory values and always exist.
    pub fn exists(&self) -> bool {
        match self {
            WorkItem::File { path, .. } => path.exists(),
            WorkItem::Line { .. } => true,
        }
    }

    /// A readable file descriptor carrying the item's bytes, for stdin
    /// mode. File items open the source directly; line items write into a
    /// pipe and hand back the read end.
    pub fn open_input_fd(&self) -> Result<File> {
        match self {
            WorkItem::File { path, .. } => {
                File::open(path).map_err(|source| pb_platform::PlatformError::CreateExclusive {
                    path: path.clone(),
                    source,
                })
            }
            WorkItem::Line { line, .. } => pb_platform::pipe_with_bytes(line.as_bytes()),
        }
    }

    /// The string to substitute for `{}` in the command, before shell
    /// quoting is applied by the caller.
    pub fn as_argument(&self) -> std::io::Result<String> {
        match self {
            WorkItem::File { path, .. } => abspath(path).map(|p| p.display().to_string()),
            WorkItem::Line { line, .. } => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Create the `in` artifact at `path`: a symlink to the absolute
    /// source path for file items, or a plain file containing the line
    /// text for line items.
    pub fn materialize_in_file(&self, path: &Path) -> Result<()> {
        match self {
            WorkItem::File { path: src, .. } => {
                let absolute = abspath(src).map_err(|source| pb_platform::PlatformError::Symlink {
                    src: src.clone(),
                    dst: path.to_path_buf(),
                    source,
                })?;
                pb_platform::symlink(&absolute, path)
            }
            WorkItem::Line { line, .. } => {
                std::fs::write(path, line).map_err(|source| pb_platform::PlatformError::CreateExclusive {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

//! Input enumeration (C3): turn a source path into a batch of
//! [`WorkItem`]s. A directory yields one `File` item per entry; a regular
//! file yields one `Line` item per line.

mod error;
mod naming;

use std::collections::HashSet;
use std::path::Path;

pub use error::{EnumerationError, Result};
pub use naming::{MAX_NAME_LENGTH, line_name};
use pb_core::WorkItem;

/// Enumerate work items from `path`. Non-recursive for directories;
/// universal-newline line splitting for regular files.
pub fn work_items_from_path(path: &Path) -> Result<Vec<WorkItem>> {
    let metadata = std::fs::metadata(path).map_err(|_| EnumerationError::NotFound(path.to_path_buf()))?;
    if metadata.is_dir() {
        work_items_from_directory(path)
    } else {
        work_items_from_file(path)
    }
}

fn work_items_from_directory(dir: &Path) -> Result<Vec<WorkItem>> {
    let entries = std::fs::read_dir(dir).map_err(|source| EnumerationError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| EnumerationError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        items.push(WorkItem::File { name, path });
    }
    Ok(items)
}

fn work_items_from_file(path: &Path) -> Result<Vec<WorkItem>> {
    let bytes = std::fs::read(path).map_err(|source| EnumerationError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| EnumerationError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    let mut items = Vec::new();
    let mut seen_names = HashSet::new();
    for line in universal_newline_split(&text) {
        let name = line_name(&line);
        // Dedup: same name => identical line content, keep only the first.
        if !seen_names.insert(name.clone()) {
            continue;
        }
        items.push(WorkItem::Line { name, line });
    }
    Ok(items)
}

/// Split text on `\n`, `\r\n`, and `\r` line terminators, normalizing each
/// to a single trailing `\n` (except a final unterminated line, which is
/// returned bare) — universal-newline decoding equivalent to Python's text
/// mode.
fn universal_newline_split(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    normalize_newlines(text)
        .split_inclusive('\n')
        .map(str::to_string)
        .collect()
}

fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_yields_one_file_item_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            std::fs::write(dir.path().join(format!("{i}.txt")), format!("hello {i}")).unwrap();
        }
        let mut items = work_items_from_path(dir.path()).unwrap();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].name(), "0.txt");
    }

    #[test]
    fn test_file_yields_one_line_item_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input");
        let lines: Vec<String> = (0..5).map(|i| format!("hello {i}")).collect();
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let items = work_items_from_path(&path).unwrap();
        assert_eq!(items.len(), 5);
        for (i, item) in items.iter().enumerate() {
            match item {
                WorkItem::Line { line, .. } => assert_eq!(line, &format!("hello {i}\n")),
                _ => panic!("expected a line item"),
            }
        }
    }

    #[test]
    fn test_unterminated_final_line_has_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "a\nb").unwrap();
        let items = work_items_from_path(&path).unwrap();
        assert_eq!(items.len(), 2);
        match &items[1] {
            WorkItem::Line { line, .. } => assert_eq!(line, "b"),
            _ => panic!(),
        }
    }

    #[test]
    fn test_crlf_is_normalized_to_lf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();
        let items = work_items_from_path(&path).unwrap();
        assert_eq!(items.len(), 2);
        match &items[0] {
            WorkItem::Line { line, .. } => assert_eq!(line, "a\n"),
            _ => panic!(),
        }
    }

    #[test]
    fn test_duplicate_lines_deduplicate_to_one_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, "hello\nhello\n").unwrap();
        let items = work_items_from_path(&path).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let result = work_items_from_path(Path::new("/no/such/path"));
        assert!(result.is_err());
    }
}

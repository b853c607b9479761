use crate::error::{ToolError, ToolResult};
use crate::security::GuardedPath;
use crate::text::read_text_limit;
use std::fs;
use walkdir::WalkDir;

/// List a directory, optionally recursively
///
/// Recursive listings never follow symlinks, so a link pointing out of the root is
/// shown but not entered. At most `max_entries` entries are listed.
pub fn list_dir(dir: &GuardedPath, recursive: bool, max_entries: usize) -> ToolResult<String> {
    dir.require_dir()?;

    let mut lines = Vec::new();
    let mut total = 0usize;

    if recursive {
        lines.push(format!("Listing {} (recursive):", dir));
        let walker = WalkDir::new(dir.path())
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            total += 1;
            if total > max_entries {
                continue;
            }
            let indent = "  ".repeat(entry.depth() - 1);
            let tag = if entry.file_type().is_dir() { "[D]" } else { "[F]" };
            lines.push(format!(
                "{}{} {}",
                indent,
                tag,
                entry.file_name().to_string_lossy()
            ));
        }
    } else {
        lines.push(format!("Listing {}:", dir));
        let mut entries: Vec<(bool, String)> = fs::read_dir(dir.path())
            .map_err(|e| ToolError::io(dir.path(), e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                (
                    entry.path().is_dir(),
                    entry.file_name().to_string_lossy().into_owned(),
                )
            })
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        total = entries.len();
        for (is_dir, name) in entries.into_iter().take(max_entries) {
            let tag = if is_dir { "[D]" } else { "[F]" };
            lines.push(format!("{} {}", tag, name));
        }
    }

    if total == 0 {
        lines.push("(empty)".to_string());
    } else if total > max_entries {
        lines.push(format!("… ({} more entries not shown)", total - max_entries));
    }

    Ok(lines.join("\n"))
}

/// Read a text file, bounded to `max_bytes`
pub fn read_text_file(file: &GuardedPath, max_bytes: u64) -> ToolResult<String> {
    file.require_file()?;
    read_text_limit(file.path(), max_bytes).map_err(|e| ToolError::io(file.path(), e))
}

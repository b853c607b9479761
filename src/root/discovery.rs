use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of directories examined by upward discovery (start included)
pub const MAX_DISCOVERY_HOPS: usize = 20;

/// File and directory names that mark a project root
///
/// Version control metadata, JavaScript package manifests and lockfiles, and common
/// front-end build tool configuration. Overridable through `[root] markers`.
pub const DEFAULT_PROJECT_MARKERS: &[&str] = &[
    ".git",
    "package.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "next.config.js",
    "next.config.mjs",
    "vite.config.ts",
    "vite.config.js",
    "turbo.json",
];

/// Walk upward from `start` looking for a directory that contains a project marker
///
/// Uses [`DEFAULT_PROJECT_MARKERS`]. See [`discover_root_with`].
pub fn discover_root(start: &Path) -> PathBuf {
    discover_root_with(start, DEFAULT_PROJECT_MARKERS)
}

/// Walk upward from `start` looking for a directory whose entries intersect `markers`
///
/// Examines at most [`MAX_DISCOVERY_HOPS`] directories. Returns `start` unchanged when no
/// marker is found before the filesystem root or the hop budget runs out. Never fails:
/// a directory that cannot be listed simply has no markers.
pub fn discover_root_with<S: AsRef<str>>(start: &Path, markers: &[S]) -> PathBuf {
    let markers: HashSet<&str> = markers.iter().map(|m| m.as_ref()).collect();
    let mut current = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());

    for _ in 0..MAX_DISCOVERY_HOPS {
        if has_marker(&current, &markers) {
            return current;
        }

        let Some(parent) = current.parent().map(Path::to_path_buf) else {
            break;
        };
        if parent == current {
            break;
        }
        current = parent;
    }

    start.to_path_buf()
}

/// Check whether any entry of `dir` is named like a marker
fn has_marker(dir: &Path, markers: &HashSet<&str>) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    entries
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| markers.contains(name))
        })
}

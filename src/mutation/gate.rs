use crate::error::{ToolError, ToolResult};
use crate::mutation::{GateMode, MutationOutcome, PendingEffect, ReplaceKind};
use crate::security::GuardedPath;
use crate::text::head_chars;
use regex::{Regex, RegexBuilder};
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Default bound on the before/after excerpts shown by previews
pub const DEFAULT_PREVIEW_CHARS: usize = 1200;

/// Applies or describes file mutations according to a [`GateMode`]
#[derive(Debug, Clone)]
pub struct MutationGate {
    preview_chars: usize,
}

impl MutationGate {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    /// Create or overwrite a file
    ///
    /// With `overwrite` disabled an existing target is refused in every mode.
    pub fn write(
        &self,
        target: &GuardedPath,
        content: &str,
        mode: GateMode,
        overwrite: bool,
    ) -> ToolResult<MutationOutcome> {
        let path = target.path();
        if target.is_dir() {
            return Err(ToolError::NotAFile(path.to_path_buf()));
        }

        let exists = target.exists();
        if exists && !overwrite {
            return Err(ToolError::OverwriteRefused(path.to_path_buf()));
        }

        if !mode.applies() {
            return Ok(MutationOutcome::Pending {
                mode,
                path: path.to_path_buf(),
                effect: PendingEffect::Write {
                    chars: content.chars().count(),
                    bytes: content.len(),
                    overwrites: exists,
                },
            });
        }

        Self::ensure_parent(target)?;
        fs::write(path, content).map_err(|e| ToolError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");

        Ok(MutationOutcome::Written {
            path: path.to_path_buf(),
            chars: content.chars().count(),
            created: !exists,
        })
    }

    /// Append to a file, creating it when missing
    pub fn append(
        &self,
        target: &GuardedPath,
        content: &str,
        mode: GateMode,
    ) -> ToolResult<MutationOutcome> {
        let path = target.path();
        if target.is_dir() {
            return Err(ToolError::NotAFile(path.to_path_buf()));
        }

        if !mode.applies() {
            return Ok(MutationOutcome::Pending {
                mode,
                path: path.to_path_buf(),
                effect: PendingEffect::Append {
                    chars: content.chars().count(),
                    bytes: content.len(),
                },
            });
        }

        Self::ensure_parent(target)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ToolError::io(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| ToolError::io(path, e))?;
        file.flush().map_err(|e| ToolError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "appended to file");

        Ok(MutationOutcome::Appended {
            path: path.to_path_buf(),
            chars: content.chars().count(),
        })
    }

    /// Replace every occurrence of `find` with `replace`
    pub fn search_replace(
        &self,
        target: &GuardedPath,
        find: &str,
        replace: &str,
        mode: GateMode,
    ) -> ToolResult<MutationOutcome> {
        if find.is_empty() {
            return Err(ToolError::InvalidArgument(
                "search term must not be empty".to_string(),
            ));
        }

        let text = Self::read_target(target)?;
        let count = text.matches(find).count();
        if count == 0 {
            return Ok(MutationOutcome::NoMatches {
                path: target.path().to_path_buf(),
            });
        }

        let new_text = text.replace(find, replace);
        self.finish_replace(target, ReplaceKind::Literal, count, &text, new_text, mode)
    }

    /// Replace every match of `pattern`
    ///
    /// `flags` may contain `i` (case-insensitive), `m` (multi-line anchors) and `s`
    /// (dot matches newline). `replace` uses `$1` / `${name}` group references.
    pub fn regex_replace(
        &self,
        target: &GuardedPath,
        pattern: &str,
        replace: &str,
        flags: &str,
        mode: GateMode,
    ) -> ToolResult<MutationOutcome> {
        let regex = build_regex(pattern, flags)?;

        let text = Self::read_target(target)?;
        let count = regex.find_iter(&text).count();
        if count == 0 {
            return Ok(MutationOutcome::NoMatches {
                path: target.path().to_path_buf(),
            });
        }

        let new_text = regex.replace_all(&text, replace).into_owned();
        self.finish_replace(target, ReplaceKind::Regex, count, &text, new_text, mode)
    }

    fn finish_replace(
        &self,
        target: &GuardedPath,
        kind: ReplaceKind,
        count: usize,
        old_text: &str,
        new_text: String,
        mode: GateMode,
    ) -> ToolResult<MutationOutcome> {
        let path = target.path();
        if !mode.applies() {
            return Ok(MutationOutcome::Pending {
                mode,
                path: path.to_path_buf(),
                effect: PendingEffect::Replace {
                    kind,
                    count,
                    before: head_chars(old_text, self.preview_chars).to_string(),
                    after: head_chars(&new_text, self.preview_chars).to_string(),
                },
            });
        }

        fs::write(path, new_text).map_err(|e| ToolError::io(path, e))?;
        tracing::debug!(path = %path.display(), count, "replaced matches");

        Ok(MutationOutcome::Replaced {
            path: path.to_path_buf(),
            kind,
            count,
        })
    }

    fn read_target(target: &GuardedPath) -> ToolResult<String> {
        target.require_file()?;
        fs::read_to_string(target.path()).map_err(|e| ToolError::io(target.path(), e))
    }

    fn ensure_parent(target: &GuardedPath) -> ToolResult<()> {
        if let Some(parent) = target.path().parent() {
            fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
        }
        Ok(())
    }
}

impl Default for MutationGate {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

/// Compile `pattern` with single-letter flags
pub fn build_regex(pattern: &str, flags: &str) -> ToolResult<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            other => {
                return Err(ToolError::InvalidArgument(format!(
                    "unknown regex flag '{}' (expected i, m or s)",
                    other
                )));
            }
        };
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::ProjectRoot;
    use crate::security::PathGuard;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ProjectRoot) {
        let temp = TempDir::new().unwrap();
        let root = ProjectRoot::new(temp.path()).unwrap();
        (temp, root)
    }

    fn guarded(root: &ProjectRoot, raw: &str) -> GuardedPath {
        PathGuard::new(root).resolve(raw).unwrap()
    }

    #[test]
    fn test_write_dry_run_creates_nothing() {
        let (_temp, root) = setup();
        let target = guarded(&root, "notes/a.txt");

        let outcome = MutationGate::default()
            .write(&target, "hello", GateMode::DryRun, true)
            .unwrap();

        assert!(matches!(
            outcome,
            MutationOutcome::Pending {
                mode: GateMode::DryRun,
                effect: PendingEffect::Write {
                    chars: 5,
                    bytes: 5,
                    overwrites: false
                },
                ..
            }
        ));
        assert!(!root.path().join("notes").exists());
    }

    #[test]
    fn test_write_apply_creates_parents() {
        let (_temp, root) = setup();
        let target = guarded(&root, "notes/a.txt");

        let outcome = MutationGate::default()
            .write(&target, "hello", GateMode::Apply, true)
            .unwrap();

        assert_eq!(
            fs::read_to_string(root.path().join("notes/a.txt")).unwrap(),
            "hello"
        );
        assert!(matches!(
            outcome,
            MutationOutcome::Written {
                chars: 5,
                created: true,
                ..
            }
        ));
    }

    #[test]
    fn test_write_counts_chars_not_bytes() {
        let (_temp, root) = setup();
        let target = guarded(&root, "u.txt");

        let outcome = MutationGate::default()
            .write(&target, "héllo", GateMode::Apply, true)
            .unwrap();
        assert!(matches!(outcome, MutationOutcome::Written { chars: 5, .. }));
    }

    #[test]
    fn test_write_overwrite_refused() {
        let (_temp, root) = setup();
        fs::write(root.path().join("keep.txt"), "original").unwrap();
        let target = guarded(&root, "keep.txt");
        let gate = MutationGate::default();

        for mode in [GateMode::Apply, GateMode::DryRun, GateMode::Preview] {
            let result = gate.write(&target, "new", mode, false);
            assert!(matches!(result, Err(ToolError::OverwriteRefused(_))));
        }
        assert_eq!(
            fs::read_to_string(root.path().join("keep.txt")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_write_overwrite_default_allowed() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "old").unwrap();
        let target = guarded(&root, "f.txt");

        let outcome = MutationGate::default()
            .write(&target, "new", GateMode::Apply, true)
            .unwrap();
        assert!(matches!(outcome, MutationOutcome::Written { created: false, .. }));
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_write_to_directory_refused() {
        let (_temp, root) = setup();
        fs::create_dir(root.path().join("dir")).unwrap();
        let target = guarded(&root, "dir");

        let result = MutationGate::default().write(&target, "x", GateMode::Apply, true);
        assert!(matches!(result, Err(ToolError::NotAFile(_))));
    }

    #[test]
    fn test_append_dry_run_and_apply() {
        let (_temp, root) = setup();
        fs::write(root.path().join("log.txt"), "one\n").unwrap();
        let target = guarded(&root, "log.txt");
        let gate = MutationGate::default();

        gate.append(&target, "two\n", GateMode::DryRun).unwrap();
        assert_eq!(fs::read_to_string(root.path().join("log.txt")).unwrap(), "one\n");

        let outcome = gate.append(&target, "two\n", GateMode::Apply).unwrap();
        assert!(matches!(outcome, MutationOutcome::Appended { chars: 4, .. }));
        assert_eq!(
            fs::read_to_string(root.path().join("log.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    fn test_search_replace_apply() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "foo bar foo").unwrap();
        let target = guarded(&root, "f.txt");

        let outcome = MutationGate::default()
            .search_replace(&target, "foo", "baz", GateMode::Apply)
            .unwrap();

        assert!(matches!(outcome, MutationOutcome::Replaced { count: 2, .. }));
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "baz bar baz");
    }

    #[test]
    fn test_search_replace_preview_is_pure() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "foo bar foo").unwrap();
        let target = guarded(&root, "f.txt");

        let outcome = MutationGate::default()
            .search_replace(&target, "foo", "baz", GateMode::Preview)
            .unwrap();

        match outcome {
            MutationOutcome::Pending {
                mode: GateMode::Preview,
                effect:
                    PendingEffect::Replace {
                        count,
                        before,
                        after,
                        ..
                    },
                ..
            } => {
                assert_eq!(count, 2);
                assert_eq!(before, "foo bar foo");
                assert_eq!(after, "baz bar baz");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "foo bar foo");
    }

    #[test]
    fn test_search_replace_no_matches_in_every_mode() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "foo bar foo").unwrap();
        let target = guarded(&root, "f.txt");
        let gate = MutationGate::default();

        for mode in [GateMode::Apply, GateMode::DryRun, GateMode::Preview] {
            let outcome = gate.search_replace(&target, "qux", "baz", mode).unwrap();
            assert!(matches!(outcome, MutationOutcome::NoMatches { .. }));
        }
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "foo bar foo");
    }

    #[test]
    fn test_search_replace_empty_term_refused() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "abc").unwrap();
        let target = guarded(&root, "f.txt");

        let result = MutationGate::default().search_replace(&target, "", "x", GateMode::Apply);
        assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_search_replace_missing_file() {
        let (_temp, root) = setup();
        let target = guarded(&root, "missing.txt");

        let result = MutationGate::default().search_replace(&target, "a", "b", GateMode::Apply);
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[test]
    fn test_preview_excerpt_is_bounded() {
        let (_temp, root) = setup();
        fs::write(root.path().join("long.txt"), "a".repeat(5000)).unwrap();
        let target = guarded(&root, "long.txt");

        let outcome = MutationGate::new(100)
            .search_replace(&target, "a", "b", GateMode::DryRun)
            .unwrap();
        match outcome {
            MutationOutcome::Pending {
                effect: PendingEffect::Replace { before, after, count, .. },
                ..
            } => {
                assert_eq!(count, 5000);
                assert_eq!(before.chars().count(), 100);
                assert_eq!(after, "b".repeat(100));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_regex_replace_with_groups_and_flags() {
        let (_temp, root) = setup();
        fs::write(root.path().join("v.txt"), "Version 1.2\nversion 3.4\n").unwrap();
        let target = guarded(&root, "v.txt");

        let outcome = MutationGate::default()
            .regex_replace(&target, r"^version (\d+)\.(\d+)$", "v$1-$2", "im", GateMode::Apply)
            .unwrap();

        assert!(matches!(
            outcome,
            MutationOutcome::Replaced {
                kind: ReplaceKind::Regex,
                count: 2,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(root.path().join("v.txt")).unwrap(), "v1-2\nv3-4\n");
    }

    #[test]
    fn test_regex_no_matches() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "hello").unwrap();
        let target = guarded(&root, "f.txt");

        let outcome = MutationGate::default()
            .regex_replace(&target, r"\d+", "N", "", GateMode::Apply)
            .unwrap();
        assert!(matches!(outcome, MutationOutcome::NoMatches { .. }));
    }

    #[test]
    fn test_regex_invalid_pattern_and_flag() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "hello").unwrap();
        let target = guarded(&root, "f.txt");
        let gate = MutationGate::default();

        let result = gate.regex_replace(&target, "(unclosed", "x", "", GateMode::Apply);
        assert!(matches!(result, Err(ToolError::InvalidPattern(_))));

        let result = gate.regex_replace(&target, "h", "x", "q", GateMode::Apply);
        assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_regex_dot_matches_newline_flag() {
        let (_temp, root) = setup();
        fs::write(root.path().join("f.txt"), "<a>\n</a>").unwrap();
        let target = guarded(&root, "f.txt");
        let gate = MutationGate::default();

        let without = gate.regex_replace(&target, "<a>.*</a>", "X", "", GateMode::DryRun).unwrap();
        assert!(matches!(without, MutationOutcome::NoMatches { .. }));

        let with = gate.regex_replace(&target, "<a>.*</a>", "X", "s", GateMode::Apply).unwrap();
        assert!(with.applied());
        assert_eq!(fs::read_to_string(root.path().join("f.txt")).unwrap(), "X");
    }
}

//! Preview/confirm contract for every file mutation
//!
//! A mutating tool call carries a `confirm` flag and, for replacements, a
//! `preview_only` flag. Bytes change on disk if and only if `confirm` is set and
//! `preview_only` is not; every other combination returns a description of what
//! would happen. Confinement has already been checked by the time the gate sees a
//! path: the gate only accepts [`GuardedPath`](crate::security::GuardedPath)s.

pub mod gate;

pub use gate::MutationGate;

use std::fmt;
use std::path::PathBuf;

/// How a mutation request is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Perform the effect exactly once
    Apply,
    /// Confirmation was not given; describe the effect
    DryRun,
    /// A preview was explicitly requested; describe the effect even if confirmed
    Preview,
}

impl GateMode {
    pub fn from_flags(confirm: bool, preview_only: bool) -> Self {
        if preview_only {
            GateMode::Preview
        } else if confirm {
            GateMode::Apply
        } else {
            GateMode::DryRun
        }
    }

    pub fn applies(&self) -> bool {
        matches!(self, GateMode::Apply)
    }

    fn label(&self) -> &'static str {
        match self {
            GateMode::Apply => "APPLIED",
            GateMode::DryRun => "DRY-RUN",
            GateMode::Preview => "PREVIEW",
        }
    }
}

/// Literal text or regular expression replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceKind {
    Literal,
    Regex,
}

impl ReplaceKind {
    fn noun(&self) -> &'static str {
        match self {
            ReplaceKind::Literal => "Replacements",
            ReplaceKind::Regex => "Regex replacements",
        }
    }
}

/// Effect a non-applied request would have had
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEffect {
    Write {
        chars: usize,
        bytes: usize,
        overwrites: bool,
    },
    Append {
        chars: usize,
        bytes: usize,
    },
    Replace {
        kind: ReplaceKind,
        count: usize,
        /// Head of the current content, bounded
        before: String,
        /// Head of the content after replacement, bounded
        after: String,
    },
}

/// Result of passing a request through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Written {
        path: PathBuf,
        chars: usize,
        created: bool,
    },
    Appended {
        path: PathBuf,
        chars: usize,
    },
    Replaced {
        path: PathBuf,
        kind: ReplaceKind,
        count: usize,
    },
    Pending {
        mode: GateMode,
        path: PathBuf,
        effect: PendingEffect,
    },
    /// Search term or pattern not present; nothing previewed, nothing written
    NoMatches { path: PathBuf },
}

impl MutationOutcome {
    /// True when bytes on disk changed
    pub fn applied(&self) -> bool {
        matches!(
            self,
            MutationOutcome::Written { .. }
                | MutationOutcome::Appended { .. }
                | MutationOutcome::Replaced { .. }
        )
    }
}

impl fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationOutcome::Written {
                path,
                chars,
                created,
            } => {
                let what = if *created { "new file" } else { "overwrote" };
                write!(f, "WROTE {} chars to {} ({})", chars, path.display(), what)
            }
            MutationOutcome::Appended { path, chars } => {
                write!(f, "APPENDED {} chars to {}", chars, path.display())
            }
            MutationOutcome::Replaced { path, kind, count } => {
                write!(f, "[APPLIED] {}: {} in {}", kind.noun(), count, path.display())
            }
            MutationOutcome::NoMatches { .. } => f.write_str("No matches."),
            MutationOutcome::Pending { mode, path, effect } => {
                let hint = match mode {
                    GateMode::DryRun => " Set confirm=true to apply.",
                    _ => "",
                };
                match effect {
                    PendingEffect::Write {
                        chars,
                        bytes,
                        overwrites,
                    } => {
                        let target = if *overwrites {
                            "overwriting existing file"
                        } else {
                            "new file"
                        };
                        write!(
                            f,
                            "[{}] Would write {} chars ({} bytes) to {} ({}).{}",
                            mode.label(),
                            chars,
                            bytes,
                            path.display(),
                            target,
                            hint
                        )
                    }
                    PendingEffect::Append { chars, bytes } => write!(
                        f,
                        "[{}] Would append {} chars ({} bytes) to {}.{}",
                        mode.label(),
                        chars,
                        bytes,
                        path.display(),
                        hint
                    ),
                    PendingEffect::Replace {
                        kind,
                        count,
                        before,
                        after,
                    } => write!(
                        f,
                        "[{}] {}: {} in {}.{}\n--- OLD (head) ---\n{}\n--- NEW (head) ---\n{}",
                        mode.label(),
                        kind.noun(),
                        count,
                        path.display(),
                        hint,
                        before,
                        after
                    ),
                }
            }
        }
    }
}

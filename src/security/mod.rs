pub mod allowlist;
pub mod path_guard;

pub use allowlist::{BlockReason, CommandAllowlist, Program, ValidatedCommand};
pub use path_guard::{GuardedPath, PathGuard, assert_inside, to_absolute};

/// Argument prefixes permitted for `git`
///
/// Matched against the whole argument string, so `"add "` (with the space) permits
/// `git add <path>` but not `git add` alone. Adding an entry requires a security review:
/// everything after the prefix is passed through unchecked apart from the blocked flags.
pub const ALLOWED_GIT_PREFIXES: &[&str] = &[
    // Read operations
    "status",
    "diff",
    "log",
    "show",
    "rev-parse",
    "branch",
    // Write operations
    "add ",
    "restore ",
    "checkout ",
    "commit ",
    "switch",
];

/// Argument prefixes permitted for `npm`
pub const ALLOWED_NPM_PREFIXES: &[&str] = &["install", "run ", "test", "ci"];

/// Flags that would let `git` act outside the project root
pub const BLOCKED_GIT_FLAGS: &[&str] = &[
    "--git-dir",
    "--work-tree",
    "--output",
    "--exec-path",
    "--upload-pack",
    "--receive-pack",
    "--no-index",
];

/// Flags that would let `npm` act outside the project root
///
/// npm also accepts unambiguous abbreviations (`--pref`, `--glob`) and any number of
/// leading dashes, so long flags are matched by prefix as well.
pub const BLOCKED_NPM_FLAGS: &[&str] = &[
    "--prefix",
    "-g",
    "--global",
    "--location",
    "--userconfig",
    "--globalconfig",
];

/// Letter-only npm option names that contain a blocked shorthand letter
///
/// npm splits an unknown letter-only option into single-letter shorthands, so
/// `--dg` means `-d -g`. Complete option names are never split.
pub const NPM_LETTER_OPTIONS: &[&str] = &[
    "git", "long", "loglevel", "package", "progress", "registry", "tag", "usage",
];

pub mod discovery;

pub use discovery::{DEFAULT_PROJECT_MARKERS, MAX_DISCOVERY_HOPS, discover_root, discover_root_with};

use crate::error::RootError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that pre-seeds the project root, skipping discovery
pub const ROOT_OVERRIDE_ENV: &str = "PROJECT_ROOT";

/// The directory every file and process operation is confined to
///
/// Always canonical and always an existing directory at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    path: PathBuf,
}

impl ProjectRoot {
    /// Use `path` as the root. It must exist and be a directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RootError> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RootError::NotADirectory(path.to_path_buf()),
            _ => RootError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !canonical.is_dir() {
            return Err(RootError::NotADirectory(canonical));
        }

        Ok(Self { path: canonical })
    }

    /// Discover the root by walking upward from `start` looking for `markers`
    ///
    /// Falls back to `start` itself when nothing is found. That fallback is a trust
    /// boundary: whoever controls the starting directory controls the jail.
    pub fn discover<S: AsRef<str>>(start: &Path, markers: &[S]) -> Result<Self, RootError> {
        let found = discover_root_with(start, markers);
        if found == start && !Self::dir_has_marker(start, markers) {
            tracing::warn!(
                start = %start.display(),
                "no project marker found above start directory; using it as the project root"
            );
        }
        Self::new(found)
    }

    /// Resolve the root used at startup
    ///
    /// An explicit override (command line or `PROJECT_ROOT`) wins and bypasses marker
    /// discovery; otherwise discovery starts from `cwd`.
    pub fn at_startup<S: AsRef<str>>(
        explicit: Option<&Path>,
        cwd: &Path,
        markers: &[S],
    ) -> Result<Self, RootError> {
        match explicit {
            Some(path) => {
                tracing::info!(root = %path.display(), "using explicit project root");
                Self::new(path)
            }
            None => Self::discover(cwd, markers),
        }
    }

    /// Get the root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir_has_marker<S: AsRef<str>>(dir: &Path, markers: &[S]) -> bool {
        markers.iter().any(|m| dir.join(m.as_ref()).exists())
    }
}

impl AsRef<Path> for ProjectRoot {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

use crate::error::ToolError;
use crate::root::ProjectRoot;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the project root
///
/// Relative paths are joined to the *current* root, never to the process working
/// directory, so a root change takes effect for every later call.
pub fn to_absolute<P: AsRef<Path>>(root: &ProjectRoot, path: P) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.path().join(path)
    }
}

/// Resolve `path` and fail unless it lies inside `root`
///
/// Existing paths are canonicalized. For a path that does not exist yet, the nearest
/// existing ancestor is canonicalized and the missing components are appended
/// lexically, so creating a new file is confined the same way. A dangling or looping
/// symlink on the way cannot be resolved and is refused.
///
/// Returns the resolved absolute path, which is what callers must operate on.
pub fn assert_inside<P: AsRef<Path>>(root: &ProjectRoot, path: P) -> Result<PathBuf, ToolError> {
    let absolute = to_absolute(root, path);
    let violation = |path: PathBuf| ToolError::ConfinementViolation {
        path,
        root: root.path().to_path_buf(),
    };

    let resolved = resolve(&absolute).ok_or_else(|| violation(absolute.clone()))?;
    if resolved.starts_with(root.path()) {
        Ok(resolved)
    } else {
        Err(violation(resolved))
    }
}

/// Canonical form of `absolute`, tolerating missing trailing components
fn resolve(absolute: &Path) -> Option<PathBuf> {
    let (base, tail) = split_existing(absolute)?;
    let had_parent_dir = tail.iter().any(|c| matches!(c, Component::ParentDir));
    let joined = join_lexically(base, &tail);

    if !had_parent_dir {
        return Some(joined);
    }

    // `..` in the missing part may have stepped back onto existing entries,
    // including symlinks, so resolve the flattened path once more
    let (base, tail) = split_existing(&joined)?;
    Some(join_lexically(base, &tail))
}

/// Split into the canonical longest existing prefix and the components after it
///
/// Returns `None` when an entry exists but cannot be canonicalized (dangling or
/// looping symlink).
fn split_existing(path: &Path) -> Option<(PathBuf, Vec<Component<'_>>)> {
    let components: Vec<Component<'_>> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        match fs::canonicalize(&prefix) {
            Ok(base) => return Some((base, components[split..].to_vec())),
            Err(_) if fs::symlink_metadata(&prefix).is_ok() => return None,
            Err(_) => continue,
        }
    }

    None
}

fn join_lexically(mut base: PathBuf, tail: &[Component<'_>]) -> PathBuf {
    for component in tail {
        match component {
            Component::Normal(name) => base.push(name),
            Component::ParentDir => {
                base.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    base
}

/// A path that has passed confinement checks against a specific root
///
/// Only [`PathGuard::resolve`] constructs one, so any function taking a `GuardedPath`
/// cannot be handed an unchecked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedPath {
    resolved: PathBuf,
}

impl GuardedPath {
    /// Resolved absolute path
    pub fn path(&self) -> &Path {
        &self.resolved
    }

    pub fn exists(&self) -> bool {
        self.resolved.exists()
    }

    pub fn is_file(&self) -> bool {
        self.resolved.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.resolved.is_dir()
    }

    /// Require an existing regular file
    pub fn require_file(&self) -> Result<(), ToolError> {
        if !self.exists() {
            return Err(ToolError::NotFound(self.resolved.clone()));
        }
        if !self.is_file() {
            return Err(ToolError::NotAFile(self.resolved.clone()));
        }
        Ok(())
    }

    /// Require an existing directory
    pub fn require_dir(&self) -> Result<(), ToolError> {
        if !self.exists() {
            return Err(ToolError::NotFound(self.resolved.clone()));
        }
        if !self.is_dir() {
            return Err(ToolError::NotADirectory(self.resolved.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for GuardedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved.display())
    }
}

/// Confines caller-supplied paths to one project root
pub struct PathGuard<'a> {
    root: &'a ProjectRoot,
}

impl<'a> PathGuard<'a> {
    pub fn new(root: &'a ProjectRoot) -> Self {
        Self { root }
    }

    /// Resolve a caller-supplied path, refusing anything outside the root
    pub fn resolve<P: AsRef<Path>>(&self, raw: P) -> Result<GuardedPath, ToolError> {
        let resolved = assert_inside(self.root, raw)?;
        Ok(GuardedPath { resolved })
    }
}

use crate::error::{RootError, ToolError, ToolResult};
use crate::root::ProjectRoot;
use crate::security::{PathGuard, to_absolute};

/// State of one agent session: the current jail plus scratch memory
///
/// Nothing here is persisted. The root is only reassigned through
/// [`Session::set_root`], which keeps the previous root on failure.
#[derive(Debug, Clone)]
pub struct Session {
    root: ProjectRoot,
    notes: Vec<String>,
    todos: Vec<String>,
}

impl Session {
    pub fn new(root: ProjectRoot) -> Self {
        Self {
            root,
            notes: Vec::new(),
            todos: Vec::new(),
        }
    }

    /// Get the current project root
    pub fn root(&self) -> &ProjectRoot {
        &self.root
    }

    /// Path guard bound to the current root
    pub fn guard(&self) -> PathGuard<'_> {
        PathGuard::new(&self.root)
    }

    /// Replace the project root
    ///
    /// Relative paths resolve against the current root. The new root must be an
    /// existing directory; otherwise the current root stays in place.
    pub fn set_root(&mut self, path: &str) -> Result<&ProjectRoot, RootError> {
        let candidate = to_absolute(&self.root, path);
        let new_root = ProjectRoot::new(&candidate)?;
        tracing::info!(from = %self.root, to = %new_root, "project root changed");
        self.root = new_root;
        Ok(&self.root)
    }

    /// Save a note, returning its 1-based number
    pub fn add_note(&mut self, text: &str) -> ToolResult<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ToolError::InvalidArgument("empty note.".to_string()));
        }
        self.notes.push(text.to_string());
        Ok(self.notes.len())
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Add a todo, returning its 1-based number
    pub fn add_todo(&mut self, item: &str) -> ToolResult<usize> {
        let item = item.trim();
        if item.is_empty() {
            return Err(ToolError::InvalidArgument("empty todo.".to_string()));
        }
        self.todos.push(item.to_string());
        Ok(self.todos.len())
    }

    pub fn todos(&self) -> &[String] {
        &self.todos
    }

    /// Remove the todo at 1-based `index` and return it
    pub fn complete_todo(&mut self, index: i64) -> ToolResult<String> {
        let position = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .filter(|&i| i < self.todos.len())
            .ok_or(ToolError::InvalidIndex(index))?;
        Ok(self.todos.remove(position))
    }
}

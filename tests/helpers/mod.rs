#![allow(dead_code)]

use rootguard::config::LimitsConfig;
use rootguard::{ProjectRoot, Session, Toolbox};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Create a throwaway web project: `<temp>/project` with a package.json marker
///
/// The temp dir itself is left as the "outside" area for escape attempts.
pub fn create_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("package.json"), "{\"name\": \"demo\"}\n").unwrap();
    fs::write(project.join("src").join("index.ts"), "export const x = 1;\n").unwrap();
    fs::write(temp_dir.path().join("secret.txt"), "outside\n").unwrap();

    let project = project.canonicalize().unwrap();
    (temp_dir, project)
}

/// Toolbox jailed to `root` with default limits
pub fn toolbox_at(root: &Path) -> Toolbox {
    let root = ProjectRoot::new(root).unwrap();
    Toolbox::new(Session::new(root), LimitsConfig::default())
}

/// Helper to create a test git repository
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().canonicalize().unwrap();

    git(&repo_path, &["init"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);
    git(&repo_path, &["config", "commit.gpgsign", "false"]);

    (temp_dir, repo_path)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-m", message]);
}

fn git(repo_path: &Path, args: &[&str]) {
    Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
}

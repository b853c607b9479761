// End-to-end scenarios through the tool surface: every path goes through the jail and
// every mutation through the gate.

mod helpers;

use helpers::{create_project, toolbox_at};
use rootguard::{ToolCall, ToolError, ToolOutput};
use std::fs;

fn write(path: &str, content: &str, confirm: bool) -> ToolCall {
    ToolCall::WriteTextFile {
        path: path.to_string(),
        content: content.to_string(),
        confirm,
        overwrite: true,
    }
}

#[tokio::test]
async fn test_write_is_dry_run_until_confirmed() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);
    let target = project.join("notes").join("hello.txt");

    let dry = toolbox.call(write("notes/hello.txt", "hello", false)).await;
    assert!(dry.starts_with("[DRY-RUN] Would write 5 chars"));
    assert!(dry.ends_with("Set confirm=true to apply."));
    assert!(!target.exists());

    let applied = toolbox.call(write("notes/hello.txt", "hello", true)).await;
    assert_eq!(
        applied,
        format!("WROTE 5 chars to {} (new file)", target.display())
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
}

#[tokio::test]
async fn test_traversal_is_refused_everywhere() {
    let (temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    let calls = vec![
        ToolCall::ReadTextFile {
            path: "../../etc/passwd".to_string(),
            max_bytes: None,
        },
        ToolCall::ReadTextFile {
            path: "../secret.txt".to_string(),
            max_bytes: None,
        },
        ToolCall::ListDir {
            path: "..".to_string(),
            recursive: true,
        },
        write("../escaped.txt", "x", true),
        ToolCall::AppendTextFile {
            path: "/etc/hosts".to_string(),
            content: "x".to_string(),
            confirm: true,
        },
        ToolCall::SearchReplaceFile {
            path: "src/../../secret.txt".to_string(),
            find: "outside".to_string(),
            replace: "inside".to_string(),
            confirm: true,
            preview_only: false,
        },
    ];

    for call in calls {
        let name = call.name();
        let result = toolbox.invoke(call).await;
        assert!(
            matches!(result, Err(ToolError::ConfinementViolation { .. })),
            "{} was not refused: {:?}",
            name,
            result
        );
    }

    assert!(!temp.path().join("escaped.txt").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("secret.txt")).unwrap(),
        "outside\n"
    );
}

#[tokio::test]
async fn test_refusal_text_names_root_and_path() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    let text = toolbox
        .call(ToolCall::ReadTextFile {
            path: "../../etc/passwd".to_string(),
            max_bytes: None,
        })
        .await;
    assert!(text.starts_with("Refused: path outside project root"));
    assert!(text.contains(&project.display().to_string()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_out_of_root_is_refused() {
    let (temp, project) = create_project();
    std::os::unix::fs::symlink(temp.path().join("secret.txt"), project.join("link.txt")).unwrap();
    let mut toolbox = toolbox_at(&project);

    let result = toolbox
        .invoke(ToolCall::ReadTextFile {
            path: "link.txt".to_string(),
            max_bytes: None,
        })
        .await;
    assert!(matches!(result, Err(ToolError::ConfinementViolation { .. })));

    let result = toolbox.invoke(write("link.txt", "pwned", true)).await;
    assert!(matches!(result, Err(ToolError::ConfinementViolation { .. })));
    assert_eq!(
        fs::read_to_string(temp.path().join("secret.txt")).unwrap(),
        "outside\n"
    );
}

#[tokio::test]
async fn test_search_replace_preview_then_apply() {
    let (_temp, project) = create_project();
    fs::write(project.join("a.txt"), "foo bar foo").unwrap();
    let mut toolbox = toolbox_at(&project);

    let replace = |confirm: bool, preview_only: bool| ToolCall::SearchReplaceFile {
        path: "a.txt".to_string(),
        find: "foo".to_string(),
        replace: "baz".to_string(),
        confirm,
        preview_only,
    };

    // preview_only wins over confirm
    let preview = toolbox.call(replace(true, true)).await;
    assert!(preview.starts_with("[PREVIEW] Replacements: 2"));
    assert!(preview.contains("--- OLD (head) ---\nfoo bar foo"));
    assert!(preview.contains("--- NEW (head) ---\nbaz bar baz"));
    assert_eq!(fs::read_to_string(project.join("a.txt")).unwrap(), "foo bar foo");

    let applied = toolbox.call(replace(true, false)).await;
    assert!(applied.starts_with("[APPLIED] Replacements: 2 in"));
    assert_eq!(fs::read_to_string(project.join("a.txt")).unwrap(), "baz bar baz");

    assert_eq!(toolbox.call(replace(true, false)).await, "No matches.");
}

#[tokio::test]
async fn test_regex_replace_with_flags() {
    let (_temp, project) = create_project();
    fs::write(project.join("b.txt"), "Color colour COLOR").unwrap();
    let mut toolbox = toolbox_at(&project);

    let result = toolbox
        .invoke(ToolCall::RegexReplaceFile {
            path: "b.txt".to_string(),
            pattern: "colou?r".to_string(),
            replace: "hue".to_string(),
            flags: "i".to_string(),
            confirm: true,
            preview_only: false,
        })
        .await
        .unwrap();
    assert!(matches!(result, ToolOutput::Mutation(ref m) if m.applied()));
    assert_eq!(fs::read_to_string(project.join("b.txt")).unwrap(), "hue hue hue");

    let bad = toolbox
        .invoke(ToolCall::RegexReplaceFile {
            path: "b.txt".to_string(),
            pattern: "(".to_string(),
            replace: "x".to_string(),
            flags: String::new(),
            confirm: true,
            preview_only: false,
        })
        .await;
    assert!(matches!(bad, Err(ToolError::InvalidPattern(_))));
}

#[tokio::test]
async fn test_overwrite_false_refuses_existing_file() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    let call = ToolCall::WriteTextFile {
        path: "package.json".to_string(),
        content: "{}".to_string(),
        confirm: true,
        overwrite: false,
    };
    let text = toolbox.call(call).await;
    assert!(text.starts_with("Refused: exists and overwrite=false"));
    assert_eq!(
        fs::read_to_string(project.join("package.json")).unwrap(),
        "{\"name\": \"demo\"}\n"
    );
}

#[tokio::test]
async fn test_append_creates_then_extends() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    for _ in 0..2 {
        toolbox
            .invoke(ToolCall::AppendTextFile {
                path: "log/changes.md".to_string(),
                content: "- line\n".to_string(),
                confirm: true,
            })
            .await
            .unwrap();
    }
    assert_eq!(
        fs::read_to_string(project.join("log").join("changes.md")).unwrap(),
        "- line\n- line\n"
    );
}

#[tokio::test]
async fn test_relative_paths_follow_root_change() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    let text = toolbox
        .call(ToolCall::SetProjectRoot {
            path: "src".to_string(),
        })
        .await;
    assert_eq!(
        text,
        format!("Project root set to: {}", project.join("src").display())
    );

    let content = toolbox
        .call(ToolCall::ReadTextFile {
            path: "index.ts".to_string(),
            max_bytes: None,
        })
        .await;
    assert_eq!(content, "export const x = 1;\n");

    // The old root is now outside the jail
    let result = toolbox
        .invoke(ToolCall::ReadTextFile {
            path: "../package.json".to_string(),
            max_bytes: None,
        })
        .await;
    assert!(matches!(result, Err(ToolError::ConfinementViolation { .. })));
}

#[tokio::test]
async fn test_list_dir_default_is_root() {
    let (_temp, project) = create_project();
    let mut toolbox = toolbox_at(&project);

    let call = ToolCall::from_parts("list_dir", serde_json::json!({})).unwrap();
    let listing = toolbox.call(call).await;
    assert_eq!(
        listing,
        format!("Listing {}:\n[F] package.json\n[D] src", project.display())
    );
}

use crate::text::head_chars;

/// Build a review request around a code snippet (nothing is executed)
pub fn code_review_snippet(code: &str, language: &str, goals: &str, max_chars: usize) -> String {
    let goals = goals.trim();
    let header = if goals.is_empty() {
        "[Review]".to_string()
    } else {
        format!("[Review goals: {}]", goals)
    };

    let language = language.trim();
    let language_line = if language.is_empty() || language.eq_ignore_ascii_case("auto") {
        String::new()
    } else {
        format!("[Language: {}]\n", language)
    };

    format!(
        "{}\n{}\nCODE START\n{}\nCODE END\n\nPlease provide:\n\
         - bugs/risks\n\
         - readability improvements\n\
         - performance notes\n\
         - security pitfalls\n\
         - a minimal patch sketch (diff-like) if applicable.",
        header,
        language_line,
        head_chars(code, max_chars)
    )
}

/// Draft a commit message from a short summary
///
/// The `conventional` style prefixes `feat: `, even to an empty summary. Any other
/// style uses the summary as is, or `chore: update` when it is empty.
pub fn propose_commit_message(changes_summary: &str, style: &str) -> String {
    let summary = changes_summary.trim();
    if style.trim().eq_ignore_ascii_case("conventional") {
        format!("feat: {}", summary)
    } else if summary.is_empty() {
        "chore: update".to_string()
    } else {
        summary.to_string()
    }
}

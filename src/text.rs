use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Marker appended when a file read hits its byte budget
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED OUTPUT]";

/// First `max` characters of `s` (not bytes, so multi-byte text is never split)
pub fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Read at most `max_bytes` of a file as text
///
/// Invalid UTF-8 is replaced rather than rejected. When the file is longer than the
/// budget, [`TRUNCATION_MARKER`] is appended.
pub fn read_text_limit(path: &Path, max_bytes: u64) -> io::Result<String> {
    let file = File::open(path)?;
    let mut data = Vec::new();
    file.take(max_bytes.saturating_add(1)).read_to_end(&mut data)?;

    let truncated = data.len() as u64 > max_bytes;
    if truncated {
        data.truncate(max_bytes as usize);
    }

    let mut text = String::from_utf8_lossy(&data).into_owned();
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    Ok(text)
}

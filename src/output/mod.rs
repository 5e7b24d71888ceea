// Output formatting: terminal display and report generation.

pub mod markdown;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so accented names and titles never
/// cause a panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Format an optional section score for tables: "0.42" or "-".
pub fn format_section_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.2}"),
        None => "-".to_string(),
    }
}

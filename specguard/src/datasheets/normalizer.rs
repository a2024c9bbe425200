//! Datasheet text normalization
//!
//! Turns raw PDF page text into one trimmed line per item before it is
//! embedded in an extraction prompt.

/// Glyphs PDF extractors emit for list bullets.
const BULLET_GLYPHS: &[char] = &['•', '●', '▪', '◦', '\u{f0b7}'];

/// Normalize raw datasheet text. Pure and idempotent.
///
/// Per line, in order: bullet glyphs become `-`, surrounding whitespace is
/// stripped, an `o ` sub-bullet becomes `- `, and a bare `-` is dropped.
/// Trailing blank lines are dropped so the output is a fixed point.
pub fn normalize(raw_text: &str) -> String {
    let mut lines: Vec<String> = raw_text.lines().filter_map(normalize_line).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn normalize_line(line: &str) -> Option<String> {
    let replaced: String = line
        .chars()
        .map(|c| if BULLET_GLYPHS.contains(&c) { '-' } else { c })
        .collect();
    let trimmed = replaced.trim();

    let line = match trimmed.strip_prefix("o ") {
        Some(rest) => format!("- {}", rest.trim_start()),
        None => trimmed.to_string(),
    };

    if line == "-" {
        None
    } else {
        Some(line)
    }
}

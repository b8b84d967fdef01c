// Small text utilities shared by the scorers and platform shaping.
// All lengths are in characters, never bytes.

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Final paragraph (after the last blank line), or the last 200 characters
/// when the text has no paragraph breaks.
pub fn closing_section(text: &str) -> &str {
    if let Some(idx) = text.rfind("\n\n") {
        return &text[idx + 2..];
    }
    let len = char_len(text);
    if len <= 200 {
        return text;
    }
    match text.char_indices().nth(len - 200) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => text,
    }
}

/// Whether any line starts with a bullet or numbered-list marker.
pub fn has_list_markers(text: &str) -> bool {
    text.lines().map(str::trim_start).any(|line| {
        line.starts_with("- ")
            || line.starts_with("* ")
            || line.starts_with("• ")
            || numbered_item(line)
    })
}

fn numbered_item(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

/// Markdown headers or bold emphasis.
pub fn has_header_markers(text: &str) -> bool {
    ["##", "H2:", "H3:", "**"].iter().any(|m| text.contains(m))
}

/// Lines that read as headings: starting with `#` or carrying `**` emphasis.
pub fn header_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| line.trim_start().starts_with('#') || line.contains("**"))
}

pub fn sentence_terminators(text: &str) -> usize {
    text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count()
}

/// Cut `text` to at most `max_bytes`, backing off to the previous char boundary.
/// Returns the kept prefix and whether anything was cut.
pub fn cap_input(text: &str, max_bytes: usize) -> (&str, bool) {
    if text.len() <= max_bytes {
        return (text, false);
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}

/// Prepare PDF-recovered text for pattern matching.
/// Drops control characters, turns table rules and NBSP into spaces, folds
/// Greek mu into the micro sign, trims each line and removes blank ones.
pub fn sanitize_report_text(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\n' | '\t' => Some(c),
            '|' | '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
            // Greek small mu, as emitted by some PDF fonts for "µL"
            '\u{03BC}' => Some('\u{00B5}'),
            '\r' => Some('\n'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

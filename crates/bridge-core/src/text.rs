/// Bounds a response body for inclusion in an error message. Truncation is
/// character-safe, never mid code point.
pub fn truncate_for_error(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    let mut out = String::new();
    for (index, ch) in trimmed.chars().enumerate() {
        if index >= max_chars {
            out.push_str("...");
            return out;
        }
        out.push(ch);
    }
    out
}

/// Canonical form used for change deduplication: lower-cased, punctuation
/// removed, whitespace runs collapsed to one space.
#[must_use]
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    for ch in line.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() {
            pending_space = true;
        }
        // punctuation is dropped without introducing a word break
    }
    out
}

/// Stable 64-bit hash (16 hex chars) of the normalized line.
#[must_use]
pub fn line_hash(line: &str) -> String {
    let normalized = normalize_line(line);
    let digest = blake3::hash(normalized.as_bytes());
    digest.to_hex()[..16].to_string()
}

/// Normalize release-note text before chunking.
///
/// CRLF and lone CR become LF, trailing whitespace is trimmed per line, and
/// runs of more than two blank lines collapse to two.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    for line in unified.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_matches('\n').to_string()
}

/// Split `text` into chunks of at most `max_chars` bytes.
///
/// Cuts land after a newline when one exists past the overlap window,
/// otherwise on a char boundary. Each chunk after the first starts `overlap`
/// bytes before the previous chunk's end.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let overlap = overlap.min(max_chars / 2);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        if text.len() - start <= max_chars {
            push_chunk(&mut chunks, &text[start..]);
            break;
        }

        let hard_end = floor_char_boundary(text, start + max_chars);
        let window = &text[start..hard_end];
        let cut = match window.rfind('\n') {
            Some(idx) if idx + 1 > overlap => start + idx + 1,
            _ if hard_end > start => hard_end,
            // A single char wider than the budget.
            _ => ceil_char_boundary(text, start + 1),
        };
        push_chunk(&mut chunks, &text[start..cut]);

        let next = floor_char_boundary(text, cut.saturating_sub(overlap));
        start = if next > start { next } else { cut };
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, chunk: &str) {
    if !chunk.trim().is_empty() {
        chunks.push(chunk.to_string());
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(text.len())
}

use crate::change::{Change, ChangeType};
use crate::component::extract_component;
use crate::normalize::line_hash;
use crate::patterns::{classify_line, is_notable_heading};
use crate::version::VersionId;
use std::collections::HashSet;

/// Classify one version section into typed, deduplicated changes.
///
/// Pure and total: any text (including empty text) yields a possibly empty
/// list, in source-line order.
#[must_use]
pub fn extract(version: &VersionId, section_text: &str) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut notable_level: Option<usize> = None;

    for raw in section_text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(level) = heading_level(line) {
            if is_notable_heading(line) {
                notable_level = Some(notable_level.map_or(level, |current| current.min(level)));
            } else if notable_level.is_some_and(|current| level <= current) {
                notable_level = None;
            }
            continue;
        }

        let change_type = match classify_line(line) {
            Some(change_type) => change_type,
            None if notable_level.is_some() && is_bullet(line) => ChangeType::Other,
            None => continue,
        };

        let raw_line_hash = line_hash(line);
        if !seen.insert(raw_line_hash.clone()) {
            log::debug!("Skipping duplicate line in {version}: {line}");
            continue;
        }

        changes.push(Change {
            version: version.clone(),
            change_type,
            description: line.to_string(),
            component: extract_component(line),
            raw_line_hash,
        });
    }

    log::debug!("Extracted {} changes for {version}", changes.len());
    changes
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match line[level..].chars().next() {
        None => Some(level),
        Some(c) if c.is_whitespace() => Some(level),
        Some(_) => None,
    }
}

fn is_bullet(line: &str) -> bool {
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
    {
        return !rest.trim().is_empty();
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(line[digits..].as_bytes(), [b'.' | b')', b' ', ..])
}

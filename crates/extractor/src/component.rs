use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code pattern"));

static API_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-z][a-z0-9.-]*/v\d+(?:(?:alpha|beta)\d+)?)\b").expect("valid api path pattern")
});

static CAMEL_BEFORE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z0-9]+(?:[A-Z][A-Za-z0-9]*)+)\s+(?i:api|field|flag)\b")
        .expect("valid camel-case pattern")
});

static CAMEL_AFTER_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:api|field|flag)\s+([A-Z][a-z0-9]+(?:[A-Z][A-Za-z0-9]*)+)\b")
        .expect("valid camel-case pattern")
});

static KIND_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-zA-Z]+(?:API|Policy|Controller|Manager))\b")
        .expect("valid kind suffix pattern")
});

static CLI_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(--[a-z0-9][a-z0-9-]+)").expect("valid flag pattern"));

/// Best-effort identifier of the thing a change line talks about.
///
/// Preference order: inline code, `group/version` API path, CamelCase name next
/// to "API"/"field"/"flag", a `...Policy`/`...Controller` style kind, then a
/// command-line flag.
#[must_use]
pub fn extract_component(line: &str) -> Option<String> {
    if let Some(code) = INLINE_CODE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
    {
        return Some(code.to_string());
    }

    [
        &*API_PATH,
        &*CAMEL_BEFORE_KEYWORD,
        &*CAMEL_AFTER_KEYWORD,
        &*KIND_SUFFIX,
        &*CLI_FLAG,
    ]
    .into_iter()
    .find_map(|re| re.captures(line).and_then(|caps| caps.get(1)))
    .map(|m| m.as_str().to_string())
}

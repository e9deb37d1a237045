use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};
use upgrade_extractor::{Change, VersionId};

pub const DOCUMENT_TEMPLATES_SCHEMA_VERSION: u32 = 1;

const ALLOWED_PLACEHOLDERS: &str = "type, TYPE, version, description, component, tool, text, seq";

/// Text shapes of the two document projections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplates {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_atomic_template")]
    pub atomic_change: String,
    #[serde(default = "default_full_template")]
    pub full_content: String,
}

fn default_schema_version() -> u32 {
    DOCUMENT_TEMPLATES_SCHEMA_VERSION
}

fn default_max_chars() -> usize {
    8192
}

fn default_atomic_template() -> String {
    "[{TYPE}] {version}: {description}".to_string()
}

fn default_full_template() -> String {
    "{tool} {version}\n{text}".to_string()
}

impl Default for DocumentTemplates {
    fn default() -> Self {
        Self {
            schema_version: DOCUMENT_TEMPLATES_SCHEMA_VERSION,
            max_chars: default_max_chars(),
            atomic_change: default_atomic_template(),
            full_content: default_full_template(),
        }
    }
}

impl DocumentTemplates {
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != DOCUMENT_TEMPLATES_SCHEMA_VERSION {
            return Err(VectorStoreError::Template(format!(
                "Unsupported document template schema_version {} (expected {DOCUMENT_TEMPLATES_SCHEMA_VERSION})",
                self.schema_version
            )));
        }

        let max_chars = self.max_chars;
        if !(256..=200_000).contains(&max_chars) {
            return Err(VectorStoreError::Template(format!(
                "templates.max_chars must be in [256, 200000] (got {max_chars})"
            )));
        }

        for template in [&self.atomic_change, &self.full_content] {
            for name in extract_placeholders(template)? {
                if !is_allowed_placeholder(&name) {
                    return Err(VectorStoreError::Template(format!(
                        "Unsupported template placeholder '{{{name}}}'. Allowed: {ALLOWED_PLACEHOLDERS}",
                    )));
                }
            }
        }

        Ok(())
    }

    /// Canonical one-line text of a change, e.g. `[DEPRECATION] 1.21.0: ...`.
    pub fn render_atomic(&self, tool: &str, change: &Change) -> Result<String> {
        let version = change.version.to_string();
        let component = change.component.as_deref().unwrap_or("");
        render_template(&self.atomic_change, self.max_chars, |key| match key {
            "type" => Some(change.change_type.as_str()),
            "TYPE" => Some(change.change_type.label()),
            "version" => Some(version.as_str()),
            "description" | "text" => Some(change.description.as_str()),
            "component" => Some(component),
            "tool" => Some(tool),
            _ => None,
        })
    }

    /// Text of one full-content chunk.
    pub fn render_full(
        &self,
        tool: &str,
        version: &VersionId,
        seq: usize,
        text: &str,
    ) -> Result<String> {
        let version = version.to_string();
        let seq = seq.to_string();
        // The chunk body is never truncated by the template bound.
        let limit = self.max_chars.max(text.len() + self.full_content.len() + 64);
        render_template(&self.full_content, limit, |key| match key {
            "version" => Some(version.as_str()),
            "tool" => Some(tool),
            "text" => Some(text),
            "seq" => Some(seq.as_str()),
            _ => None,
        })
    }
}

fn is_allowed_placeholder(name: &str) -> bool {
    matches!(
        name,
        "type" | "TYPE" | "version" | "description" | "component" | "tool" | "text" | "seq"
    )
}

fn extract_placeholders(template: &str) -> Result<Vec<String>> {
    let mut placeholders = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some('{')) {
                    let _ = chars.next();
                    continue;
                }
                let name = read_placeholder(&mut chars)?;
                if name.trim().is_empty() {
                    return Err(VectorStoreError::Template(
                        "Invalid template: empty placeholder '{}'".into(),
                    ));
                }
                placeholders.push(name.trim().to_string());
            }
            '}' => {
                if matches!(chars.peek(), Some('}')) {
                    let _ = chars.next();
                    continue;
                }
                return Err(VectorStoreError::Template(
                    "Invalid template: stray '}'".into(),
                ));
            }
            _ => {}
        }
    }
    Ok(placeholders)
}

fn read_placeholder(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('}') => return Ok(name),
            Some('{') => {
                return Err(VectorStoreError::Template(
                    "Invalid template: nested '{' inside placeholder".into(),
                ));
            }
            Some(c) => name.push(c),
            None => {
                return Err(VectorStoreError::Template(
                    "Invalid template: unterminated '{...}' placeholder".into(),
                ));
            }
        }
    }
}

fn render_template<'a>(
    template: &str,
    max_chars: usize,
    mut resolve: impl FnMut(&str) -> Option<&'a str>,
) -> Result<String> {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if out.len() >= max_chars {
            break;
        }
        match ch {
            '{' if matches!(chars.peek(), Some('{')) => {
                let _ = chars.next();
                push_str_bounded(&mut out, "{", max_chars);
            }
            '{' => {
                let name = read_placeholder(&mut chars)?;
                let name = name.trim();
                if !is_allowed_placeholder(name) {
                    return Err(VectorStoreError::Template(format!(
                        "Unsupported template placeholder '{{{name}}}'. Allowed: {ALLOWED_PLACEHOLDERS}"
                    )));
                }
                push_str_bounded(&mut out, resolve(name).unwrap_or(""), max_chars);
            }
            '}' if matches!(chars.peek(), Some('}')) => {
                let _ = chars.next();
                push_str_bounded(&mut out, "}", max_chars);
            }
            '}' => {
                return Err(VectorStoreError::Template(
                    "Invalid template: stray '}'".into(),
                ));
            }
            other => {
                let mut buf = [0u8; 4];
                push_str_bounded(&mut out, other.encode_utf8(&mut buf), max_chars);
            }
        }
    }
    Ok(out)
}

fn push_str_bounded(out: &mut String, value: &str, max_chars: usize) {
    let remaining = max_chars.saturating_sub(out.len());
    if value.len() <= remaining {
        out.push_str(value);
        return;
    }
    let mut end = remaining;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    out.push_str(&value[..end]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use upgrade_extractor::extract;

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    #[test]
    fn default_atomic_rendering() {
        let change = &extract(
            &v("1.21.0"),
            "CronJob batch/v1beta1 API is deprecated, use batch/v1",
        )[0];
        let text = DocumentTemplates::default()
            .render_atomic("kubernetes", change)
            .unwrap();
        assert_eq!(
            text,
            "[DEPRECATION] 1.21.0: CronJob batch/v1beta1 API is deprecated, use batch/v1"
        );
    }

    #[test]
    fn custom_template_with_escapes() {
        let templates = DocumentTemplates {
            atomic_change: "{{{tool}}} {type}/{component}: {description}".into(),
            ..DocumentTemplates::default()
        };
        templates.validate().unwrap();
        let change = &extract(&v("3.0.0"), "- Removed `--purge` flag")[0];
        assert_eq!(
            templates.render_atomic("helm", change).unwrap(),
            "{helm} removal/--purge: - Removed `--purge` flag"
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_placeholders() {
        for bad in ["{path}", "{type", "type}", "{}", "{a{b}}"] {
            let templates = DocumentTemplates {
                atomic_change: bad.into(),
                ..DocumentTemplates::default()
            };
            assert!(templates.validate().is_err(), "{bad} should be rejected");
        }
        let tiny = DocumentTemplates {
            max_chars: 10,
            ..DocumentTemplates::default()
        };
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn atomic_rendering_is_bounded_on_char_boundaries() {
        let templates = DocumentTemplates {
            max_chars: 256,
            ..DocumentTemplates::default()
        };
        let line = format!("- Added {}", "é".repeat(400));
        let change = &extract(&v("1.0.0"), &line)[0];
        let text = templates.render_atomic("tool", change).unwrap();
        assert!(text.len() <= 256);
        assert!(text.starts_with("[FEATURE] 1.0.0: - Added"));
    }

    #[test]
    fn full_content_keeps_entire_chunk() {
        let templates = DocumentTemplates {
            max_chars: 256,
            ..DocumentTemplates::default()
        };
        let body = "x".repeat(1000);
        let text = templates
            .render_full("helm", &v("3.1.0"), 0, &body)
            .unwrap();
        assert_eq!(text, format!("helm 3.1.0\n{body}"));
    }
}

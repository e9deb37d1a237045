use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Release identifier `major.minor.patch[-prerelease]`.
///
/// Ordering follows semantic-version precedence, so a pre-release sorts before
/// the release sharing its numeric triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl VersionId {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    #[must_use]
    pub fn with_pre(mut self, pre: impl Into<String>) -> Self {
        self.pre = Some(pre.into());
        self
    }

    /// Parse an identifier, accepting a leading `v` and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(ExtractError::parse(input, "empty identifier"));
        }
        if body.contains('+') {
            return Err(ExtractError::parse(input, "build metadata is not supported"));
        }

        let (core, pre) = match body.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (body, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(ExtractError::parse(input, "expected major.minor.patch"));
        }
        let major = parse_numeric(input, parts[0])?;
        let minor = parse_numeric(input, parts[1])?;
        let patch = parse_numeric(input, parts[2])?;

        let pre = match pre {
            Some(pre) => {
                validate_prerelease(input, pre)?;
                Some(pre.to_string())
            }
            None => None,
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// `major.minor` release line this version belongs to.
    #[must_use]
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    #[must_use]
    pub const fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

fn parse_numeric(input: &str, part: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExtractError::parse(
            input,
            format!("'{part}' is not a numeric component"),
        ));
    }
    part.parse::<u64>()
        .map_err(|e| ExtractError::parse(input, e.to_string()))
}

fn validate_prerelease(input: &str, pre: &str) -> Result<()> {
    for ident in pre.split('.') {
        if ident.is_empty() {
            return Err(ExtractError::parse(input, "empty pre-release identifier"));
        }
        if !ident.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(ExtractError::parse(
                input,
                format!("invalid pre-release identifier '{ident}'"),
            ));
        }
    }
    Ok(())
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionId {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = ExtractError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_prefixed() {
        assert_eq!(VersionId::parse("1.24.0").unwrap(), VersionId::new(1, 24, 0));
        assert_eq!(VersionId::parse(" v1.24.0 ").unwrap(), VersionId::new(1, 24, 0));
        assert_eq!(
            VersionId::parse("1.25.0-rc.1").unwrap(),
            VersionId::new(1, 25, 0).with_pre("rc.1")
        );
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in ["", "1.2", "1.2.3.4", "1.x.0", "1.2.3-", "1.2.3-rc..1", "1.2.3+build", "v"] {
            let err = VersionId::parse(bad).unwrap_err();
            assert!(
                matches!(err, ExtractError::Parse { ref input, .. } if input == bad),
                "expected parse error naming '{bad}', got {err:?}"
            );
        }
    }

    #[test]
    fn prerelease_sorts_before_release() {
        let rc = VersionId::parse("1.25.0-rc.1").unwrap();
        let rc2 = VersionId::parse("1.25.0-rc.2").unwrap();
        let alpha = VersionId::parse("1.25.0-alpha").unwrap();
        let ga = VersionId::parse("1.25.0").unwrap();
        let prev = VersionId::parse("1.24.9").unwrap();

        assert!(prev < alpha);
        assert!(alpha < rc);
        assert!(rc < rc2);
        assert!(rc2 < ga);
    }

    #[test]
    fn numeric_prerelease_identifiers_compare_numerically() {
        let a = VersionId::parse("1.0.0-beta.2").unwrap();
        let b = VersionId::parse("1.0.0-beta.11").unwrap();
        let c = VersionId::parse("1.0.0-beta.11.1").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_round_trips_through_serde() {
        let v = VersionId::parse("v1.21.3-beta.0").unwrap();
        assert_eq!(v.to_string(), "1.21.3-beta.0");
        assert_eq!(v.major_minor(), "1.21");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.21.3-beta.0\"");
    }
}

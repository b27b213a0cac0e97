//! Semantic-version parsing and ordering for package versions.
//!
//! Precedence compares the numeric (major, minor, patch) triple only.
//! Pre-release suffixes are validated but do not participate in ordering:
//! `1.0.0-alpha` and `1.0.0-beta` compare equal, and sorted version lists
//! keep their insertion order for such pairs.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release suffix, e.g. "alpha.1". Not considered for precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,
}

impl Version {
    /// Parses a version string of the form `MAJOR.MINOR.PATCH[-prerelease]`.
    ///
    /// The pre-release suffix may contain ASCII alphanumerics and dots.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_string());

        let (base, pre) = match s.split_once('-') {
            Some((base, pre)) => (base, Some(pre)),
            None => (s, None),
        };

        let mut parts = base.split('.');
        let major = parse_component(parts.next()).ok_or_else(invalid)?;
        let minor = parse_component(parts.next()).ok_or_else(invalid)?;
        let patch = parse_component(parts.next()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let pre = match pre {
            Some(p) => {
                if p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
                    return Err(invalid());
                }
                Some(p.to_string())
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

    /// Ordering by the numeric triple; pre-release suffixes are ignored.
    #[must_use]
    pub fn precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

/// Lenient numeric triple of a stored version string.
///
/// Missing or malformed components default to 0 so sorting never panics on
/// data already in the store.
#[must_use]
pub fn numeric_parts(s: &str) -> (i64, i64, i64) {
    let base = s.split_once('-').map_or(s, |(base, _)| base);
    let mut parts = base.split('.').map(|p| p.parse::<i64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// Lenient comparison of two stored version strings by numeric precedence.
#[must_use]
pub fn compare_strings(a: &str, b: &str) -> Ordering {
    numeric_parts(a).cmp(&numeric_parts(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert_eq!(v.pre, None);
    }

    #[test]
    fn test_parse_prerelease() {
        let v = Version::parse("1.0.0-alpha.1").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 0, 0));
        assert_eq!(v.pre.as_deref(), Some("alpha.1"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", "1", "1.2", "1.2.3.4", "a.b.c", "1.2.x", "1..3", "1.2.3-", "1.2.3-bad!"] {
            assert!(Version::parse(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["0.1.0", "1.2.3", "2.0.0-rc.1"] {
            assert_eq!(Version::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_numeric_ordering() {
        let a = Version::parse("1.2.0").unwrap();
        let b = Version::parse("1.10.0").unwrap();
        assert_eq!(a.precedence(&b), Ordering::Less);
        assert_eq!(b.precedence(&a), Ordering::Greater);
    }

    #[test]
    fn test_prerelease_ignored_for_precedence() {
        let a = Version::parse("1.0.0-alpha").unwrap();
        let b = Version::parse("1.0.0-beta").unwrap();
        assert_eq!(a.precedence(&b), Ordering::Equal);
    }

    #[test]
    fn test_compare_strings_defaults_missing_parts() {
        assert_eq!(compare_strings("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_strings("garbage", "0.0.0"), Ordering::Equal);
        assert_eq!(compare_strings("1.2.0", "1.10.0"), Ordering::Less);
    }

    #[test]
    fn test_numeric_parts_strips_prerelease() {
        assert_eq!(numeric_parts("2.1.3-beta.2"), (2, 1, 3));
    }
}

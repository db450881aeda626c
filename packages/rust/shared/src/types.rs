//! Core domain types for the documentation configuration bundle.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocConfError, Result};

/// Substitution slot expected exactly once in every link template.
pub const LINK_PLACEHOLDER: &str = "%s";

/// Delimiter wrapped around build-time placeholder tokens (`@NAME@`).
pub const PLACEHOLDER_DELIMITER: char = '@';

/// Matches a whole-string placeholder token such as `@LIBRARY_parallel_VERSION@`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_]+)@$").expect("placeholder regex"));

// ---------------------------------------------------------------------------
// LinkTemplate
// ---------------------------------------------------------------------------

/// A named external-link pattern (`extlinks` entry).
///
/// The name is the key of the owning table and is not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTemplate {
    /// URL with a single `%s` slot for the ticket or page identifier.
    #[serde(rename = "url")]
    pub url_pattern: String,
    /// Label text shown before the identifier when no label is given.
    #[serde(rename = "prefix", default)]
    pub default_label_prefix: String,
}

impl LinkTemplate {
    pub fn new(url_pattern: impl Into<String>, default_label_prefix: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            default_label_prefix: default_label_prefix.into(),
        }
    }

    /// Number of `%s` slots in the pattern. Well-formed templates have one.
    pub fn placeholder_count(&self) -> usize {
        self.url_pattern.matches(LINK_PLACEHOLDER).count()
    }

    pub fn is_well_formed(&self) -> bool {
        self.placeholder_count() == 1
    }
}

// ---------------------------------------------------------------------------
// PlaceholderToken / VersionValue
// ---------------------------------------------------------------------------

/// An unresolved `@NAME@` token left for the build-configuration step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    /// Recognize `raw` as a placeholder token, if it is one.
    pub fn parse(raw: &str) -> Option<Self> {
        PLACEHOLDER_RE
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    /// The token name without delimiters (`LIBRARY_parallel_VERSION`).
    pub fn name(&self) -> &str {
        self.0.trim_matches(PLACEHOLDER_DELIMITER)
    }

    /// The token exactly as written, delimiters included.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A library version: either a concrete string or a pending placeholder.
///
/// Serialized as the plain string in both cases, so a bundle source file
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionValue {
    Literal(String),
    Placeholder(PlaceholderToken),
}

impl VersionValue {
    /// The stored string, verbatim.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Placeholder(token) => token.as_str(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn placeholder(&self) -> Option<&PlaceholderToken> {
        match self {
            Self::Placeholder(token) => Some(token),
            Self::Literal(_) => None,
        }
    }
}

impl From<String> for VersionValue {
    fn from(raw: String) -> Self {
        match PlaceholderToken::parse(&raw) {
            Some(token) => Self::Placeholder(token),
            None => Self::Literal(raw),
        }
    }
}

impl From<&str> for VersionValue {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<VersionValue> for String {
    fn from(value: VersionValue) -> Self {
        match value {
            VersionValue::Literal(s) => s,
            VersionValue::Placeholder(token) => token.0,
        }
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ToolVersion / ToolVersionRange
// ---------------------------------------------------------------------------

/// A dotted numeric toolchain version (`14`, `13.0.1`).
///
/// Ordering is numeric, component by component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolVersion {
    components: Vec<u64>,
}

impl ToolVersion {
    /// Parse `N(.N)*`, tolerating surrounding whitespace and a leading `v`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(DocConfError::validation(format!(
                "invalid tool version {raw:?}: empty"
            )));
        }

        let components = digits
            .split('.')
            .map(|part| {
                let not_a_number = || {
                    DocConfError::validation(format!(
                        "invalid tool version {raw:?}: component {part:?} is not a number"
                    ))
                };
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(not_a_number());
                }
                part.parse::<u64>().map_err(|_| not_a_number())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { components })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    pub fn major(&self) -> u64 {
        self.components[0]
    }

    /// Keep the first `len` components, padding with zeros if shorter.
    pub fn truncated(&self, len: usize) -> Self {
        let mut components: Vec<u64> = self.components.iter().copied().take(len).collect();
        components.resize(len.max(1), 0);
        Self { components }
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for ToolVersion {
    type Err = DocConfError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ToolVersion {
    type Error = DocConfError;

    fn try_from(raw: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ToolVersion> for String {
    fn from(version: ToolVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

/// Inclusive range of accepted versions for an external toolchain (LLVM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersionRange {
    pub min: ToolVersion,
    pub max: ToolVersion,
}

impl ToolVersionRange {
    /// Build a range, rejecting `min > max`.
    pub fn new(min: ToolVersion, max: ToolVersion) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Bounds are compared at the shorter bound's precision, matching how
    /// detected versions are checked against them: `14.1..=14` is valid.
    pub fn validate(&self) -> Result<()> {
        let len = self
            .min
            .components()
            .len()
            .min(self.max.components().len());
        if self.min.truncated(len) > self.max.truncated(len) {
            return Err(DocConfError::validation(format!(
                "toolchain range is reversed: min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_template_placeholder_count() {
        let t = LinkTemplate::new("https://gitlab.haskell.org/ghc/ghc/issues/%s", "#");
        assert!(t.is_well_formed());

        let t = LinkTemplate::new("https://example.com/%s/%s", "");
        assert_eq!(t.placeholder_count(), 2);
        assert!(!t.is_well_formed());
    }

    #[test]
    fn version_value_distinguishes_placeholders() {
        let v = VersionValue::from("@LIBRARY_parallel_VERSION@");
        let token = v.placeholder().expect("placeholder");
        assert_eq!(token.name(), "LIBRARY_parallel_VERSION");
        assert_eq!(v.as_str(), "@LIBRARY_parallel_VERSION@");

        let v = VersionValue::from("4.17.0.0");
        assert_eq!(v, VersionValue::Literal("4.17.0.0".into()));
        assert!(!v.is_placeholder());
    }

    #[test]
    fn half_delimited_strings_are_literal() {
        assert!(!VersionValue::from("@LIBRARY_parallel_VERSION").is_placeholder());
        assert!(!VersionValue::from("@@").is_placeholder());
        assert!(!VersionValue::from("@not a token@").is_placeholder());
    }

    #[test]
    fn version_value_serializes_as_plain_string() {
        let v = VersionValue::from("@LIBRARY_parallel_VERSION@");
        let json = serde_json::to_string(&v).expect("serialize");
        assert_eq!(json, "\"@LIBRARY_parallel_VERSION@\"");
    }

    #[test]
    fn tool_version_parsing() {
        let v = ToolVersion::parse(" v13.0.1\n").expect("parse");
        assert_eq!(v.components(), &[13, 0, 1]);
        assert_eq!(v.major(), 13);
        assert_eq!(v.to_string(), "13.0.1");

        assert!(ToolVersion::parse("").is_err());
        assert!(ToolVersion::parse("14.x").is_err());
        assert!(ToolVersion::parse("14.").is_err());
    }

    #[test]
    fn tool_version_ordering_is_numeric() {
        let a = ToolVersion::parse("9").unwrap();
        let b = ToolVersion::parse("10").unwrap();
        assert!(a < b);
        assert!(ToolVersion::parse("14.0.6").unwrap().truncated(1) == ToolVersion::parse("14").unwrap());
        assert_eq!(ToolVersion::parse("14").unwrap().truncated(3).to_string(), "14.0.0");
    }

    #[test]
    fn signed_components_are_rejected() {
        assert!(ToolVersion::parse("+10").is_err());
        assert!(ToolVersion::parse("+10.+2").is_err());
        assert!(ToolVersion::parse("10.-1").is_err());
        assert!(ToolVersion::parse("10. 2").is_err());
    }

    #[test]
    fn range_bounds_compare_at_shorter_precision() {
        let min = ToolVersion::parse("14.1").unwrap();
        let max = ToolVersion::parse("14").unwrap();
        ToolVersionRange::new(min, max).expect("14.1 to 14.x is a valid range");

        let min = ToolVersion::parse("14.1").unwrap();
        let max = ToolVersion::parse("14.0").unwrap();
        assert!(ToolVersionRange::new(min, max).is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let min = ToolVersion::parse("14").unwrap();
        let max = ToolVersion::parse("10").unwrap();
        let err = ToolVersionRange::new(min, max).unwrap_err();
        assert!(matches!(err, DocConfError::Validation { .. }));
    }
}

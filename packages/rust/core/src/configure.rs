//! Placeholder tracking and the configuration step.
//!
//! Library versions that are only known when the build is configured are
//! authored as `@NAME@` tokens. [`configure`] fills them from a set of
//! `NAME=VALUE` assignments; [`ConfigBundle::ensure_resolved`] asserts that
//! nothing is left before the documentation tool reads the bundle.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use docconf_shared::{DocConfError, PLACEHOLDER_DELIMITER, PlaceholderToken, Result, VersionValue};

use crate::bundle::ConfigBundle;

/// Result of running [`configure`] over a bundle.
#[derive(Debug, Clone)]
pub struct ConfigureOutcome {
    /// The configured bundle. The input bundle is left untouched.
    pub bundle: ConfigBundle,
    /// Libraries whose placeholder was replaced.
    pub substituted: Vec<String>,
    /// Libraries still holding a placeholder.
    pub unresolved: Vec<String>,
}

impl ConfigBundle {
    /// Libraries whose version is still a placeholder, in sorted order.
    pub fn unresolved_placeholders(&self) -> Vec<(&str, &PlaceholderToken)> {
        self.lib_versions
            .iter()
            .filter_map(|(lib, value)| value.placeholder().map(|token| (lib.as_str(), token)))
            .collect()
    }

    /// Fail on the first library that still holds a placeholder.
    pub fn ensure_resolved(&self) -> Result<()> {
        match self.unresolved_placeholders().first() {
            Some((library, token)) => Err(DocConfError::UnresolvedPlaceholder {
                library: (*library).to_string(),
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Replace placeholders whose token name appears in `substitutions`.
///
/// Keys may be written with or without the `@` delimiters.
#[instrument(skip_all, fields(assignments = substitutions.len()))]
pub fn configure(
    bundle: &ConfigBundle,
    substitutions: &BTreeMap<String, String>,
) -> Result<ConfigureOutcome> {
    let mut values: BTreeMap<&str, &str> = BTreeMap::new();
    for (key, value) in substitutions {
        if PlaceholderToken::parse(value).is_some() {
            return Err(DocConfError::validation(format!(
                "substitution for {key} is itself a placeholder: {value}"
            )));
        }
        let name = key.trim_matches(PLACEHOLDER_DELIMITER);
        if let Some(previous) = values.insert(name, value.as_str()) {
            if previous != value.as_str() {
                return Err(conflicting(name, previous, value));
            }
        }
    }

    let mut configured = bundle.clone();
    let mut substituted = Vec::new();
    let mut unresolved = Vec::new();

    for (library, version) in configured.lib_versions.iter_mut() {
        let Some(token) = version.placeholder() else {
            continue;
        };

        match values.get(token.name()) {
            Some(value) => {
                debug!(%library, token = %token, %value, "substituted placeholder");
                *version = VersionValue::Literal((*value).to_string());
                substituted.push(library.clone());
            }
            None => {
                warn!(%library, token = %token, "no value given for placeholder");
                unresolved.push(library.clone());
            }
        }
    }

    info!(
        substituted = substituted.len(),
        unresolved = unresolved.len(),
        "configuration step finished"
    );

    Ok(ConfigureOutcome {
        bundle: configured,
        substituted,
        unresolved,
    })
}

/// Split a `NAME=VALUE` assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        DocConfError::validation(format!("expected NAME=VALUE, got {raw:?}"))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(DocConfError::validation(format!(
            "empty name in assignment {raw:?}"
        )));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse `NAME=VALUE` assignments into a map.
///
/// Repeating a name with the same value is allowed; with a different value
/// (including `NAME` vs `@NAME@`) it is a `Validation` error.
pub fn parse_assignments<S: AsRef<str>>(raw: &[S]) -> Result<BTreeMap<String, String>> {
    let mut assignments: BTreeMap<String, String> = BTreeMap::new();
    for entry in raw {
        let (name, value) = parse_assignment(entry.as_ref())?;
        let key = name.trim_matches(PLACEHOLDER_DELIMITER).to_string();
        match assignments.get(&key) {
            Some(previous) if *previous != value => {
                return Err(conflicting(&key, previous, &value));
            }
            Some(_) => {}
            None => {
                assignments.insert(key, value);
            }
        }
    }
    Ok(assignments)
}

fn conflicting(name: &str, previous: &str, value: &str) -> DocConfError {
    DocConfError::validation(format!(
        "conflicting values for {name}: {previous:?} and {value:?}"
    ))
}

//! The configuration data bundle.
//!
//! A bundle is read once from a human-edited TOML source and is immutable
//! afterwards. Every accessor borrows; nothing here writes or caches.
//!
//! Source layout:
//!
//! ```toml
//! version = "9.4.4"
//! libs_base_uri = "../libraries"
//!
//! [extlinks.ghc-ticket]
//! url = "https://gitlab.haskell.org/ghc/ghc/issues/%s"
//! prefix = "#"
//!
//! [lib_versions]
//! base = "4.17.0.0"
//! parallel = "@LIBRARY_parallel_VERSION@"
//!
//! [llvm]
//! min = "10"
//! max = "14"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use docconf_shared::{
    DocConfError, LINK_PLACEHOLDER, LinkTemplate, Result, ToolVersion, ToolVersionRange,
    VersionValue,
};

/// Identifier substituted into each template when checking it yields a URL.
const SAMPLE_LINK_ID: &str = "1";

/// A link resolved from a template and an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub url: String,
    pub label: String,
}

/// Link templates, library versions, product version and toolchain range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBundle {
    /// Product release stamped on generated pages.
    pub(crate) version: String,
    /// Root for sibling library documentation.
    pub(crate) libs_base_uri: String,
    #[serde(default)]
    pub(crate) extlinks: BTreeMap<String, LinkTemplate>,
    #[serde(default)]
    pub(crate) lib_versions: BTreeMap<String, VersionValue>,
    /// Accepted LLVM versions, inclusive.
    pub(crate) llvm: ToolVersionRange,
}

impl ConfigBundle {
    /// Assemble a bundle from its parts and validate it.
    pub fn new(
        version: impl Into<String>,
        libs_base_uri: impl Into<String>,
        extlinks: BTreeMap<String, LinkTemplate>,
        lib_versions: BTreeMap<String, VersionValue>,
        llvm: ToolVersionRange,
    ) -> Result<Self> {
        let bundle = Self {
            version: version.into(),
            libs_base_uri: libs_base_uri.into(),
            extlinks,
            lib_versions,
            llvm,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Parse and validate a bundle from TOML source text.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let bundle: Self = toml::from_str(source).map_err(|e| DocConfError::parse(e.to_string()))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Read, parse and validate a bundle source file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocConfError::io(path, e))?;
        let bundle = Self::from_toml_str(&content).map_err(|e| match e {
            DocConfError::Parse { message } => {
                DocConfError::parse(format!("failed to parse {}: {message}", path.display()))
            }
            other => other,
        })?;

        debug!(
            templates = bundle.extlinks.len(),
            libraries = bundle.lib_versions.len(),
            placeholders = bundle.lib_versions.values().filter(|v| v.is_placeholder()).count(),
            "bundle loaded"
        );
        Ok(bundle)
    }

    /// Serialize back to TOML. Loading the output yields an equal bundle.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DocConfError::parse(e.to_string()))
    }

    /// Check the authoring invariants that the types alone do not enforce.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(DocConfError::validation("product version must not be empty"));
        }

        for (name, template) in &self.extlinks {
            if !template.is_well_formed() {
                return Err(malformed(name, template));
            }
        }

        self.llvm.validate()
    }

    /// Check that every template yields an absolute, parseable URL.
    pub fn validate_link_urls(&self) -> Result<()> {
        for name in self.extlinks.keys() {
            let link = self.resolve_link(name, SAMPLE_LINK_ID, None)?;
            Url::parse(&link.url).map_err(|e| {
                DocConfError::validation(format!(
                    "link template '{name}' does not produce a valid URL ({}): {e}",
                    link.url
                ))
            })?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Link templates
    // -----------------------------------------------------------------------

    pub fn get_link_template(&self, name: &str) -> Result<&LinkTemplate> {
        self.extlinks
            .get(name)
            .ok_or_else(|| DocConfError::unknown_template(name))
    }

    /// Substitute `id` into the named template.
    ///
    /// The label is `label_override` when given, otherwise the template's
    /// default prefix followed by `id`.
    pub fn resolve_link(
        &self,
        name: &str,
        id: &str,
        label_override: Option<&str>,
    ) -> Result<ResolvedLink> {
        let template = self.get_link_template(name)?;
        if !template.is_well_formed() {
            return Err(malformed(name, template));
        }

        let url = template.url_pattern.replacen(LINK_PLACEHOLDER, id, 1);
        let label = match label_override {
            Some(label) => label.to_string(),
            None => format!("{}{id}", template.default_label_prefix),
        };

        Ok(ResolvedLink { url, label })
    }

    /// Template names in sorted order.
    pub fn link_names(&self) -> impl Iterator<Item = &str> {
        self.extlinks.keys().map(String::as_str)
    }

    pub fn link_templates(&self) -> &BTreeMap<String, LinkTemplate> {
        &self.extlinks
    }

    // -----------------------------------------------------------------------
    // Versions
    // -----------------------------------------------------------------------

    /// The stored version value, placeholder or not.
    pub fn get_version(&self, library_id: &str) -> Result<&VersionValue> {
        self.lib_versions
            .get(library_id)
            .ok_or_else(|| DocConfError::unknown_library(library_id))
    }

    /// Library ids in sorted order.
    pub fn library_ids(&self) -> impl Iterator<Item = &str> {
        self.lib_versions.keys().map(String::as_str)
    }

    pub fn lib_versions(&self) -> &BTreeMap<String, VersionValue> {
        &self.lib_versions
    }

    pub fn product_version(&self) -> &str {
        &self.version
    }

    pub fn libs_base_uri(&self) -> &str {
        &self.libs_base_uri
    }

    pub fn get_tool_version_range(&self) -> (&ToolVersion, &ToolVersion) {
        (&self.llvm.min, &self.llvm.max)
    }

    pub fn tool_version_range(&self) -> &ToolVersionRange {
        &self.llvm
    }
}

fn malformed(name: &str, template: &LinkTemplate) -> DocConfError {
    DocConfError::MalformedTemplate {
        name: name.to_string(),
        pattern: template.url_pattern.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture_source() -> String {
        std::fs::read_to_string("../../../fixtures/toml/ghc_config.toml").expect("read fixture")
    }

    pub(crate) fn fixture() -> ConfigBundle {
        ConfigBundle::from_toml_str(&fixture_source()).expect("parse fixture bundle")
    }

    #[test]
    fn fixture_matches_reference_data() {
        let bundle = fixture();
        assert_eq!(bundle.product_version(), "9.4.4");
        assert_eq!(bundle.libs_base_uri(), "../libraries");
        assert_eq!(
            bundle.link_names().collect::<Vec<_>>(),
            vec!["ghc-ticket", "ghc-wiki"]
        );
        assert_eq!(
            bundle.library_ids().collect::<Vec<_>>(),
            vec![
                "Cabal",
                "array",
                "base",
                "ghc",
                "ghc-compact",
                "ghc-prim",
                "parallel",
                "template-haskell",
            ]
        );
    }

    #[test]
    fn resolve_ghc_ticket() {
        let bundle = fixture();
        let link = bundle.resolve_link("ghc-ticket", "12345", None).expect("resolve");
        assert_eq!(link.url, "https://gitlab.haskell.org/ghc/ghc/issues/12345");
        assert_eq!(link.label, "#12345");
    }

    #[test]
    fn resolve_with_label_override() {
        let bundle = fixture();
        let link = bundle
            .resolve_link("ghc-wiki", "commentary/compiler", Some("compiler commentary"))
            .expect("resolve");
        assert_eq!(
            link.url,
            "https://gitlab.haskell.org/ghc/ghc/wikis/commentary/compiler"
        );
        assert_eq!(link.label, "compiler commentary");
    }

    #[test]
    fn resolved_url_only_replaces_the_slot() {
        let bundle = fixture();
        for name in bundle.link_names() {
            let template = bundle.get_link_template(name).unwrap();
            let link = bundle.resolve_link(name, "x%sy", None).unwrap();
            let (head, tail) = template.url_pattern.split_once("%s").unwrap();
            assert_eq!(link.url, format!("{head}x%sy{tail}"));
        }
    }

    #[test]
    fn unknown_template_fails() {
        let bundle = fixture();
        assert!(matches!(
            bundle.get_link_template("ghc-bug"),
            Err(DocConfError::UnknownTemplate { name }) if name == "ghc-bug"
        ));
        assert!(matches!(
            bundle.resolve_link("ghc-bug", "1", None),
            Err(DocConfError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn versions_are_returned_verbatim() {
        let bundle = fixture();
        assert_eq!(bundle.get_version("base").unwrap().as_str(), "4.17.0.0");
        assert_eq!(
            bundle.get_version("parallel").unwrap().as_str(),
            "@LIBRARY_parallel_VERSION@"
        );
        assert_eq!(bundle.get_version("base").unwrap(), bundle.get_version("base").unwrap());
        assert!(matches!(
            bundle.get_version("unknown-lib"),
            Err(DocConfError::UnknownLibrary { library }) if library == "unknown-lib"
        ));
    }

    #[test]
    fn tool_version_range() {
        let bundle = fixture();
        let (min, max) = bundle.get_tool_version_range();
        assert_eq!(min.to_string(), "10");
        assert_eq!(max.to_string(), "14");
        assert!(min <= max);
    }

    #[test]
    fn reloading_yields_equal_bundles() {
        let source = fixture_source();
        let a = ConfigBundle::from_toml_str(&source).unwrap();
        let b = ConfigBundle::from_toml_str(&source).unwrap();
        assert_eq!(a, b);

        let written = a.to_toml_string().expect("serialize");
        let c = ConfigBundle::from_toml_str(&written).expect("reparse");
        assert_eq!(a, c);
    }

    #[test]
    fn load_from_disk() {
        let path = std::env::temp_dir().join(format!("docconf-bundle-{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, fixture_source()).unwrap();
        let bundle = ConfigBundle::load(&path).expect("load");
        assert_eq!(bundle, fixture());
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            ConfigBundle::load(&path),
            Err(DocConfError::Io { .. })
        ));
    }

    #[test]
    fn template_without_slot_is_rejected_at_load() {
        let source = r##"
version = "1.0"
libs_base_uri = "../libraries"

[extlinks.broken]
url = "https://example.com/issues"
prefix = "#"

[llvm]
min = "10"
max = "14"
"##;
        assert!(matches!(
            ConfigBundle::from_toml_str(source),
            Err(DocConfError::MalformedTemplate { name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn reversed_llvm_range_is_rejected_at_load() {
        let source = r#"
version = "1.0"
libs_base_uri = "../libraries"

[llvm]
min = "14"
max = "10"
"#;
        assert!(matches!(
            ConfigBundle::from_toml_str(source),
            Err(DocConfError::Validation { .. })
        ));
    }

    #[test]
    fn bad_tool_version_is_a_parse_error() {
        let source = r#"
version = "1.0"
libs_base_uri = "../libraries"

[llvm]
min = "ten"
max = "14"
"#;
        assert!(matches!(
            ConfigBundle::from_toml_str(source),
            Err(DocConfError::Parse { .. })
        ));
    }

    #[test]
    fn malformed_template_is_caught_on_resolve() {
        let mut bundle = fixture();
        bundle.extlinks.insert(
            "twice".into(),
            LinkTemplate::new("https://example.com/%s/%s", ""),
        );
        assert!(matches!(
            bundle.resolve_link("twice", "1", None),
            Err(DocConfError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn link_urls_must_be_absolute() {
        let bundle = fixture();
        bundle.validate_link_urls().expect("fixture urls are valid");

        let mut bundle = fixture();
        bundle
            .extlinks
            .insert("relative".into(), LinkTemplate::new("issues/%s", "#"));
        assert!(matches!(
            bundle.validate_link_urls(),
            Err(DocConfError::Validation { .. })
        ));
    }
}

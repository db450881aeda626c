//! Links into sibling library documentation under `libs_base_uri`.

use docconf_shared::{DocConfError, Result, VersionValue};

use crate::bundle::ConfigBundle;

impl ConfigBundle {
    /// `{libs_base_uri}/{library}-{version}/{page}`.
    ///
    /// An empty `page` yields the library's documentation directory. Fails
    /// if the library's version has not been configured yet.
    pub fn library_doc_uri(&self, library_id: &str, page: &str) -> Result<String> {
        let version = match self.get_version(library_id)? {
            VersionValue::Literal(v) => v,
            VersionValue::Placeholder(token) => {
                return Err(DocConfError::UnresolvedPlaceholder {
                    library: library_id.to_string(),
                    token: token.to_string(),
                });
            }
        };

        let page = page.trim_start_matches('/');
        let base = self.libs_base_uri.trim_end_matches('/');
        match (base.is_empty(), self.libs_base_uri.is_empty()) {
            // Empty base: relative to the current page.
            (true, true) => Ok(format!("{library_id}-{version}/{page}")),
            // Base was only slashes: the documentation root.
            (true, false) => Ok(format!("/{library_id}-{version}/{page}")),
            (false, _) => Ok(format!("{base}/{library_id}-{version}/{page}")),
        }
    }
}

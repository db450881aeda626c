//! Expand link roles and version substitutions in documentation text.
//!
//! Two conventions are recognized:
//! - `` :ghc-ticket:`12345` `` and `` :ghc-wiki:`the wiki <commentary>` ``
//!   become Markdown links through [`ConfigBundle::resolve_link`].
//! - `|version|` becomes the product version and `|base-version|` the
//!   stored version of library `base`, verbatim.
//!
//! Any other `|word|` is left alone so Markdown tables survive.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, instrument};

use docconf_shared::Result;

use crate::bundle::ConfigBundle;

/// `:name:`content``
static ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_-]+):`([^`]+)`").expect("role regex"));

/// `label <target>` inside a role.
static EXPLICIT_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s*<([^<>]+)>$").expect("explicit title regex"));

/// `|name|`
static SUBSTITUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([A-Za-z0-9_.-]+)\|").expect("substitution regex"));

const PRODUCT_VERSION_KEY: &str = "version";
const LIBRARY_VERSION_SUFFIX: &str = "-version";

/// Expand every role and version substitution in `text`.
///
/// Fails on the first role naming an unknown template or substitution
/// naming an unknown library.
#[instrument(skip_all, fields(len = text.len()))]
pub fn render(bundle: &ConfigBundle, text: &str) -> Result<String> {
    let mut links = 0usize;
    let with_links = try_replace_all(&ROLE_RE, text, |caps| {
        let name = &caps[1];
        let (label, id) = split_explicit_title(&caps[2]);
        let link = bundle.resolve_link(name, id, label)?;
        links += 1;
        Ok(Some(format!("[{}]({})", link.label, link.url)))
    })?;

    let mut substitutions = 0usize;
    let rendered = try_replace_all(&SUBSTITUTION_RE, &with_links, |caps| {
        let key = &caps[1];
        if key == PRODUCT_VERSION_KEY {
            substitutions += 1;
            return Ok(Some(bundle.product_version().to_string()));
        }

        match key.strip_suffix(LIBRARY_VERSION_SUFFIX) {
            Some(library) if !library.is_empty() => {
                let version = bundle.get_version(library)?;
                substitutions += 1;
                Ok(Some(version.as_str().to_string()))
            }
            _ => Ok(None),
        }
    })?;

    debug!(links, substitutions, "rendered text");
    Ok(rendered)
}

/// Split `label <id>` into its parts; plain content is the id alone.
fn split_explicit_title(content: &str) -> (Option<&str>, &str) {
    match EXPLICIT_TITLE_RE.captures(content) {
        Some(caps) => {
            let (Some(label), Some(id)) = (caps.get(1), caps.get(2)) else {
                return (None, content);
            };
            if label.as_str().is_empty() {
                (None, id.as_str())
            } else {
                (Some(label.as_str()), id.as_str())
            }
        }
        None => (None, content),
    }
}

/// `Regex::replace_all` with a fallible replacer. `Ok(None)` keeps the match.
///
/// A kept match does not consume its text: the search resumes one character
/// past its start, so `|x|version|` still expands `|version|`.
fn try_replace_all<F>(re: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&Captures<'_>) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut search = 0;

    while search <= text.len() {
        let Some(caps) = re.captures_at(text, search) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        match replace(&caps)? {
            Some(replacement) if whole.start() >= last => {
                out.push_str(&text[last..whole.start()]);
                out.push_str(&replacement);
                last = whole.end();
                search = if whole.is_empty() {
                    next_char_boundary(text, whole.end())
                } else {
                    whole.end()
                };
            }
            _ => search = next_char_boundary(text, whole.start()),
        }
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Byte offset of the character after the one starting at `at`.
fn next_char_boundary(text: &str, at: usize) -> usize {
    at + text[at..].chars().next().map_or(1, char::len_utf8)
}

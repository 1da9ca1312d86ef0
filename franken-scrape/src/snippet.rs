//! Value types passed between discovery, extraction, and output.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

pub(crate) const DOCS_PATH_PREFIX: &str = "/docs/";

/// Identifier of a documented component, e.g. `accordion`.
///
/// The id is the trailing segment of the component's docs path. It doubles
/// as the directory name snippets for the component are written under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Site-relative docs path, `/docs/<id>`.
    pub fn docs_path(&self) -> String {
        format!("{DOCS_PATH_PREFIX}{}", self.0)
    }

    /// Docs page for this component under `base`.
    pub fn docs_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.docs_path())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One extracted example: the component it came from, the `h2` heading it
/// sits under, and the raw markup text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub component: ComponentId,
    pub title: String,
    pub html: String,
}

/// Outcome of extracting one component page.
///
/// A page still marked work-in-progress is a normal outcome rather than an
/// error; callers log it and move on to the next component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Harvest {
    Snippets(Vec<Snippet>),
    WorkInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_path_round_trips_a_stripped_href() {
        let href = "/docs/accordion";
        let id = ComponentId::new(href.strip_prefix("/docs/").unwrap());
        assert_eq!(id.docs_path(), href);
    }

    #[test]
    fn docs_url_joins_under_the_base_origin() {
        let base = Url::parse("https://www.franken-ui.dev").unwrap();
        let url = ComponentId::new("accordion").docs_url(&base).unwrap();
        assert_eq!(url.as_str(), "https://www.franken-ui.dev/docs/accordion");
    }

    #[test]
    fn docs_url_ignores_any_path_on_the_base() {
        let base = Url::parse("https://host.test/some/page").unwrap();
        let url = ComponentId::new("badge").docs_url(&base).unwrap();
        assert_eq!(url.as_str(), "https://host.test/docs/badge");
    }
}

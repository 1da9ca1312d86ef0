use franken_browser::BrowserError;
use thiserror::Error;

use crate::snippet::ComponentId;

/// Failures surfaced while discovering components or extracting snippets.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Fetching the catalog page failed, either in transport or with a
    /// non-success status.
    #[error("couldn't fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A selector, URL, or document could not be parsed.
    #[error("couldn't parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    /// Getting a component page loaded and ready failed.
    #[error("couldn't open docs page for {component}: {source}")]
    Navigation {
        component: ComponentId,
        #[source]
        source: BrowserError,
    },

    /// Driving the loaded page failed.
    #[error("couldn't {operation} for {component}: {source}")]
    Interaction {
        component: ComponentId,
        operation: &'static str,
        #[source]
        source: BrowserError,
    },

    /// The surrounding run or the browser session was cancelled.
    #[error("extraction cancelled")]
    Cancelled,

    /// Discovery came back with zero components.
    #[error("no components found in the documentation navigation")]
    EmptyCatalog,
}

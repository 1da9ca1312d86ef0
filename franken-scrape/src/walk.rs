//! Pure DOM analysis of a captured component page.
//!
//! Everything here runs on HTML already serialised out of the browser, so
//! the layout contract with the docs site is testable without automation:
//! examples live under the `#docs` container, `h2` headings name the
//! section, and flipping an example to its markup view materialises a
//! `code[data-language="html"]` panel inside the section's block.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::snippet::{ComponentId, Snippet};

/// Container the page content lives under; also the readiness marker the
/// extractor waits for after navigation.
pub(crate) const DOCS_ROOT_SELECTOR: &str = "#docs";
/// Code panels that appear once an example is flipped to its markup view.
pub(crate) const MARKUP_PANEL_SELECTOR: &str = "code[data-language=\"html\"]";

const ALERT_TEXT_SELECTOR: &str = ".uk-alert .uk-paragraph";
const SECTION_HEADING: &str = "h2";
const WIP_PHRASE: &str = "this documentation is a work in progress.";

pub(crate) fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse {
        what: css,
        detail: e.to_string(),
    })
}

/// Whether the page announces itself as unfinished.
///
/// The alert text is assembled from every matching element, trimmed, and
/// lower-cased before comparing against the known phrase.
pub fn wip_notice(html: &str) -> Result<bool, ScrapeError> {
    let document = Html::parse_document(html);
    let alert = selector(ALERT_TEXT_SELECTOR)?;
    let text: String = document.select(&alert).flat_map(|el| el.text()).collect();
    Ok(text.trim().to_lowercase() == WIP_PHRASE)
}

/// Walk the captured page for markup panels.
///
/// Only direct children of `#docs` count as blocks. An `h2` child updates
/// the running section title; any other child contributes at most one
/// snippet, taken from the last matching code panel among its descendants.
/// Blocks before the first `h2` get an empty title.
pub fn collect_snippets(html: &str, component: &ComponentId) -> Result<Vec<Snippet>, ScrapeError> {
    let document = Html::parse_document(html);
    let docs_root = selector(DOCS_ROOT_SELECTOR)?;
    let markup_panel = selector(MARKUP_PANEL_SELECTOR)?;

    let mut snippets = Vec::new();
    let mut title = String::new();
    for root in document.select(&docs_root) {
        for child in root.children() {
            let Some(block) = ElementRef::wrap(child) else {
                continue;
            };
            if block.value().name() == SECTION_HEADING {
                title = block.text().collect::<String>().trim().to_string();
                continue;
            }
            let Some(code) = block.select(&markup_panel).last() else {
                continue;
            };
            snippets.push(Snippet {
                component: component.clone(),
                title: title.clone(),
                html: code.text().collect(),
            });
        }
    }
    Ok(snippets)
}

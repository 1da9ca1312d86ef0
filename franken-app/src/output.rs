//! Writing harvested snippets to the output tree.
//!
//! Layout: `<output>/html/<component>/<slug>.html`, one file per snippet,
//! with the slug taken from the snippet's section title. Section titles
//! repeat on real pages, so colliding slugs get a numeric suffix instead of
//! silently overwriting each other.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use franken_scrape::{ComponentId, Snippet};
use tracing::debug;

const HTML_SUBDIR: &str = "html";
const FALLBACK_SLUG: &str = "snippet";

/// Write every snippet for one component under `output_dir`.
pub fn write_snippets(
    output_dir: &Path,
    component: &ComponentId,
    snippets: &[Snippet],
) -> Result<()> {
    let dir = output_dir.join(HTML_SUBDIR).join(component.as_str());
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let mut seen: HashMap<String, u32> = HashMap::new();
    for snippet in snippets {
        let slug = title_slug(&snippet.title);
        let n = seen.entry(slug.clone()).and_modify(|n| *n += 1).or_insert(1);
        let file_name = if *n == 1 {
            format!("{slug}.html")
        } else {
            format!("{slug}-{n}.html")
        };
        let path = dir.join(&file_name);
        fs::write(&path, &snippet.html)
            .with_context(|| format!("failed to write snippet: {}", path.display()))?;
        debug!(%component, file = %path.display(), "snippet written");
    }
    Ok(())
}

/// File-name slug for a snippet title: trimmed, lower-cased, spaces and
/// slashes turned into dashes. Untitled snippets fall back to a fixed name.
fn title_slug(title: &str) -> String {
    let slug = title.trim().to_lowercase().replace([' ', '/'], "-");
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

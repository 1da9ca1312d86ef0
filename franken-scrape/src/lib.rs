//! Harvesting HTML snippets from the franken-ui documentation.
//!
//! The crate splits the work into a cheap HTTP side and a browser side.
//! [`CatalogClient`] discovers which components exist by scanning the docs
//! navigation over plain HTTP; [`Extractor`] then drives a shared browser
//! session through one component page at a time, flipping each example to
//! its markup view and walking the captured DOM for the code panels.

pub mod catalog;
pub mod error;
pub mod extract;
pub mod snippet;
pub mod walk;

pub use catalog::CatalogClient;
pub use error::ScrapeError;
pub use extract::Extractor;
pub use snippet::{ComponentId, Harvest, Snippet};

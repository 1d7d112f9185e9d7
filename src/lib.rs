//! SyncTeX position mapping between TeX sources and rendered PDF pages.
//!
//! Every lookup re-reads the synctex file next to the PDF, so results always
//! reflect the last build. Documents are plain data and lookups share no
//! state, so concurrent lookups need no locking.

pub mod backward;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod forward;
pub mod geometry;
pub mod loader;
pub mod parser;
pub mod paths;
pub mod types;

use std::path::Path;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::types::{DocumentSummary, PagePosition, SourceLocation, SyncTexDocument};

/// Load the synctex data for `pdf` and find where `line` of `file` was typeset.
///
/// # Errors
///
/// Returns loader errors, `Error::FileNotInSyncTex`, or `Error::NoLineRecorded`.
pub fn forward_search(pdf: &Path, file: &Path, line: u32, config: &Config) -> Result<PagePosition, Error> {
    let document = loader::load(pdf)?;
    return forward::locate(&document, &config.resolver(), file, line);
}

/// Load the synctex data for `pdf` and find the source line at `(x, y)` on `page`.
///
/// # Errors
///
/// Returns loader errors, `Error::NoEntriesInSyncTex`, or `Error::NoMatchFound`.
pub fn backward_search(pdf: &Path, page: u32, x: f64, y: f64, config: &Config) -> Result<SourceLocation, Error> {
    let document = loader::load(pdf)?;
    return backward::locate(&document, &config.resolver(), page, x, y);
}

/// Load the synctex data for `pdf` and summarize it.
///
/// # Errors
///
/// Returns loader errors.
pub fn inspect(pdf: &Path) -> Result<DocumentSummary, Error> {
    let document = loader::load(pdf)?;
    return Ok(DocumentSummary::of(&document));
}

//! Locating and reading the synctex data that belongs to a PDF.
//!
//! The uncompressed `<base>.synctex` is read first and `<base>.synctex.gz`
//! only if that fails. When both exist the uncompressed file is authoritative.

use std::ffi::OsString;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::codec;
use crate::error::Error;
use crate::parser;
use crate::types::SyncTexDocument;

/// Outcome of reading one synctex variant.
enum Attempt {
    /// The variant exists but could not be read, decompressed, or parsed.
    Failed(String),
    /// The variant decoded and parsed.
    Loaded(SyncTexDocument),
    /// The variant is not on disk.
    Missing,
}

/// Candidate synctex paths for `pdf`, in lookup order: uncompressed, then gzip.
pub fn synctex_paths(pdf: &Path) -> [PathBuf; 2] {
    let mut plain: OsString = pdf.with_extension("").into_os_string();
    plain.push(".synctex");
    let mut compressed = plain.clone();
    compressed.push(".gz");
    return [PathBuf::from(plain), PathBuf::from(compressed)];
}

/// Load and parse the synctex data for `pdf`.
///
/// The returned document records the directory it was read from so relative
/// input paths can be resolved.
///
/// # Errors
///
/// Returns `Error::SyncTexNotFound` if neither variant exists, or
/// `Error::SyncTexParseFailed` listing the variants that existed but failed.
pub fn load(pdf: &Path) -> Result<SyncTexDocument, Error> {
    let [plain, compressed] = synctex_paths(pdf);
    let mut attempted = Vec::new();
    let mut last_reason = String::new();

    for (path, gzipped) in [(&plain, false), (&compressed, true)] {
        match read_variant(path, gzipped) {
            Attempt::Loaded(mut document) => {
                tracing::debug!(path = %path.display(), "loaded synctex");
                document.directory = path
                    .parent()
                    .filter(|dir| return !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf);
                return Ok(document);
            },
            Attempt::Missing => {
                tracing::trace!(path = %path.display(), "synctex variant absent");
            },
            Attempt::Failed(reason) => {
                tracing::warn!(path = %path.display(), %reason, "synctex variant unreadable");
                attempted.push(path.clone());
                last_reason = reason;
            },
        }
    }

    if attempted.is_empty() {
        return Err(Error::SyncTexNotFound {
            candidates: vec![plain, compressed],
            pdf: pdf.to_path_buf(),
        });
    }
    return Err(Error::SyncTexParseFailed {
        attempted,
        reason: last_reason,
    });
}

/// Read, optionally gunzip, decode, and parse one variant.
fn read_variant(path: &Path, gzipped: bool) -> Attempt {
    let raw = match std::fs::read(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Attempt::Missing,
        Err(e) => return Attempt::Failed(e.to_string()),
        Ok(bytes) => bytes,
    };

    let bytes = if gzipped {
        let mut inflated = Vec::new();
        if let Err(e) = GzDecoder::new(raw.as_slice()).read_to_end(&mut inflated) {
            return Attempt::Failed(format!("gzip: {e}"));
        }
        inflated
    } else {
        raw
    };

    return match parser::parse(&codec::decode(&bytes)) {
        Ok(document) => Attempt::Loaded(document),
        Err(e) => Attempt::Failed(e.to_string()),
    };
}

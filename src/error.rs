/// Crate-level error types for SyncTeX loading and lookup.
use std::path::PathBuf;

/// Every error names the file, page, or reason for failure so the caller can
/// show a message or drop the navigation request without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-wide error type re-exported at the root")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A code point outside the pass-through range was handed to the encoder.
    #[error("cannot encode U+{code_point:04X} at char {index} as a synctex byte")]
    Encoding {
        /// Offending code point.
        code_point: u32,
        /// Char index of the offending code point in the input string.
        index: usize,
    },

    /// The requested source file is not recorded in the synctex data.
    #[error("no synctex records for {}", file.display())]
    FileNotInSyncTex {
        /// Source file the caller asked about.
        file: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of a result failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A record in the synctex text has a recognized tag but unreadable fields.
    #[error("malformed synctex at line {line}: {reason}")]
    MalformedSyncTex {
        /// One-based line number in the decoded synctex text.
        line: usize,
        /// Description of what could not be read.
        reason: String,
    },

    /// The synctex data records no source files at all.
    #[error("synctex data records no input files")]
    NoEntriesInSyncTex,

    /// The source file is recorded but none of its lines carries visible material.
    #[error("no typeset lines recorded for {}", file.display())]
    NoLineRecorded {
        /// Source file whose line table is empty.
        file: PathBuf,
    },

    /// Backward search found no eligible block on the requested page.
    #[error("no synctex block on page {page}")]
    NoMatchFound {
        /// One-based page number that was searched.
        page: u32,
    },

    /// Neither `.synctex` nor `.synctex.gz` exists next to the PDF.
    #[error("no synctex file for {} (looked for {})", pdf.display(), candidates.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    SyncTexNotFound {
        /// Paths that were tried, in lookup order.
        candidates: Vec<PathBuf>,
        /// PDF the synctex data was requested for.
        pdf: PathBuf,
    },

    /// At least one synctex variant exists but none could be decoded and parsed.
    #[error("failed to read synctex ({}): {reason}", attempted.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    SyncTexParseFailed {
        /// Variants that existed and were attempted, in lookup order.
        attempted: Vec<PathBuf>,
        /// Failure reason of the last attempt.
        reason: String,
    },

    /// TOML deserialization of `.synctex.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// `.synctex.toml` names an encoding label `encoding_rs` does not know.
    #[error("unknown encoding label: `{label}`")]
    UnknownEncoding {
        /// Label as written in the config file.
        label: String,
    },
}

impl Error {
    /// Whether the lookup itself ran and simply found no location.
    ///
    /// The CLI maps these to a softer exit code than load or parse failures.
    pub const fn is_no_location(&self) -> bool {
        return matches!(
            self,
            Self::FileNotInSyncTex { .. }
                | Self::NoEntriesInSyncTex
                | Self::NoLineRecorded { .. }
                | Self::NoMatchFound { .. }
        );
    }
}

/// Core domain types: the parsed synctex document, its blocks, and lookup results.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::paths;

/// Per-line, per-page leaf blocks of one source file.
/// Outer key is the one-based source line, inner key the one-based page.
pub type LineTable = BTreeMap<u32, BTreeMap<u32, Vec<Block>>>;

/// Engine-specific kind of a typeset box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Glue (stretchable space).
    Glue,
    /// `\hbox`, or a void horizontal box when it has no elements.
    HorizontalBox,
    /// Kern (fixed space).
    Kern,
    /// Current-position and math records.
    Other,
    /// Rule (filled rectangle).
    Rule,
    /// `\vbox`, or a void vertical box when it has no elements.
    VerticalBox,
}

/// One typeset visual unit with its position in big points.
///
/// `bottom` is the baseline-ward edge; y grows downward from the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Vertical position of the reference point.
    pub bottom: f64,
    /// Depth below the baseline, when recorded.
    pub depth: Option<f64>,
    /// Child blocks. `Some` marks a container, which is never measured directly.
    pub elements: Option<Vec<Block>>,
    /// Height above the baseline, when recorded.
    pub height: Option<f64>,
    /// Box kind.
    pub kind: BlockKind,
    /// Horizontal position of the reference point.
    pub left: f64,
    /// One-based page number.
    pub page: u32,
    /// Width, when recorded.
    pub width: Option<f64>,
}

impl Block {
    /// Whether the block takes part in geometric computations.
    ///
    /// Containers defer to their children; kerns and rules are never measured.
    pub const fn is_measurable(&self) -> bool {
        if self.elements.is_some() {
            return false;
        }
        return match self.kind {
            BlockKind::Kern | BlockKind::Rule => false,
            BlockKind::Glue | BlockKind::HorizontalBox | BlockKind::Other | BlockKind::VerticalBox => {
                true
            },
        };
    }
}

/// Global origin offset applied to every block position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Offset {
    /// Horizontal offset in big points.
    pub x: f64,
    /// Vertical offset in big points.
    pub y: f64,
}

/// Parsed form of a synctex file. Immutable once built; rebuilt on every lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncTexDocument {
    /// Leaf blocks keyed by recorded file path, in first-appearance order.
    pub blocks_by_file: IndexMap<String, LineTable>,
    /// Directory the synctex file was read from; relative inputs resolve against it.
    pub directory: Option<PathBuf>,
    /// `Magnification:` preamble value (1000 = 1.0).
    pub magnification: f64,
    /// Global coordinate offset.
    pub offset: Offset,
    /// Box tree per page. Containers own their children exclusively.
    pub pages: BTreeMap<u32, Vec<Block>>,
    /// `Unit:` preamble value.
    pub unit: f64,
    /// Text following `SyncTeX Version:`.
    pub version: String,
}

impl SyncTexDocument {
    /// Recorded file paths in first-appearance order.
    pub fn files(&self) -> Vec<&str> {
        return self.blocks_by_file.keys().map(String::as_str).collect();
    }

    /// Directory relative inputs resolve against, if known.
    pub fn base_dir(&self) -> Option<&Path> {
        return self.directory.as_deref();
    }
}

/// Result of a forward search: where a source line landed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePosition {
    /// One-based page number.
    pub page: u32,
    /// Horizontal position in big points, offset applied.
    pub x: f64,
    /// Vertical position in big points, offset applied.
    pub y: f64,
}

/// Result of a backward search: the source line behind a page point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Always 0; synctex carries no column information.
    pub column: u32,
    /// Source file as a native path.
    pub file: PathBuf,
    /// One-based source line.
    pub line: u32,
}

/// Per-input statistics for `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    /// Number of leaf blocks recorded for this input.
    pub blocks: usize,
    /// Number of distinct source lines with recorded material.
    pub lines: usize,
    /// Recorded file path as a native path string.
    pub path: String,
}

/// Overview of a parsed document for `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    /// Inputs in first-appearance order.
    pub inputs: Vec<InputSummary>,
    /// Global coordinate offset.
    pub offset: Offset,
    /// Number of pages with a box tree.
    pub pages: usize,
    /// SyncTeX format version.
    pub version: String,
}

impl DocumentSummary {
    /// Collect counts from a parsed document.
    pub fn of(document: &SyncTexDocument) -> Self {
        let inputs = document
            .blocks_by_file
            .iter()
            .map(|(path, lines)| {
                let blocks = lines.values().flat_map(BTreeMap::values).map(Vec::len).sum();
                return InputSummary {
                    blocks,
                    lines: lines.len(),
                    path: paths::native_path(path, None).display().to_string(),
                };
            })
            .collect();
        return Self {
            inputs,
            offset: document.offset,
            pages: document.pages.len(),
            version: document.version.clone(),
        };
    }
}

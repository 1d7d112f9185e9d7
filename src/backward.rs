//! Backward search: a point on a rendered page to the source line behind it.

use crate::error::Error;
use crate::geometry::Rectangle;
use crate::paths::FilePathResolver;
use crate::types::{SourceLocation, SyncTexDocument};

/// Best block seen so far during the scan.
struct Candidate<'d> {
    /// Distance from the block's center to the query point.
    distance: f64,
    /// Recorded file key.
    file: &'d str,
    /// One-based source line.
    line: u32,
    /// The block's own rectangle.
    rect: Rectangle,
}

impl Candidate<'_> {
    /// Whether a block with `rect` at `distance` should take over.
    ///
    /// A block nested inside the current best always wins. Otherwise a closer
    /// block wins unless it encloses the current best.
    fn yields_to(&self, rect: &Rectangle, distance: f64) -> bool {
        return self.rect.contains(rect) || (distance < self.distance && !rect.contains(&self.rect));
    }
}

/// Locate the source line typeset at `(x, y)` on `page`.
///
/// Every measurable block on the page is considered on its own rectangle,
/// in recorded file and line order. The winning file's recorded name is
/// mapped back to a path on disk through `resolver`.
///
/// # Errors
///
/// Returns `Error::NoEntriesInSyncTex` if the document records no files,
/// or `Error::NoMatchFound` if the page has no measurable block.
pub fn locate(
    document: &SyncTexDocument,
    resolver: &FilePathResolver,
    page: u32,
    x: f64,
    y: f64,
) -> Result<SourceLocation, Error> {
    if document.blocks_by_file.is_empty() {
        return Err(Error::NoEntriesInSyncTex);
    }
    let (x0, y0) = (x - document.offset.x, y - document.offset.y);

    let mut best: Option<Candidate<'_>> = None;
    for (file, lines) in &document.blocks_by_file {
        for (&line, pages) in lines {
            let Some(blocks) = pages.get(&page) else {
                continue;
            };
            for block in blocks.iter().filter(|b| return b.is_measurable()) {
                let rect = Rectangle::of(block);
                let distance = rect.distance_from_center(x0, y0);
                let replace = best.as_ref().is_none_or(|current| return current.yields_to(&rect, distance));
                if replace {
                    best = Some(Candidate { distance, file, line, rect });
                }
            }
        }
    }

    let Some(found) = best else {
        return Err(Error::NoMatchFound { page });
    };
    tracing::debug!(file = found.file, line = found.line, page, "backward search");
    return Ok(SourceLocation {
        column: 0,
        file: resolver.source_path(found.file, document.base_dir()),
        line: found.line,
    });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use indexmap::IndexMap;

    use super::*;
    use crate::types::{Block, BlockKind, LineTable, Offset};

    fn block(kind: BlockKind, page: u32, left: f64, bottom: f64, width: f64, height: f64) -> Block {
        return Block {
            bottom,
            depth: None,
            elements: None,
            height: Some(height),
            kind,
            left,
            page,
            width: Some(width),
        };
    }

    fn document(entries: Vec<(&str, u32, Block)>, offset: Offset) -> SyncTexDocument {
        let mut blocks_by_file: IndexMap<String, LineTable> = IndexMap::new();
        for (file, line, b) in entries {
            blocks_by_file
                .entry(file.to_string())
                .or_default()
                .entry(line)
                .or_default()
                .entry(b.page)
                .or_default()
                .push(b);
        }
        return SyncTexDocument {
            blocks_by_file,
            directory: None,
            magnification: 1000.0,
            offset,
            pages: BTreeMap::new(),
            unit: 1.0,
            version: "1".to_string(),
        };
    }

    /// Block A spans `{0,0,100,100}`, block B spans `{40,40,60,60}`.
    fn nested(a_line: u32, b_line: u32) -> Vec<(&'static str, u32, Block)> {
        return vec![
            ("a.tex", a_line, block(BlockKind::HorizontalBox, 1, 0.0, 100.0, 100.0, 100.0)),
            ("a.tex", b_line, block(BlockKind::HorizontalBox, 1, 40.0, 60.0, 20.0, 20.0)),
        ];
    }

    #[test]
    fn nested_block_wins_over_its_container() {
        let doc = document(nested(1, 2), Offset::default());
        let found = locate(&doc, &FilePathResolver::default(), 1, 50.0, 50.0).unwrap();
        assert_eq!(found, SourceLocation { column: 0, file: PathBuf::from("a.tex"), line: 2 });
    }

    #[test]
    fn enclosing_block_never_displaces_a_nested_one() {
        let doc = document(nested(9, 2), Offset::default());
        let found = locate(&doc, &FilePathResolver::default(), 1, 50.0, 50.0).unwrap();
        assert_eq!(found.line, 2);
    }

    #[test]
    fn containment_beats_distance() {
        let entries = vec![
            ("a.tex", 1, block(BlockKind::HorizontalBox, 1, 0.0, 100.0, 100.0, 100.0)),
            // Nested in the first block but far from the query point.
            ("a.tex", 2, block(BlockKind::HorizontalBox, 1, 80.0, 100.0, 20.0, 20.0)),
        ];
        let doc = document(entries, Offset::default());
        assert_eq!(locate(&doc, &FilePathResolver::default(), 1, 10.0, 10.0).unwrap().line, 2);
    }

    #[test]
    fn disjoint_blocks_pick_the_nearest_center() {
        let entries = vec![
            ("a.tex", 1, block(BlockKind::HorizontalBox, 1, 0.0, 20.0, 20.0, 20.0)),
            ("b.tex", 7, block(BlockKind::HorizontalBox, 1, 100.0, 20.0, 20.0, 20.0)),
            ("a.tex", 3, block(BlockKind::HorizontalBox, 2, 100.0, 20.0, 20.0, 20.0)),
        ];
        let doc = document(entries, Offset::default());
        let found = locate(&doc, &FilePathResolver::default(), 1, 105.0, 12.0).unwrap();
        assert_eq!((found.file, found.line), (PathBuf::from("b.tex"), 7));
    }

    #[test]
    fn offset_is_removed_from_the_query_point() {
        let entries = vec![
            ("a.tex", 1, block(BlockKind::HorizontalBox, 1, 0.0, 20.0, 20.0, 20.0)),
            ("a.tex", 2, block(BlockKind::HorizontalBox, 1, 100.0, 20.0, 20.0, 20.0)),
        ];
        let doc = document(entries, Offset { x: 100.0, y: 0.0 });
        assert_eq!(locate(&doc, &FilePathResolver::default(), 1, 110.0, 10.0).unwrap().line, 1);
    }

    #[test]
    fn kerns_and_rules_are_ignored() {
        let entries = vec![
            ("a.tex", 1, block(BlockKind::HorizontalBox, 1, 0.0, 20.0, 20.0, 20.0)),
            ("a.tex", 2, block(BlockKind::Kern, 1, 100.0, 20.0, 20.0, 20.0)),
            ("a.tex", 3, block(BlockKind::Rule, 1, 100.0, 20.0, 20.0, 20.0)),
        ];
        let doc = document(entries, Offset::default());
        assert_eq!(locate(&doc, &FilePathResolver::default(), 1, 110.0, 10.0).unwrap().line, 1);
    }

    #[test]
    fn empty_page_and_empty_document_fail() {
        let doc = document(nested(1, 2), Offset::default());
        let resolver = FilePathResolver::default();
        assert!(matches!(locate(&doc, &resolver, 3, 0.0, 0.0), Err(Error::NoMatchFound { page: 3 })));

        let empty = document(vec![], Offset::default());
        assert!(matches!(locate(&empty, &resolver, 1, 0.0, 0.0), Err(Error::NoEntriesInSyncTex)));
    }
}

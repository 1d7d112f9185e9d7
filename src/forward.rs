//! Forward search: source file and line to a point on a rendered page.

use std::path::Path;

use crate::error::Error;
use crate::geometry::Rectangle;
use crate::paths::FilePathResolver;
use crate::types::{PagePosition, SyncTexDocument};

/// A recorded line reduced to what forward search needs.
#[derive(Debug, Clone, Copy)]
struct LineExtent {
    /// One-based source line.
    line: u32,
    /// Lowest page the line's material landed on.
    page: u32,
    /// Covering rectangle of the line's blocks on that page.
    rect: Rectangle,
}

/// Locate where `line` of `file` was typeset.
///
/// An exact hit (or a line before the first recorded one) uses that recorded
/// line's covering rectangle. A line between two recorded lines takes page and
/// x from the later line and interpolates y only when the earlier line sits
/// higher on the page. The document offset is added in every case.
///
/// # Errors
///
/// Returns `Error::FileNotInSyncTex` if `file` matches no recorded input,
/// or `Error::NoLineRecorded` if the input has no line with visible material.
pub fn locate(
    document: &SyncTexDocument,
    resolver: &FilePathResolver,
    file: &Path,
    line: u32,
) -> Result<PagePosition, Error> {
    let candidates = document.files();
    let key = resolver
        .resolve(&candidates, file, document.base_dir())
        .ok_or_else(|| return Error::FileNotInSyncTex { file: file.to_path_buf() })?;

    let extents = recorded_line_extents(document, key);
    let index = extents.partition_point(|e| return e.line < line);
    let previous = index.checked_sub(1).and_then(|i| return extents.get(i));

    let (page, x, y) = match (previous, extents.get(index)) {
        (None, Some(next)) => (next.page, next.rect.left, next.rect.bottom),
        (Some(_), Some(next)) if next.line == line => (next.page, next.rect.left, next.rect.bottom),
        (Some(prev), Some(next)) => (next.page, next.rect.left, interpolate_bottom(prev, next, line)),
        (Some(last), None) => (last.page, last.rect.left, last.rect.bottom),
        (None, None) => return Err(Error::NoLineRecorded { file: file.to_path_buf() }),
    };

    tracing::debug!(key, line, page, "forward search");
    return Ok(PagePosition {
        page,
        x: x + document.offset.x,
        y: y + document.offset.y,
    });
}

/// Lines of `key` whose blocks on their lowest page cover something visible, ascending.
fn recorded_line_extents(document: &SyncTexDocument, key: &str) -> Vec<LineExtent> {
    let Some(lines) = document.blocks_by_file.get(key) else {
        return Vec::new();
    };
    return lines
        .iter()
        .filter_map(|(&line, pages)| {
            let (&page, blocks) = pages.iter().next()?;
            let rect = Rectangle::covering(blocks);
            if rect.is_degenerate() {
                tracing::trace!(key, line, "line has no measurable block");
                return None;
            }
            return Some(LineExtent { line, page, rect });
        })
        .collect();
}

/// Vertical position of `line` strictly between `before` and `after`.
///
/// Only interpolates when `before` is visually above `after`; otherwise
/// (column or page break in between) the later line's bottom is used as is.
fn interpolate_bottom(before: &LineExtent, after: &LineExtent, line: u32) -> f64 {
    let (top, bottom) = (before.rect.bottom, after.rect.bottom);
    if top >= bottom {
        return bottom;
    }
    let span = f64::from(after.line) - f64::from(before.line);
    let into = f64::from(line) - f64::from(before.line);
    return top * (span - into) / span + bottom * into / span;
}

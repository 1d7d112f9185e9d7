//! SyncTeX text format: preamble settings, page content records, box tree.
//!
//! Only the records needed for forward and backward search are read. Unknown
//! lines (byte-offset markers, forms, postamble counters) are skipped.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::error::Error;
use crate::types::{Block, BlockKind, LineTable, Offset, SyncTexDocument};

/// TeX scaled points per PDF big point.
const SCALED_POINTS_PER_BIG_POINT: f64 = 65_781.76;

/// Header every synctex file starts with.
const VERSION_PREFIX: &str = "SyncTeX Version:";

/// Compiled record patterns, built once per parse.
struct RecordPatterns {
    /// `[tag,line:h,v:W,H,D` and `(tag,line:h,v:W,H,D`.
    container: Regex,
    /// `Input:tag:path`.
    input: Regex,
    /// `<c>tag,line:h,v[:W[,H,D]]`.
    leaf: Regex,
    /// `Magnification:`, `Unit:`, `X Offset:`, `Y Offset:`.
    setting: Regex,
}

impl RecordPatterns {
    /// Compile the record patterns.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    #[allow(clippy::expect_used, reason = "constant patterns")]
    fn new() -> Self {
        return Self {
            container: Regex::new(r"^([\[(])(\d+),(\d+):(-?\d+),(-?\d+):(-?\d+),(-?\d+),(-?\d+)")
                .expect("valid regex"),
            input: Regex::new(r"^Input:(\d+):(.*)$").expect("valid regex"),
            leaf: Regex::new(r"^([xkg$vhr])(\d+),(\d+):(-?\d+),(-?\d+)(?::(-?\d+)(?:,(-?\d+),(-?\d+))?)?")
                .expect("valid regex"),
            setting: Regex::new(r"^(Magnification|Unit|X Offset|Y Offset):(-?\d+(?:\.\d+)?)")
                .expect("valid regex"),
        };
    }
}

/// Parse decoded synctex text into a document.
///
/// # Errors
///
/// Returns `Error::MalformedSyncTex` if the header is missing or a recognized
/// record has unreadable fields.
pub fn parse(text: &str) -> Result<SyncTexDocument, Error> {
    let patterns = RecordPatterns::new();
    let mut lines = text
        .split('\n')
        .map(|l| return l.strip_suffix('\r').unwrap_or(l))
        .enumerate()
        .map(|(index, l)| return (index.saturating_add(1), l))
        .skip_while(|(_, l)| return l.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(Error::MalformedSyncTex {
            line: 1,
            reason: "empty input".to_string(),
        });
    };
    let Some(version) = header.strip_prefix(VERSION_PREFIX) else {
        return Err(Error::MalformedSyncTex {
            line: 1,
            reason: format!("expected `{VERSION_PREFIX}` header"),
        });
    };

    let mut builder = DocumentBuilder::new(version.trim());
    for (number, line) in lines {
        builder.read_record(&patterns, number, line)?;
    }

    let document = builder.finish();
    tracing::trace!(
        files = document.blocks_by_file.len(),
        pages = document.pages.len(),
        "parsed synctex"
    );
    return Ok(document);
}

/// Incremental state while reading records top to bottom.
struct DocumentBuilder {
    /// Leaf index, keyed by recorded path in first-declaration order.
    blocks_by_file: IndexMap<String, LineTable>,
    /// Declared input tags.
    inputs: HashMap<u32, String>,
    /// `Magnification:` value.
    magnification: f64,
    /// Containers opened and not yet closed, innermost last.
    open: Vec<Block>,
    /// Raw offsets in scaled points; converted in `finish`.
    offset_sp: Offset,
    /// Page currently being read.
    page: Option<u32>,
    /// Finished box trees.
    pages: BTreeMap<u32, Vec<Block>>,
    /// `Unit:` value.
    unit: f64,
    /// Header version string.
    version: String,
}

impl DocumentBuilder {
    /// Fresh builder with synctex preamble defaults.
    fn new(version: &str) -> Self {
        return Self {
            blocks_by_file: IndexMap::new(),
            inputs: HashMap::new(),
            magnification: 1000.0,
            open: Vec::new(),
            offset_sp: Offset::default(),
            page: None,
            pages: BTreeMap::new(),
            unit: 1.0,
            version: version.to_string(),
        };
    }

    /// Big points per recorded unit.
    fn scale(&self) -> f64 {
        return self.unit * self.magnification / 1000.0 / SCALED_POINTS_PER_BIG_POINT;
    }

    /// Dispatch one record by its leading character.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedSyncTex` if a recognized record cannot be read.
    fn read_record(&mut self, patterns: &RecordPatterns, number: usize, line: &str) -> Result<(), Error> {
        let Some(tag) = line.chars().next() else {
            return Ok(());
        };
        return match tag {
            '{' => {
                let page = parse_field::<u32>(line.get(1..).unwrap_or(""), number, "page number")?;
                self.open_page(page);
                Ok(())
            },
            '}' => {
                self.close_page();
                Ok(())
            },
            '[' | '(' => self.open_container(patterns, number, line),
            ']' | ')' => {
                self.close_container(number);
                Ok(())
            },
            'x' | 'k' | 'g' | '$' | 'v' | 'h' | 'r' => self.read_leaf(patterns, number, line),
            _ => self.read_setting(patterns, number, line),
        };
    }

    /// Preamble and postamble records. Unknown ones are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedSyncTex` if an `Input:` tag or a setting value is unreadable.
    fn read_setting(&mut self, patterns: &RecordPatterns, number: usize, line: &str) -> Result<(), Error> {
        if let Some(caps) = patterns.input.captures(line) {
            let tag = capture::<u32>(&caps, 1, number, "input tag")?;
            let path = caps.get(2).map_or("", |m| return m.as_str()).to_string();
            self.blocks_by_file.entry(path.clone()).or_default();
            self.inputs.insert(tag, path);
            return Ok(());
        }

        let Some(caps) = patterns.setting.captures(line) else {
            return Ok(());
        };
        let value = capture::<f64>(&caps, 2, number, "setting value")?;
        match caps.get(1).map(|m| return m.as_str()) {
            Some("Magnification") if value > 0.0 => self.magnification = value,
            Some("Unit") if value > 0.0 => self.unit = value,
            Some("X Offset") => self.offset_sp.x = value,
            Some("Y Offset") => self.offset_sp.y = value,
            _ => {},
        }
        return Ok(());
    }

    /// `{n`: start a page, closing any page left open.
    fn open_page(&mut self, page: u32) {
        if self.page.is_some() {
            self.close_page();
        }
        self.pages.entry(page).or_default();
        self.page = Some(page);
    }

    /// `}n`: flush containers still open and leave the page.
    fn close_page(&mut self) {
        while let Some(container) = self.open.pop() {
            self.attach(container);
        }
        self.page = None;
    }

    /// `[` or `(`: push a container. Tracked even off-page to keep closers balanced.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedSyncTex` if the record fields are unreadable.
    fn open_container(&mut self, patterns: &RecordPatterns, number: usize, line: &str) -> Result<(), Error> {
        let caps = patterns.container.captures(line).ok_or_else(|| {
            return Error::MalformedSyncTex {
                line: number,
                reason: "unreadable box record".to_string(),
            };
        })?;
        let kind = if line.starts_with('[') { BlockKind::VerticalBox } else { BlockKind::HorizontalBox };
        self.open.push(Block {
            bottom: capture::<f64>(&caps, 5, number, "vertical position")?,
            depth: Some(capture::<f64>(&caps, 8, number, "depth")?),
            elements: Some(Vec::new()),
            height: Some(capture::<f64>(&caps, 7, number, "height")?),
            kind,
            left: capture::<f64>(&caps, 4, number, "horizontal position")?,
            page: self.page.unwrap_or(0),
            width: Some(capture::<f64>(&caps, 6, number, "width")?),
        });
        return Ok(());
    }

    /// `]` or `)`: pop the innermost container into its parent.
    fn close_container(&mut self, number: usize) {
        let Some(container) = self.open.pop() else {
            tracing::trace!(line = number, "unbalanced box closer");
            return;
        };
        self.attach(container);
    }

    /// Leaf record: index it by (file, line, page) and hand it to its container.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedSyncTex` if the record fields are unreadable.
    fn read_leaf(&mut self, patterns: &RecordPatterns, number: usize, line: &str) -> Result<(), Error> {
        let caps = patterns.leaf.captures(line).ok_or_else(|| {
            return Error::MalformedSyncTex {
                line: number,
                reason: "unreadable leaf record".to_string(),
            };
        })?;
        let tag = capture::<u32>(&caps, 2, number, "input tag")?;
        let source_line = capture::<u32>(&caps, 3, number, "source line")?;

        let Some(page) = self.page else {
            tracing::trace!(line = number, "leaf record outside a page");
            return Ok(());
        };
        let Some(path) = self.inputs.get(&tag).cloned() else {
            tracing::trace!(line = number, tag, "leaf record for undeclared input");
            return Ok(());
        };

        let kind = match caps.get(1).map(|m| return m.as_str()) {
            Some("g") => BlockKind::Glue,
            Some("h") => BlockKind::HorizontalBox,
            Some("k") => BlockKind::Kern,
            Some("r") => BlockKind::Rule,
            Some("v") => BlockKind::VerticalBox,
            _ => BlockKind::Other,
        };
        let inherited_height = self.open.last().and_then(|c| return c.height);
        let leaf = Block {
            bottom: capture::<f64>(&caps, 5, number, "vertical position")?,
            depth: optional_capture::<f64>(&caps, 8, number, "depth")?,
            elements: None,
            height: optional_capture::<f64>(&caps, 7, number, "height")?.or(inherited_height),
            kind,
            left: capture::<f64>(&caps, 4, number, "horizontal position")?,
            page,
            width: optional_capture::<f64>(&caps, 6, number, "width")?,
        };

        self.blocks_by_file
            .entry(path)
            .or_default()
            .entry(source_line)
            .or_default()
            .entry(page)
            .or_default()
            .push(leaf.clone());
        self.attach(leaf);
        return Ok(());
    }

    /// Give a finished block to the innermost open container, or to the page.
    fn attach(&mut self, block: Block) {
        if let Some(parent) = self.open.last_mut() {
            parent.elements.get_or_insert_with(Vec::new).push(block);
            return;
        }
        let Some(page) = self.page else {
            return;
        };
        self.pages.entry(page).or_default().push(block);
    }

    /// Close whatever is still open and produce the document.
    ///
    /// Dimensions are read as scaled points and converted here, with the
    /// `Magnification:` and `Unit:` values in force at the end of the file.
    fn finish(mut self) -> SyncTexDocument {
        self.close_page();
        let scale = self.scale();
        let leaves = self
            .blocks_by_file
            .values_mut()
            .flat_map(BTreeMap::values_mut)
            .flat_map(BTreeMap::values_mut)
            .flatten();
        for block in leaves.chain(self.pages.values_mut().flatten()) {
            scale_block(block, scale);
        }
        return SyncTexDocument {
            blocks_by_file: self.blocks_by_file,
            directory: None,
            magnification: self.magnification,
            offset: Offset {
                x: self.offset_sp.x * scale,
                y: self.offset_sp.y * scale,
            },
            pages: self.pages,
            unit: self.unit,
            version: self.version,
        };
    }
}

/// Convert a block and everything it contains from scaled points to big points.
fn scale_block(block: &mut Block, scale: f64) {
    block.bottom *= scale;
    block.left *= scale;
    for dimension in [&mut block.depth, &mut block.height, &mut block.width].into_iter().flatten() {
        *dimension *= scale;
    }
    for child in block.elements.iter_mut().flatten() {
        scale_block(child, scale);
    }
}

/// Parse a required capture group.
///
/// # Errors
///
/// Returns `Error::MalformedSyncTex` if the group is missing or does not parse.
fn capture<T: FromStr>(caps: &Captures<'_>, group: usize, line: usize, what: &str) -> Result<T, Error> {
    let raw = caps.get(group).map_or("", |m| return m.as_str());
    return parse_field(raw, line, what);
}

/// Parse an optional capture group.
///
/// # Errors
///
/// Returns `Error::MalformedSyncTex` if the group is present but does not parse.
fn optional_capture<T: FromStr>(
    caps: &Captures<'_>,
    group: usize,
    line: usize,
    what: &str,
) -> Result<Option<T>, Error> {
    return caps
        .get(group)
        .map(|m| return parse_field(m.as_str(), line, what))
        .transpose();
}

/// Parse one numeric field.
///
/// # Errors
///
/// Returns `Error::MalformedSyncTex` naming the field on failure.
fn parse_field<T: FromStr>(raw: &str, line: usize, what: &str) -> Result<T, Error> {
    return raw.trim().parse::<T>().map_err(|_err| {
        return Error::MalformedSyncTex {
            line,
            reason: format!("bad {what}: `{raw}`"),
        };
    });
}

//! CLI commands for synctex-locate: forward, backward, inspect.

use std::path::Path;

use synctex_locate::types::DocumentSummary;
use synctex_locate::{Config, Error};

/// Directory holding `pdf`, where `.synctex.toml` is looked up.
fn pdf_dir(pdf: &Path) -> &Path {
    return pdf
        .parent()
        .filter(|p| return !p.as_os_str().is_empty())
        .unwrap_or_else(|| return Path::new("."));
}

/// Print the page position of a source line.
///
/// # Errors
///
/// Returns config, loading, or lookup errors.
pub fn forward(pdf: &Path, file: &Path, line: u32, json: bool) -> Result<(), Error> {
    let config = Config::load(pdf_dir(pdf))?;
    let position = synctex_locate::forward_search(pdf, file, line, &config)?;
    if json {
        println!("{}", serde_json::to_string(&position)?);
    } else {
        println!("{} {:.2} {:.2}", position.page, position.x, position.y);
    }
    return Ok(());
}

/// Print the source location behind a page point.
///
/// # Errors
///
/// Returns config, loading, or lookup errors.
pub fn backward(pdf: &Path, page: u32, x: f64, y: f64, json: bool) -> Result<(), Error> {
    let config = Config::load(pdf_dir(pdf))?;
    let location = synctex_locate::backward_search(pdf, page, x, y, &config)?;
    if json {
        println!("{}", serde_json::to_string(&location)?);
    } else {
        println!("{}:{}:{}", location.file.display(), location.line, location.column);
    }
    return Ok(());
}

/// Print an overview of the synctex data for `pdf`.
///
/// # Errors
///
/// Returns loading errors.
pub fn inspect(pdf: &Path, json: bool) -> Result<(), Error> {
    let summary = synctex_locate::inspect(pdf)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_markdown(&summary);
    }
    return Ok(());
}

// ── Markdown output ───────────────────────────────────────────────────

/// Render the summary as markdown on stdout.
fn print_markdown(summary: &DocumentSummary) {
    println!("# SyncTeX version {}", summary.version);
    println!();
    println!("- pages: {}", summary.pages);
    println!("- offset: ({:.2}, {:.2})", summary.offset.x, summary.offset.y);
    println!();
    println!("## Inputs");
    println!();
    if summary.inputs.is_empty() {
        println!("No inputs recorded.");
        return;
    }
    for input in &summary.inputs {
        println!("- `{}`: {} lines, {} blocks", input.path, input.lines, input.blocks);
    }
}

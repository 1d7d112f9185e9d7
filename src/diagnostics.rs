use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// ANSI bold, used for markdown headings on a terminal.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print it to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block saying what happened and, where the user
/// can do something about it, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::SyncTexNotFound { pdf, candidates } => render_synctex_not_found(pdf, candidates),
        Error::SyncTexParseFailed { attempted, reason } => render_parse_failed(attempted, reason),
        Error::FileNotInSyncTex { file } => render_file_not_in_synctex(file),
        Error::NoLineRecorded { file } => format!(
            "\
# Error: No Typeset Lines

`{}` is recorded in the synctex data, but none of its lines produced visible material.
",
            file.display()
        ),
        Error::NoMatchFound { page } => format!(
            "\
# Error: Nothing Here

Page {page} has no synctex record to map back to a source line.
"
        ),
        Error::UnknownEncoding { label } => render_unknown_encoding(label),
        _ => render_generic(e),
    };
}

/// Variants with nothing to suggest beyond the message itself.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::NoEntriesInSyncTex => "\
# Error: Empty SyncTeX

The synctex data records no input files.
"
        .to_string(),
        Error::MalformedSyncTex { line, reason } => format!(
            "\
# Error: Malformed SyncTeX

Line {line}: {reason}
"
        ),
        Error::Encoding { code_point, index } => format!(
            "\
# Error: Encoding

U+{code_point:04X} at char {index} has no synctex byte.
"
        ),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid TOML

{err}
"
        ),
        _ => format!(
            "\
# Error

{e}
"
        ),
    };
}

fn render_synctex_not_found(pdf: &Path, candidates: &[PathBuf]) -> String {
    let mut out = format!(
        "\
# Error: SyncTeX Not Found

No synctex data for `{}`.

## Looked for

",
        pdf.display()
    );
    for path in candidates {
        let _ = writeln!(out, "- `{}`", path.display());
    }
    out.push_str(
        "\
\n## Fix

Rebuild with synctex enabled:

    latexmk -pdf -synctex=1 main.tex
",
    );
    return out;
}

fn render_parse_failed(attempted: &[PathBuf], reason: &str) -> String {
    let mut out = "\
# Error: SyncTeX Unreadable

## Attempted

"
    .to_string();
    for path in attempted {
        let _ = writeln!(out, "- `{}`", path.display());
    }
    let _ = write!(
        out,
        "\
\n## Reason

{reason}

## Fix

The file is likely truncated by an interrupted build. Rebuild the document.
"
    );
    return out;
}

fn render_file_not_in_synctex(file: &Path) -> String {
    return format!(
        "\
# Error: File Not In SyncTeX

`{}` did not contribute to this PDF, even after trying legacy file-name encodings.

## Fix

If the name contains non-ASCII characters, list the encoding the TeX engine ran under in `.synctex.toml`:

    encodings = [\"shift_jis\"]
",
        file.display()
    );
}

fn render_unknown_encoding(label: &str) -> String {
    return format!(
        "\
# Error: Unknown Encoding

`{label}` is not a WHATWG encoding label.

## Fix

Use a label such as `utf-8`, `shift_jis`, `gbk`, `big5`, `euc-kr`, or `windows-1252` in `.synctex.toml`.
"
    );
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_every_candidate() {
        let md = render_error(&Error::SyncTexNotFound {
            candidates: vec![PathBuf::from("a.synctex"), PathBuf::from("a.synctex.gz")],
            pdf: PathBuf::from("a.pdf"),
        });
        assert!(md.starts_with("# Error: SyncTeX Not Found"));
        assert!(md.contains("- `a.synctex`\n- `a.synctex.gz`"));
    }

    #[test]
    fn generic_variants_keep_their_message() {
        let md = render_error(&Error::MalformedSyncTex {
            line: 12,
            reason: "bad width".to_string(),
        });
        assert!(md.contains("Line 12: bad width"));
    }
}

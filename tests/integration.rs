use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::Compression;
use flate2::write::GzEncoder;
use synctex_locate::{Config, Error, PagePosition};

/// 25 big points in scaled points.
const BP25: i64 = 1_644_544;

/// Two inputs over two pages; dimensions are multiples of 25bp.
fn synctex_text() -> String {
    let bp = |n: i64| return n * BP25;
    return format!(
        "SyncTeX Version:1
Input:1:./main.tex
Input:2:./sections/intro.tex
Output:pdf
Magnification:1000
Unit:1
X Offset:0
Y Offset:0
Content:
{{1
[1,1:{l},{b4}:{w20},{h16},0
(1,3:{l},{b1}:{w20},{h1},0
x1,3:{l},{b1}
g1,3:{l2},{b1}
)
(2,1:{l},{b2}:{w20},{h1},0
x2,1:{l},{b2}
)
(1,9:{l},{b4}:{w20},{h1},0
x1,9:{l},{b4}
)
]
}}1
{{2
(1,12:{l},{b1}:{w20},{h1},0
x1,12:{l},{b1}
)
}}2
Postamble:
Count:14
",
        l = bp(4),
        l2 = bp(8),
        b1 = bp(4),
        b2 = bp(8),
        b4 = bp(16),
        w20 = bp(20),
        h16 = bp(16),
        h1 = bp(1),
    );
}

/// Lay out `main.pdf`, its synctex data, and the source files in a temp dir.
fn project(gzipped: bool) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.tex"), "").unwrap();
    std::fs::create_dir(dir.path().join("sections")).unwrap();
    std::fs::write(dir.path().join("sections/intro.tex"), "").unwrap();
    std::fs::write(dir.path().join("main.pdf"), "").unwrap();

    if gzipped {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(synctex_text().as_bytes()).unwrap();
        std::fs::write(dir.path().join("main.synctex.gz"), encoder.finish().unwrap()).unwrap();
    } else {
        std::fs::write(dir.path().join("main.synctex"), synctex_text()).unwrap();
    }
    return dir;
}

fn synctex_locate(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_synctex-locate"));
    cmd.current_dir(dir);
    return cmd;
}

fn approx(a: f64, b: f64) -> bool {
    return (a - b).abs() < 1e-6;
}

#[test]
fn forward_search_through_gzip() {
    let dir = project(true);
    let pdf = dir.path().join("main.pdf");
    let position = synctex_locate::forward_search(&pdf, &dir.path().join("main.tex"), 3, &Config::default()).unwrap();
    assert_eq!(position.page, 1);
    assert!(approx(position.x, 100.0));
    assert!(approx(position.y, 100.0));
}

#[test]
fn forward_search_interpolates_between_lines() {
    let dir = project(false);
    let pdf = dir.path().join("main.pdf");
    let position = synctex_locate::forward_search(&pdf, &dir.path().join("main.tex"), 6, &Config::default()).unwrap();
    // Line 3 sits at 100bp and line 9 at 400bp; line 6 is halfway.
    assert_eq!(position.page, 1);
    assert!(approx(position.y, 250.0));
}

#[test]
fn backward_search_returns_absolute_source_path() {
    let dir = project(false);
    let pdf = dir.path().join("main.pdf");
    let location = synctex_locate::backward_search(&pdf, 1, 150.0, 195.0, &Config::default()).unwrap();
    assert_eq!(location.line, 1);
    assert_eq!(location.column, 0);
    assert_eq!(location.file, dir.path().join("./sections/intro.tex"));
}

#[test]
fn shift_jis_input_name_resolves_both_ways() {
    let dir = tempfile::tempdir().unwrap();
    let name = "\u{65e5}\u{672c}.tex";
    std::fs::write(dir.path().join(name), "").unwrap();
    std::fs::write(dir.path().join("main.pdf"), "").unwrap();

    let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(name);
    let mut raw = b"SyncTeX Version:1\nInput:1:./".to_vec();
    raw.extend_from_slice(&sjis);
    let (bottom, width, height) = (BP25 * 4, BP25 * 4, BP25);
    let content = format!("\n{{1\n(1,3:0,{bottom}:{width},{height},0\nx1,3:0,{bottom}\n)\n}}1\n");
    raw.extend_from_slice(content.as_bytes());
    std::fs::write(dir.path().join("main.synctex"), raw).unwrap();

    let pdf = dir.path().join("main.pdf");
    let position = synctex_locate::forward_search(&pdf, &dir.path().join(name), 3, &Config::default()).unwrap();
    assert_eq!(position.page, 1);
    assert!(approx(position.y, 100.0));

    let location = synctex_locate::backward_search(&pdf, 1, 0.0, 100.0, &Config::default()).unwrap();
    assert_eq!(location.line, 3);
    assert!(location.file.exists(), "{} does not exist", location.file.display());
    assert_eq!(location.file, dir.path().join(name));
}

#[test]
fn backward_search_on_a_blank_page_fails() {
    let dir = project(false);
    let err = synctex_locate::backward_search(&dir.path().join("main.pdf"), 7, 0.0, 0.0, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::NoMatchFound { page: 7 }));
}

#[test]
fn concurrent_lookups_are_independent() {
    let dir = project(false);
    let pdf = dir.path().join("main.pdf");
    let main_tex = dir.path().join("main.tex");
    let config = Config::default();

    let positions: Vec<PagePosition> = std::thread::scope(|scope| {
        let handles: Vec<_> = [3, 12]
            .into_iter()
            .map(|line| {
                let (pdf, main_tex, config) = (&pdf, &main_tex, &config);
                return scope.spawn(move || return synctex_locate::forward_search(pdf, main_tex, line, config).unwrap());
            })
            .collect();
        return handles.into_iter().map(|h| return h.join().unwrap()).collect();
    });
    assert_eq!(positions[0].page, 1);
    assert_eq!(positions[1].page, 2);
}

#[test]
fn cli_forward_prints_page_and_coordinates() {
    let dir = project(false);
    let out = synctex_locate(dir.path())
        .args(["forward", "--pdf", "main.pdf", "--file", "main.tex", "--line", "12"])
        .output()
        .unwrap();
    assert!(out.status.success(), "forward failed: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "2 100.00 100.00");
}

#[test]
fn cli_backward_emits_json() {
    let dir = project(false);
    let out = synctex_locate(dir.path())
        .args(["backward", "--pdf", "main.pdf", "--page", "1", "-x", "110", "-y", "95", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "backward failed: {}", String::from_utf8_lossy(&out.stderr));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["line"], 3);
    assert_eq!(value["column"], 0);
    assert!(value["file"].as_str().unwrap().ends_with("main.tex"));
}

#[test]
fn cli_inspect_summarizes_inputs() {
    let dir = project(true);
    let out = synctex_locate(dir.path())
        .args(["inspect", "--pdf", "main.pdf", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "inspect failed: {}", String::from_utf8_lossy(&out.stderr));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["pages"], 2);
    assert_eq!(value["inputs"][0]["path"], "./main.tex");
    assert_eq!(value["inputs"][0]["lines"], 3);
    assert_eq!(value["inputs"][1]["path"], "./sections/intro.tex");
}

#[test]
fn cli_exit_codes_separate_missing_data_from_missing_locations() {
    let dir = project(false);
    std::fs::write(dir.path().join("other.tex"), "").unwrap();

    let unknown_file = synctex_locate(dir.path())
        .args(["forward", "--pdf", "main.pdf", "--file", "other.tex", "--line", "1"])
        .output()
        .unwrap();
    assert_eq!(unknown_file.status.code(), Some(1));

    let no_synctex = synctex_locate(dir.path())
        .args(["forward", "--pdf", "absent.pdf", "--file", "main.tex", "--line", "1"])
        .output()
        .unwrap();
    assert_eq!(no_synctex.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&no_synctex.stderr).contains("SyncTeX Not Found"));
}

#[test]
fn config_encodings_are_honoured() {
    let dir = project(false);
    std::fs::write(dir.path().join(".synctex.toml"), "encodings = [\"nonsense\"]").unwrap();
    let out = synctex_locate(dir.path())
        .args(["forward", "--pdf", "main.pdf", "--file", "main.tex", "--line", "3"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown Encoding"));

    let path: PathBuf = dir.path().join(".synctex.toml");
    std::fs::write(&path, "encodings = [\"utf-8\"]").unwrap();
    let out = synctex_locate(dir.path())
        .args(["forward", "--pdf", "main.pdf", "--file", "main.tex", "--line", "3"])
        .output()
        .unwrap();
    assert!(out.status.success());
}

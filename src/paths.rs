//! Matching recorded synctex paths against filesystem paths.
//!
//! A TeX engine running under another locale may record a non-ASCII file name
//! in a legacy encoding. Rather than guess which one, every configured encoding
//! is tried in turn until a decoded variant names the same file on disk.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::codec;

/// Fallback encodings tried when a plain comparison finds nothing.
pub const DEFAULT_ENCODINGS: &[&Encoding] = &[
    encoding_rs::UTF_8,
    encoding_rs::UTF_16LE,
    encoding_rs::UTF_16BE,
    encoding_rs::SHIFT_JIS,
    encoding_rs::EUC_JP,
    encoding_rs::ISO_2022_JP,
    encoding_rs::GBK,
    encoding_rs::GB18030,
    encoding_rs::BIG5,
    encoding_rs::EUC_KR,
    encoding_rs::WINDOWS_1252,
    encoding_rs::WINDOWS_1251,
];

/// Resolves a caller-supplied path to the key a synctex document records it under.
#[derive(Debug, Clone)]
pub struct FilePathResolver {
    /// Encodings for the fallback pass, in trial order.
    encodings: Vec<&'static Encoding>,
}

impl Default for FilePathResolver {
    fn default() -> Self {
        return Self::new(DEFAULT_ENCODINGS.to_vec());
    }
}

impl FilePathResolver {
    /// Resolver with an explicit fallback encoding list.
    pub const fn new(encodings: Vec<&'static Encoding>) -> Self {
        return Self { encodings };
    }

    /// Encodings used by the fallback pass.
    pub fn encodings(&self) -> &[&'static Encoding] {
        return &self.encodings;
    }

    /// Find the candidate naming the same file as `target`.
    ///
    /// The first pass compares every candidate as written; the second pass
    /// re-decodes each candidate's raw bytes under every fallback encoding.
    /// Candidate order is preserved and the first match wins. Relative
    /// candidates are taken relative to `base`.
    pub fn resolve<'c>(&self, candidates: &[&'c str], target: &Path, base: Option<&Path>) -> Option<&'c str> {
        let Ok(target) = target.canonicalize() else {
            tracing::debug!(path = %target.display(), "target does not exist");
            return None;
        };

        let direct = candidates
            .iter()
            .copied()
            .find(|candidate| return same_file(&anchor(Path::new(candidate), base), &target));
        if let Some(candidate) = direct {
            tracing::debug!(candidate, "resolved by direct comparison");
            return Some(candidate);
        }

        for &candidate in candidates {
            let Ok(raw) = codec::encode(candidate) else {
                continue;
            };
            let found = self
                .reencodings(&raw)
                .find(|(_, variant)| return same_file(&anchor(Path::new(&**variant), base), &target));
            if let Some((encoding, _)) = found {
                tracing::debug!(candidate, encoding = encoding.name(), "resolved by re-encoding");
                return Some(candidate);
            }
        }
        return None;
    }

    /// Native path of the file a recorded key names.
    ///
    /// The key's raw bytes are read as UTF-8 first, then under each fallback
    /// encoding; the first reading that names an existing file wins. When
    /// none does, the UTF-8 reading (or the key text) is returned.
    pub fn source_path(&self, key: &str, base: Option<&Path>) -> PathBuf {
        let native = native_path(key, base);
        if native.exists() {
            return native;
        }
        let Ok(raw) = codec::encode(key) else {
            return native;
        };
        let found = self.reencodings(&raw).find_map(|(encoding, variant)| {
            let path = anchor(Path::new(&*variant), base);
            return path.exists().then_some((encoding, path));
        });
        let Some((encoding, path)) = found else {
            tracing::debug!(key, "no decoding of the recorded path exists on disk");
            return native;
        };
        tracing::debug!(key, encoding = encoding.name(), "recorded path re-decoded");
        return path;
    }

    /// Lazy sequence of `raw` decoded under each fallback encoding.
    pub fn reencodings<'a>(&'a self, raw: &'a [u8]) -> Reencodings<'a> {
        return Reencodings {
            encodings: &self.encodings,
            next: 0,
            raw,
        };
    }
}

/// Decoded variants of one recorded path, one per encoding that accepts its bytes.
///
/// Finite (bounded by the encoding list) and restartable: clone it before
/// iterating to walk the same sequence again.
#[derive(Debug, Clone)]
pub struct Reencodings<'a> {
    /// Encodings still to try, indexed by `next`.
    encodings: &'a [&'static Encoding],
    /// Index of the next encoding.
    next: usize,
    /// Recorded path bytes.
    raw: &'a [u8],
}

impl<'a> Iterator for Reencodings<'a> {
    type Item = (&'static Encoding, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&encoding) = self.encodings.get(self.next) {
            self.next = self.next.saturating_add(1);
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(self.raw) {
                return Some((encoding, text));
            }
        }
        return None;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (0, Some(self.encodings.len().saturating_sub(self.next)));
    }
}

/// Native path for a recorded key: its raw bytes as UTF-8, else the key text.
pub fn native_path(key: &str, base: Option<&Path>) -> PathBuf {
    let decoded = codec::encode(key)
        .ok()
        .and_then(|raw| return String::from_utf8(raw).ok())
        .unwrap_or_else(|| return key.to_string());
    return anchor(Path::new(&decoded), base);
}

/// Join a relative path onto `base`; absolute paths pass through.
fn anchor(path: &Path, base: Option<&Path>) -> PathBuf {
    return match base {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
}

/// Real-path equality against an already canonical `target`.
/// A path that cannot be canonicalized never matches.
fn same_file(path: &Path, target: &Path) -> bool {
    return path.canonicalize().is_ok_and(|real| return real == target);
}

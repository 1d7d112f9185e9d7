use std::path::Path;

use encoding_rs::Encoding;

use crate::error::Error;
use crate::paths::{DEFAULT_ENCODINGS, FilePathResolver};

/// Name of the optional config file, looked up next to the PDF.
pub const CONFIG_FILE: &str = ".synctex.toml";

/// Lookup configuration loaded from `.synctex.toml`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fallback encodings for recorded file names, in trial order.
    pub encodings: Vec<&'static Encoding>,
}

/// Raw TOML structure for `.synctex.toml`.
#[derive(serde::Deserialize)]
struct SyncTexTomlConfig {
    /// WHATWG encoding labels; `None` keeps the defaults.
    #[serde(default)]
    encodings: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            encodings: DEFAULT_ENCODINGS.to_vec(),
        };
    }
}

impl Config {
    /// Load config from `.synctex.toml` in `dir`.
    /// Returns the defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownEncoding` for a label `encoding_rs` does not know.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` or `Error::UnknownEncoding`.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: SyncTexTomlConfig = toml::from_str(content)?;
        let Some(labels) = raw.encodings else {
            return Ok(Self::default());
        };
        let encodings = labels
            .iter()
            .map(|label| {
                return Encoding::for_label(label.trim().as_bytes())
                    .ok_or_else(|| return Error::UnknownEncoding { label: label.clone() });
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Self { encodings });
    }

    /// Path resolver using this config's encodings.
    pub fn resolver(&self) -> FilePathResolver {
        return FilePathResolver::new(self.encodings.clone());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.encodings.len(), DEFAULT_ENCODINGS.len());
    }

    #[test]
    fn labels_resolve_through_encoding_rs() {
        let config = Config::parse("encodings = [\"sjis\", \"utf-8\"]").unwrap();
        let names: Vec<&str> = config.encodings.iter().map(|e| return e.name()).collect();
        assert_eq!(names, vec!["Shift_JIS", "UTF-8"]);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = Config::parse("encodings = [\"klingon\"]").unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding { label } if label == "klingon"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "encodings = 3").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}

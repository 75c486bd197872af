//! Explicit configuration for batch generation.
//!
//! Nothing here is global: a [`Config`] is built once at startup (defaults,
//! or a TOML file) and passed to [`crate::batch::BatchGenerator`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::archive::DEFAULT_COMPRESSION_LEVEL;
use crate::error::{QrBatchError, Result};

/// Default cap on the number of codes one request may expand to.
pub const DEFAULT_MAX_CODES: u64 = 100_000;

/// Default number of codes rendered concurrently before appending.
pub const DEFAULT_PARALLEL_CHUNK: usize = 64;

/// Batch generation settings.
///
/// ```toml
/// scratch_dir = "/var/tmp/qrbatch"
/// max_codes_per_request = 5000
/// compression_level = 9
/// parallel_chunk = 32
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding scratch archives and logo uploads.
    pub scratch_dir: PathBuf,
    /// Upper bound on codes per request; `None` disables the check.
    pub max_codes_per_request: Option<u64>,
    /// Deflate level for archive entries, 0..=9.
    pub compression_level: i64,
    /// Codes rendered in parallel per step; 1 renders strictly one by one.
    pub parallel_chunk: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("uploads"),
            max_codes_per_request: Some(DEFAULT_MAX_CODES),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            parallel_chunk: DEFAULT_PARALLEL_CHUNK,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| QrBatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads [`Config::from_toml_str`] from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| QrBatchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Uses `dir` for scratch files.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Sets or clears the per-request code limit.
    #[must_use]
    pub fn with_max_codes(mut self, limit: Option<u64>) -> Self {
        self.max_codes_per_request = limit;
        self
    }

    /// Sets how many codes are rendered concurrently.
    #[must_use]
    pub fn with_parallel_chunk(mut self, chunk: usize) -> Self {
        self.parallel_chunk = chunk;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0..=9).contains(&self.compression_level) {
            return Err(QrBatchError::Config(format!(
                "compression_level must be within 0..=9, got {}",
                self.compression_level
            )));
        }
        if self.parallel_chunk == 0 {
            return Err(QrBatchError::Config("parallel_chunk must be at least 1".into()));
        }
        Ok(())
    }

    /// Creates the scratch directory if needed. Run once at startup.
    pub fn ensure_scratch_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        tracing::debug!(dir = %self.scratch_dir.display(), "scratch directory ready");
        Ok(())
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scratch_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_codes_per_request, Some(DEFAULT_MAX_CODES));
        assert_eq!(config.compression_level, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("max_codes_per_request = 10\n").unwrap();
        assert_eq!(config.max_codes_per_request, Some(10));
        assert_eq!(config.parallel_chunk, DEFAULT_PARALLEL_CHUNK);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(Config::from_toml_str("compression_level = 12"), Err(QrBatchError::Config(_))));
        assert!(matches!(Config::from_toml_str("parallel_chunk = 0"), Err(QrBatchError::Config(_))));
        assert!(matches!(Config::from_toml_str("colour = \"red\""), Err(QrBatchError::Config(_))));
    }

    #[test]
    fn test_load_and_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("nested").join("uploads");
        let file = dir.path().join("qrbatch.toml");
        std::fs::write(&file, format!("scratch_dir = {:?}\n", scratch.to_str().unwrap())).unwrap();

        let config = Config::load(&file).unwrap();
        assert_eq!(config.scratch_dir, scratch);
        config.ensure_scratch_dir().unwrap();
        assert!(scratch.is_dir());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(Config::load("/nonexistent/qrbatch.toml"), Err(QrBatchError::Config(_))));
    }
}

use std::path::PathBuf;

use crate::error::{Result, ToolError};

/// Sub-directory receiving downloaded photos.
pub const PHOTOS_DIR: &str = "photos";
/// Sub-directory receiving downloaded QR codes.
pub const QRCODES_DIR: &str = "qrcodes";

/// Decides when a media column is rewritten to its local file path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathPolicy {
    /// Always write the computed local path, even when the download failed or
    /// the column was empty.
    #[default]
    Always,
    /// Write the local path only after a successful download; otherwise keep
    /// the original value.
    OnSuccess,
}

/// Settings driving one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub chunk_size: usize,
    pub path_policy: PathPolicy,
    /// Names at least this many characters long get their middle names abbreviated.
    pub name_threshold: usize,
    pub photo_column: String,
    pub qrcode_column: String,
    pub name_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::new(),
            output_name: "output.csv".to_string(),
            chunk_size: 10,
            path_policy: PathPolicy::Always,
            name_threshold: 18,
            photo_column: "photo".to_string(),
            qrcode_column: "qrcode".to_string(),
            name_column: "nomComplet".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Rejects settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ToolError::InvalidArgument(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if self.output_name.trim().is_empty() {
            return Err(ToolError::InvalidArgument(
                "output file name must not be empty".to_string(),
            ));
        }
        if self.photo_column == self.qrcode_column {
            return Err(ToolError::InvalidArgument(format!(
                "photo and QR code columns must differ (both are '{}')",
                self.photo_column
            )));
        }
        Ok(())
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.output_dir.join(PHOTOS_DIR)
    }

    pub fn qrcodes_dir(&self) -> PathBuf {
        self.output_dir.join(QRCODES_DIR)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

//! Configuration
//!
//! A JSON file with every field optional; anything missing takes its
//! default. Decode fields left out follow the encode section, so a file
//! that only changes the tone mapping still reads its own artifacts back.
//! Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::codec::{DecodeParams, EncodeParams};
use crate::error::{Result, SonarError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct SonarConfig {
    pub encode: EncodeParams,
    pub decode: DecodeParams,
    pub backend: BackendKind,
    /// Directory artifacts are written to and read from
    pub output_dir: PathBuf,
    /// Sleep for each tone while playing
    pub pacing: bool,
    /// Output gain in 0.0..=1.0
    pub master_volume: f64,
}

impl Default for SonarConfig {
    fn default() -> Self {
        SonarConfig {
            encode: EncodeParams::default(),
            decode: DecodeParams::default(),
            backend: BackendKind::default(),
            output_dir: PathBuf::from("."),
            pacing: false,
            master_volume: 1.0,
        }
    }
}

/// On-disk form of [`SonarConfig`]
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    encode: EncodeParams,
    decode: DecodeOverrides,
    backend: BackendKind,
    output_dir: PathBuf,
    pacing: bool,
    master_volume: f64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = SonarConfig::default();
        ConfigFile {
            encode: defaults.encode,
            decode: DecodeOverrides::default(),
            backend: defaults.backend,
            output_dir: defaults.output_dir,
            pacing: defaults.pacing,
            master_volume: defaults.master_volume,
        }
    }
}

impl From<ConfigFile> for SonarConfig {
    fn from(file: ConfigFile) -> Self {
        SonarConfig {
            decode: file.decode.apply(file.encode.matching_decode()),
            encode: file.encode,
            backend: file.backend,
            output_dir: file.output_dir,
            pacing: file.pacing,
            master_volume: file.master_volume,
        }
    }
}

/// Decode fields set explicitly in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DecodeOverrides {
    base_frequency: Option<f64>,
    frequency_range: Option<f64>,
    tolerance: Option<f64>,
    strict_mode: Option<bool>,
    window_duration: Option<f64>,
}

impl DecodeOverrides {
    fn apply(self, base: DecodeParams) -> DecodeParams {
        DecodeParams {
            base_frequency: self.base_frequency.unwrap_or(base.base_frequency),
            frequency_range: self.frequency_range.unwrap_or(base.frequency_range),
            tolerance: self.tolerance.unwrap_or(base.tolerance),
            strict_mode: self.strict_mode.unwrap_or(base.strict_mode),
            window_duration: self.window_duration.unwrap_or(base.window_duration),
        }
    }
}

impl SonarConfig {
    /// Load and validate a configuration file
    ///
    /// # Errors
    /// * `FileReadError` - the file cannot be read
    /// * `Serialization` - the file is not valid JSON for this structure
    /// * `InvalidArgument` - a value is out of range
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SonarError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SonarConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.encode.validate()?;
        self.decode.validate()?;
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(SonarError::InvalidArgument {
                reason: format!(
                    "master_volume must be within 0.0..=1.0, got {}",
                    self.master_volume
                ),
            });
        }
        Ok(())
    }
}

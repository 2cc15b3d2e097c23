//! Engine configuration.
//!
//! Defaults: four sine voices, gain 0.15 and a
//! 0.99-per-sample tail-off that idles at 0.005.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{synth::sine::VoiceParams, MAX_BLOCK_SIZE};

/// How scheduled events are dispatched within a block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Look at the next scheduled event only. If it falls in
    /// `(position, position + n]` it is applied at the start of the block;
    /// any further event due in the same block is skipped.
    NextEventOnly,
    /// Apply every event in `[position, position + n)` at its own frame.
    #[default]
    SampleAccurate,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Sample rate the renderer is prepared with at construction. Live hosts
    /// call `prepare` again with the device rate before the first note.
    pub sample_rate: f64,
    /// Number of voices in the pool.
    pub voices: usize,
    /// Peak level at velocity 1.0.
    pub gain: f64,
    /// Per-sample tail-off multiplier, strictly between 0 and 1.
    pub release_ratio: f64,
    /// Tail-off level at which a voice idles.
    pub release_floor: f64,
    pub dispatch: DispatchPolicy,
    /// Frames per block for offline rendering.
    pub block_size: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let params = VoiceParams::default();
        Self {
            sample_rate: 44_100.0,
            voices: 4,
            gain: params.gain,
            release_ratio: params.release_ratio,
            release_floor: params.release_floor,
            dispatch: DispatchPolicy::default(),
            block_size: 512,
        }
    }
}

impl SynthConfig {
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            gain: self.gain,
            release_ratio: self.release_ratio,
            release_floor: self.release_floor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if !(self.gain.is_finite() && self.gain >= 0.0) {
            return Err(ConfigError::Gain(self.gain));
        }
        if !(self.release_ratio > 0.0 && self.release_ratio < 1.0) {
            return Err(ConfigError::ReleaseRatio(self.release_ratio));
        }
        if !(self.release_floor > 0.0 && self.release_floor < 1.0) {
            return Err(ConfigError::ReleaseFloor(self.release_floor));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading synth config");
        Self::from_yaml_str(&yaml)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    SampleRate(f64),
    #[error("voice pool needs at least one voice")]
    NoVoices,
    #[error("gain must be non-negative and finite, got {0}")]
    Gain(f64),
    #[error("release ratio must lie strictly between 0 and 1, got {0}")]
    ReleaseRatio(f64),
    #[error("release floor must lie strictly between 0 and 1, got {0}")]
    ReleaseFloor(f64),
    #[error("block size must be between 1 and {max}, got {0}", max = MAX_BLOCK_SIZE)]
    BlockSize(usize),
    #[cfg(feature = "serde")]
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yml::Error),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

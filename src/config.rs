//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter of a run. All fields have
//! defaults matching the stimulation study the pipeline was built for, and
//! can be overridden from a TOML file:
//!
//! ```toml
//! min_duration = 160.0
//! max_duration = 230.0
//!
//! quantify_variant = { window = 0.5, tie_break = "most_negative" }
//!
//! [[dedup]]
//! window = 0.5
//! tie_break = "first"
//! ```
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dedup::{DedupConfig, TieBreak};
use crate::error::{Error, Result};

/// Configuration for one pipeline run.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use swseg::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     min_duration: 60.0,
///     max_duration: 90.0,
///     ..PipelineConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Shortest accepted stimulation protocol, seconds (inclusive).
    ///
    /// Default: `170.0`.
    pub min_duration: f64,

    /// Longest accepted stimulation protocol, seconds (inclusive).
    ///
    /// Default: `220.0`.
    pub max_duration: f64,

    /// Every deduplication variant to produce.
    ///
    /// Default: `{0.5 s, 1.0 s} × {first, most_negative}`.
    pub dedup: Vec<DedupConfig>,

    /// Variant whose output feeds the quantification step. Need not be in
    /// [`dedup`](Self::dedup).
    ///
    /// Default: `0.5 s / most_negative`.
    pub quantify_variant: DedupConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_duration: 170.0,
            max_duration: 220.0,
            dedup: vec![
                DedupConfig::new(0.5, TieBreak::First),
                DedupConfig::new(0.5, TieBreak::MostNegative),
                DedupConfig::new(1.0, TieBreak::First),
                DedupConfig::new(1.0, TieBreak::MostNegative),
            ],
            quantify_variant: DedupConfig::new(0.5, TieBreak::MostNegative),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(text).context("failed to parse pipeline config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Check bounds and every dedup window.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_duration.is_finite() && self.max_duration.is_finite()) {
            return Err(Error::config("duration bounds must be finite"));
        }
        if self.min_duration <= 0.0 || self.min_duration > self.max_duration {
            return Err(Error::config(format!(
                "expected 0 < min_duration <= max_duration, got {} / {}",
                self.min_duration, self.max_duration
            )));
        }
        for d in self.dedup.iter().chain(std::iter::once(&self.quantify_variant)) {
            d.validate()?;
        }
        Ok(())
    }
}

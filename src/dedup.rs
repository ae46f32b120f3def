//! Temporal deduplication of wave events.
//!
//! Single left-to-right sweep over time-ordered waves. A wave whose start
//! lies more than `window` seconds after the end of the wave that opened the
//! current group starts a new group; otherwise it joins the current one.
//! Each closed group is reduced to one representative according to
//! [`TieBreak`].
//!
//! ```text
//!  opener.end ──┐
//!  ─[==opener==]│<── window ──>│
//!        [=a=]       [=b=]     │   [=c=]      a, b join; c opens a new group
//! ```
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::wave::WaveTiming;

/// How a group of clustered waves is reduced to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the earliest wave of the group.
    First,
    /// Keep the wave with the minimum (most negative) `neg_peak_value`;
    /// the earliest wins on equal values.
    #[serde(alias = "most_negative_peak")]
    MostNegative,
}

impl TieBreak {
    pub fn label(self) -> &'static str {
        match self {
            TieBreak::First => "first",
            TieBreak::MostNegative => "most_negative",
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `(window, tie-break)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Window in seconds.
    pub window: f64,
    pub tie_break: TieBreak,
}

impl DedupConfig {
    pub fn new(window: f64, tie_break: TieBreak) -> Self {
        Self { window, tie_break }
    }

    pub fn window_ms(&self) -> u64 {
        (self.window * 1000.0).round() as u64
    }

    /// Output table name, e.g. `filtered_epochs_500ms_most_negative.csv`.
    pub fn file_name(&self) -> String {
        format!("filtered_epochs_{}ms_{}.csv", self.window_ms(), self.tie_break)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.window.is_finite() || self.window < 0.0 {
            return Err(Error::config(format!(
                "dedup window must be finite and >= 0 (got {})",
                self.window
            )));
        }
        Ok(())
    }
}

impl fmt::Display for DedupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms/{}", self.window_ms(), self.tie_break)
    }
}

fn select<W: WaveTiming>(group: &[W], tie_break: TieBreak) -> usize {
    match tie_break {
        TieBreak::First => 0,
        TieBreak::MostNegative => {
            let mut best = 0;
            for (i, w) in group.iter().enumerate().skip(1) {
                if w.neg_peak_value() < group[best].neg_peak_value() {
                    best = i;
                }
            }
            best
        }
    }
}

/// Collapse waves falling within `cfg.window` of a group opener into one.
///
/// `waves` must be ordered by start time.
///
/// # Errors
///
/// Fails when the window is negative or not finite.
pub fn deduplicate<W: WaveTiming + Clone>(waves: &[W], cfg: DedupConfig) -> Result<Vec<W>> {
    cfg.validate()?;

    let mut out = Vec::new();
    let mut group: Vec<&W> = Vec::new();
    let mut last_end = f64::NEG_INFINITY;

    let flush = |group: &mut Vec<&W>, out: &mut Vec<W>| {
        if group.is_empty() {
            return;
        }
        let idx = select(group, cfg.tie_break);
        debug!(
            "group of {} → kept wave at {:.3}s ({})",
            group.len(),
            group[idx].start(),
            cfg.tie_break
        );
        out.push(group[idx].clone());
        group.clear();
    };

    for w in waves {
        if w.start() > last_end + cfg.window {
            flush(&mut group, &mut out);
            last_end = w.end();
        }
        group.push(w);
    }
    flush(&mut group, &mut out);

    debug!("dedup {cfg}: {} → {} wave(s)", waves.len(), out.len());
    Ok(out)
}

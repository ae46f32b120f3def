//! Per-protocol, per-phase wave counts and amplitude statistics.
//!
//! Amplitude is the peak-to-peak value (`PTP`) of each wave. For each
//! `(protocol, phase)` group: count, mean, max, min and sample standard
//! deviation (`ddof = 1`, `0` for a single wave), each rounded to 2 decimals.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::ClassifiedWave;
use crate::error::{Error, Result};
use crate::region::Region;
use crate::segment::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantification {
    #[serde(rename = "Protocol_Number")]
    pub protocol_id: u32,
    #[serde(rename = "Stage")]
    pub phase: Phase,
    #[serde(rename = "Number_of_Waves")]
    pub count: usize,
    #[serde(rename = "Average_Amplitude")]
    pub mean: f64,
    #[serde(rename = "Max_Amplitude")]
    pub max: f64,
    #[serde(rename = "Min_Amplitude")]
    pub min: f64,
    #[serde(rename = "Std_Amplitude")]
    pub std: f64,
}

/// One row of the cross-recording summary, keyed by
/// `(subject, night, protocol, phase)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummaryRow {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Night")]
    pub night: String,
    #[serde(rename = "Protocol_Number")]
    pub protocol_id: u32,
    #[serde(rename = "Stage")]
    pub phase: Phase,
    #[serde(rename = "Number_of_Waves")]
    pub count: usize,
    #[serde(rename = "Average_Amplitude")]
    pub mean: f64,
    #[serde(rename = "Max_Amplitude")]
    pub max: f64,
    #[serde(rename = "Min_Amplitude")]
    pub min: f64,
    #[serde(rename = "Std_Amplitude")]
    pub std: f64,
}

impl GroupSummaryRow {
    pub fn new(subject: &str, night: &str, q: &Quantification) -> Self {
        Self {
            subject: subject.to_string(),
            night: night.to_string(),
            protocol_id: q.protocol_id,
            phase: q.phase,
            count: q.count,
            mean: q.mean,
            max: q.max,
            min: q.min,
            std: q.std,
        }
    }

    pub fn key(&self) -> (&str, &str, u32, Phase) {
        (&self.subject, &self.night, self.protocol_id, self.phase)
    }
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn stats(protocol_id: u32, phase: Phase, amps: &[f64]) -> Quantification {
    let n = amps.len();
    let mean = amps.iter().sum::<f64>() / n as f64;
    let max = amps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = amps.iter().copied().fold(f64::INFINITY, f64::min);
    let std = if n > 1 {
        let var = amps.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    Quantification {
        protocol_id,
        phase,
        count: n,
        mean: round2(mean),
        max: round2(max),
        min: round2(min),
        std: round2(std),
    }
}

/// Quantify waves per `(protocol, phase)`, ordered by protocol then phase.
///
/// # Errors
///
/// Fails with [`Error::MissingField`] if a wave has no `PTP` value.
pub fn quantify(waves: &[ClassifiedWave]) -> Result<Vec<Quantification>> {
    let mut groups: BTreeMap<(u32, Phase), Vec<f64>> = BTreeMap::new();
    for (index, w) in waves.iter().enumerate() {
        let ptp = w.wave.ptp.ok_or(Error::MissingField { field: "PTP", index })?;
        groups.entry((w.protocol_id, w.phase)).or_default().push(ptp);
    }
    Ok(groups
        .into_iter()
        .map(|((id, phase), amps)| stats(id, phase, &amps))
        .collect())
}

/// [`quantify`] restricted to waves of one region.
pub fn quantify_region(waves: &[ClassifiedWave], region: Region) -> Result<Vec<Quantification>> {
    let subset: Vec<ClassifiedWave> =
        waves.iter().filter(|w| w.region == region).cloned().collect();
    quantify(&subset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_wave_has_zero_std() {
        let q = stats(1, Phase::Pre, &[42.123]);
        assert_eq!(q.count, 1);
        assert_abs_diff_eq!(q.mean, 42.12);
        assert_abs_diff_eq!(q.std, 0.0);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // mean 5, squared deviations sum 32 → var = 32/7.
        let q = stats(2, Phase::Post, &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(q.count, 8);
        assert_abs_diff_eq!(q.mean, 5.0);
        assert_abs_diff_eq!(q.max, 9.0);
        assert_abs_diff_eq!(q.min, 2.0);
        assert_abs_diff_eq!(q.std, round2((32.0_f64 / 7.0).sqrt()));
    }
}

//! Detected wave events.
//!
//! [`WaveEvent`] mirrors one row of the detector's summary table. Only the
//! timing fields, the negative-peak value and the channel are required; the
//! other descriptors are carried through untouched when present.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveEvent {
    #[serde(rename = "Start")]
    pub start: f64,
    #[serde(rename = "NegPeak")]
    pub neg_peak_time: f64,
    #[serde(rename = "MidCrossing", default, deserialize_with = "csv::invalid_option")]
    pub mid_crossing: Option<f64>,
    #[serde(rename = "PosPeak", default, deserialize_with = "csv::invalid_option")]
    pub pos_peak_time: Option<f64>,
    #[serde(rename = "End")]
    pub end: f64,
    #[serde(rename = "Duration", default, deserialize_with = "csv::invalid_option")]
    pub duration: Option<f64>,
    #[serde(rename = "ValNegPeak")]
    pub neg_peak_value: f64,
    #[serde(rename = "ValPosPeak", default, deserialize_with = "csv::invalid_option")]
    pub pos_peak_value: Option<f64>,
    /// Peak-to-peak amplitude.
    #[serde(rename = "PTP", default, deserialize_with = "csv::invalid_option")]
    pub ptp: Option<f64>,
    #[serde(rename = "Slope", default, deserialize_with = "csv::invalid_option")]
    pub slope: Option<f64>,
    #[serde(rename = "Frequency", default, deserialize_with = "csv::invalid_option")]
    pub frequency: Option<f64>,
    #[serde(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "IdxChannel", default, deserialize_with = "csv::invalid_option")]
    pub channel_index: Option<u32>,
}

impl WaveEvent {
    /// A wave with only the required fields set.
    pub fn new(
        start: f64,
        end: f64,
        neg_peak_time: f64,
        neg_peak_value: f64,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            start,
            neg_peak_time,
            mid_crossing: None,
            pos_peak_time: None,
            end,
            duration: None,
            neg_peak_value,
            pos_peak_value: None,
            ptp: None,
            slope: None,
            frequency: None,
            channel: channel.into(),
            channel_index: None,
        }
    }

    pub fn with_ptp(mut self, ptp: f64) -> Self {
        self.ptp = Some(ptp);
        self
    }
}

/// Timing view shared by raw and classified waves.
///
/// The deduplicator only needs these three values, so it is generic over
/// this trait rather than tied to one record type.
pub trait WaveTiming {
    fn start(&self) -> f64;
    fn end(&self) -> f64;
    fn neg_peak_value(&self) -> f64;
}

impl WaveTiming for WaveEvent {
    #[inline]
    fn start(&self) -> f64 {
        self.start
    }
    #[inline]
    fn end(&self) -> f64 {
        self.end
    }
    #[inline]
    fn neg_peak_value(&self) -> f64 {
        self.neg_peak_value
    }
}

impl<T: WaveTiming + ?Sized> WaveTiming for &T {
    #[inline]
    fn start(&self) -> f64 {
        (**self).start()
    }
    #[inline]
    fn end(&self) -> f64 {
        (**self).end()
    }
    #[inline]
    fn neg_peak_value(&self) -> f64 {
        (**self).neg_peak_value()
    }
}

/// Stable sort by start time (NaN-safe).
pub fn sort_by_start<W: WaveTiming>(waves: &mut [W]) {
    waves.sort_by(|a, b| a.start().total_cmp(&b.start()));
}

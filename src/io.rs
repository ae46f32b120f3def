//! Flat-table I/O for every pipeline stage.
//!
//! Readers: annotation markers (`onset,label` CSV) and the detector's wave
//! summary table. Writers: protocol list, rejection log, classified and
//! deduplicated wave tables, quantification, the epoch/overlap dump consumed
//! by plotting, and the cross-recording group summary.
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use crate::annotation::AnnotationEvent;
use crate::classify::ClassifiedWave;
use crate::quantify::{GroupSummaryRow, Quantification};
use crate::segment::Segmentation;
use crate::validate::{Protocol, RejectionRecord};
use crate::wave::WaveEvent;

/// Columns every wave table must have.
pub const REQUIRED_WAVE_COLUMNS: [&str; 5] = ["Start", "End", "NegPeak", "ValNegPeak", "Channel"];

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(f))
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut w = csv::Writer::from_writer(create(path)?);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ── Readers ───────────────────────────────────────────────────────────────────

/// Read annotation markers from CSV.
///
/// Needs an onset column (`onset`) and a label column (`label` or
/// `description`); header matching is case-insensitive and other columns
/// are ignored.
pub fn read_annotations_from<R: Read>(rdr: R) -> Result<Vec<AnnotationEvent>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = rdr.headers().context("reading annotation header")?.clone();
    let onset_col = find_column(&headers, &["onset"]).context("missing 'onset' column")?;
    let label_col =
        find_column(&headers, &["label", "description"]).context("missing 'label' column")?;

    let mut events = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("annotation row {i}"))?;
        let onset: f64 = rec
            .get(onset_col)
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("annotation row {i}: bad onset"))?;
        let label = rec.get(label_col).unwrap_or_default();
        events.push(AnnotationEvent::from_label(onset, label));
    }
    Ok(events)
}

pub fn read_annotations(path: &Path) -> Result<Vec<AnnotationEvent>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_annotations_from(f).with_context(|| format!("in {}", path.display()))
}

/// Read the detector's wave summary table.
///
/// Fails fast when any of [`REQUIRED_WAVE_COLUMNS`] is missing.
pub fn read_waves_from<R: Read>(rdr: R) -> Result<Vec<WaveEvent>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = rdr.headers().context("reading wave table header")?.clone();
    let missing: Vec<&str> = REQUIRED_WAVE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        bail!("wave table is missing required column(s): {}", missing.join(", "));
    }

    rdr.deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("wave row {i}")))
        .collect()
}

pub fn read_waves(path: &Path) -> Result<Vec<WaveEvent>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_waves_from(f).with_context(|| format!("in {}", path.display()))
}

// ── Writers ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProtocolRow {
    #[serde(rename = "Protocol Number")]
    id: u32,
    #[serde(rename = "Stim Start")]
    start: f64,
    #[serde(rename = "Stim End")]
    end: f64,
    #[serde(rename = "Duration")]
    duration: f64,
}

pub fn write_protocols(path: &Path, protocols: &[Protocol]) -> Result<()> {
    write_rows(
        path,
        protocols.iter().map(|p| ProtocolRow {
            id: p.id,
            start: p.start,
            end: p.end,
            duration: p.duration(),
        }),
    )
}

#[derive(Serialize)]
struct RejectionRow<'a> {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Onset")]
    onset: f64,
    #[serde(rename = "Description")]
    label: &'a str,
    #[serde(rename = "Reason")]
    reason: String,
}

pub fn write_rejections(path: &Path, rejected: &[RejectionRecord]) -> Result<()> {
    write_rows(
        path,
        rejected.iter().map(|r| RejectionRow {
            index: r.index,
            onset: r.onset,
            label: r.kind.label(),
            reason: r.reason.to_string(),
        }),
    )
}

/// Detector columns plus the four classification columns.
#[derive(Serialize)]
struct ClassifiedRow<'a> {
    #[serde(rename = "Start")]
    start: f64,
    #[serde(rename = "NegPeak")]
    neg_peak_time: f64,
    #[serde(rename = "MidCrossing")]
    mid_crossing: Option<f64>,
    #[serde(rename = "PosPeak")]
    pos_peak_time: Option<f64>,
    #[serde(rename = "End")]
    end: f64,
    #[serde(rename = "Duration")]
    duration: Option<f64>,
    #[serde(rename = "ValNegPeak")]
    neg_peak_value: f64,
    #[serde(rename = "ValPosPeak")]
    pos_peak_value: Option<f64>,
    #[serde(rename = "PTP")]
    ptp: Option<f64>,
    #[serde(rename = "Slope")]
    slope: Option<f64>,
    #[serde(rename = "Frequency")]
    frequency: Option<f64>,
    #[serde(rename = "Channel")]
    channel: &'a str,
    #[serde(rename = "IdxChannel")]
    channel_index: Option<u32>,
    #[serde(rename = "Classification")]
    phase: &'static str,
    #[serde(rename = "Protocol Number")]
    protocol_id: u32,
    #[serde(rename = "Region_Classification")]
    region: &'static str,
    #[serde(rename = "Slow_Wave_Name")]
    name: &'a str,
}

impl<'a> From<&'a ClassifiedWave> for ClassifiedRow<'a> {
    fn from(c: &'a ClassifiedWave) -> Self {
        let w = &c.wave;
        Self {
            start: w.start,
            neg_peak_time: w.neg_peak_time,
            mid_crossing: w.mid_crossing,
            pos_peak_time: w.pos_peak_time,
            end: w.end,
            duration: w.duration,
            neg_peak_value: w.neg_peak_value,
            pos_peak_value: w.pos_peak_value,
            ptp: w.ptp,
            slope: w.slope,
            frequency: w.frequency,
            channel: &w.channel,
            channel_index: w.channel_index,
            phase: c.phase.label(),
            protocol_id: c.protocol_id,
            region: c.region.label(),
            name: &c.name,
        }
    }
}

/// Write a classified (or deduplicated) wave table.
pub fn write_classified(path: &Path, waves: &[ClassifiedWave]) -> Result<()> {
    write_rows(path, waves.iter().map(ClassifiedRow::from))
}

pub fn write_quantification(path: &Path, rows: &[Quantification]) -> Result<()> {
    write_rows(path, rows)
}

/// Dump adjusted and nominal epochs plus overlaps as pretty JSON.
pub fn write_segmentation_json(path: &Path, segmentation: &Segmentation) -> Result<()> {
    let w = create(path)?;
    serde_json::to_writer_pretty(w, segmentation)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_quantification(path: &Path) -> Result<Vec<Quantification>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    rdr.deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("{} row {i}", path.display())))
        .collect()
}

pub fn read_group_summary(path: &Path) -> Result<Vec<GroupSummaryRow>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    rdr.deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("{} row {i}", path.display())))
        .collect()
}

/// Merge `rows` into the group summary at `path`, creating it if needed.
///
/// Existing rows with the same `(subject, night, protocol, phase)` key are
/// replaced, so re-running a recording does not duplicate it. Returns the
/// number of rows in the file afterwards.
pub fn append_group_summary(path: &Path, rows: &[GroupSummaryRow]) -> Result<usize> {
    let mut all = if path.exists() { read_group_summary(path)? } else { Vec::new() };
    all.retain(|old| !rows.iter().any(|new| new.key() == old.key()));
    all.extend(rows.iter().cloned());
    write_rows(path, &all)?;
    Ok(all.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;

    #[test]
    fn annotations_accept_description_header() {
        let csv = "Onset,Duration,Description\n100.0,0,stim start\n280.5,0,Stim End\n300,0,Arousal\n";
        let ev = read_annotations_from(csv.as_bytes()).unwrap();
        assert_eq!(ev.len(), 3);
        assert_eq!(ev[0].kind, AnnotationKind::ProtocolStart);
        assert_eq!(ev[1].kind, AnnotationKind::ProtocolEnd);
        assert_eq!(ev[1].onset, 280.5);
        assert_eq!(ev[2].kind, AnnotationKind::Other("Arousal".into()));
    }

    #[test]
    fn annotations_need_onset() {
        let err = read_annotations_from("time,label\n1,stim start\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("onset"), "{err}");
    }

    #[test]
    fn waves_with_optional_columns() {
        let csv = "Start,NegPeak,End,ValNegPeak,PTP,Channel\n\
                   1.0,1.2,1.8,-75.5,120.0,E032\n\
                   2.0,2.3,2.9,-60.0,,E084\n";
        let waves = read_waves_from(csv.as_bytes()).unwrap();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].ptp, Some(120.0));
        assert_eq!(waves[1].ptp, None);
        assert_eq!(waves[1].channel, "E084");
        assert_eq!(waves[0].slope, None);
    }

    #[test]
    fn waves_missing_required_columns_fail_fast() {
        let err = read_waves_from("Start,End,Channel\n1,2,E1\n".as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NegPeak") && msg.contains("ValNegPeak"), "{msg}");
    }
}

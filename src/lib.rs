//! # swseg — stimulation-protocol segmentation and slow-wave classification
//!
//! `swseg` takes the annotation markers of an overnight EEG recording with
//! closed-loop stimulation, plus the slow waves a detector found in it, and
//! answers: *which waves happened before, during and after each stimulation
//! protocol, and over which scalp region?*
//!
//! ## Pipeline overview
//!
//! ```text
//! annotations.csv            slow_waves.csv         net_segmentation.json
//!   │                             │                        │
//!   ├─ validate::validate()       │                        │
//!   │    stim start/end pairs → Protocols (+ rejection log)│
//!   ├─ segment::segment()         │                        │
//!   │    Pre / During / Post epochs, overlaps split evenly │
//!   │                             │                        │
//!   └────────────┬────────────────┴────────────────────────┘
//!                ├─ classify::classify()   phase + region + proto{n}_{phase}_sw{k}
//!                ├─ dedup::deduplicate()   one table per (window, tie-break)
//!                └─ quantify::quantify()   PTP stats per (protocol, phase)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use swseg::{io, run, PipelineConfig, RegionMap};
//!
//! let events  = io::read_annotations(Path::new("annotations.csv")).unwrap();
//! let waves   = io::read_waves(Path::new("slow_waves.csv")).unwrap();
//! let regions = RegionMap::from_json_file(Path::new("net_segmentation.json")).unwrap();
//!
//! let out = run(&events, waves, &regions, &PipelineConfig::default()).unwrap();
//! for v in &out.variants {
//!     println!("{}: {} wave(s)", v.config, v.waves.len());
//! }
//! ```
//!
//! ## Running individual stages
//!
//! ```
//! use swseg::{classify, segment, validate, AnnotationEvent, RegionMap, WaveEvent};
//!
//! let events = [AnnotationEvent::start(100.0), AnnotationEvent::end(280.0)];
//! let v = validate(&events, 170.0, 220.0).unwrap();
//! let s = segment(&v.protocols);
//! assert_eq!((s.epochs[0].pre.start, s.epochs[0].post.end), (-80.0, 460.0));
//!
//! let waves = [WaveEvent::new(150.0, 151.0, 150.4, -80.0, "E32")];
//! let c = classify(&waves, &s, &RegionMap::default());
//! assert_eq!(c.waves[0].name, "proto1_stim_sw1");
//! ```

pub mod annotation;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod io;
pub mod quantify;
pub mod region;
pub mod report;
pub mod segment;
pub mod validate;
pub mod wave;

use log::info;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `swseg::Foo` without having to know the internal module layout.

// annotation
pub use annotation::{AnnotationEvent, AnnotationKind, STIM_END, STIM_START};

// classify
pub use classify::{classify, classify_time, wave_name, Classification, ClassifiedWave};

// config
pub use config::PipelineConfig;

// dedup
pub use dedup::{deduplicate, DedupConfig, TieBreak};

// error
pub use error::{Error, Result};

// quantify
pub use quantify::{quantify, quantify_region, GroupSummaryRow, Quantification};

// region
pub use region::{Region, RegionMap};

// segment
pub use segment::{segment, Epoch, EpochTriple, OverlapRecord, Phase, Segmentation};

// validate
pub use validate::{validate, Protocol, RejectReason, RejectionRecord, Validation};

// wave
pub use wave::{sort_by_start, WaveEvent, WaveTiming};

/// One deduplicated wave table.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupVariant {
    pub config: DedupConfig,
    pub waves: Vec<ClassifiedWave>,
}

/// Everything one [`run`] produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub validation: Validation,
    pub segmentation: Segmentation,
    pub classification: Classification,
    /// One entry per [`PipelineConfig::dedup`] item, same order.
    pub variants: Vec<DedupVariant>,
    /// Statistics over the [`PipelineConfig::quantify_variant`] table.
    pub quantification: Vec<Quantification>,
    /// The table `quantification` was computed from.
    pub quantified_waves: Vec<ClassifiedWave>,
}

/// Run the **full segmentation pipeline** on one recording.
///
/// # Pipeline steps
///
/// 1. Check `cfg` ([`PipelineConfig::validate`]).
/// 2. Pair markers into protocols ([`validate()`]).
/// 3. Build adjusted epochs ([`segment()`]).
/// 4. Stable-sort `waves` by start and classify them ([`classify()`]).
/// 5. Deduplicate the start-ordered classified waves once per
///    [`PipelineConfig::dedup`] entry and once for
///    [`PipelineConfig::quantify_variant`].
/// 6. Quantify the latter ([`quantify()`]).
///
/// # Errors
///
/// Returns an error if:
/// * `cfg` is invalid.
/// * `events` is empty or holds a non-finite onset.
/// * `regions` maps no channel.
/// * a wave kept by the quantified variant has no `PTP` value.
///
/// # Examples
///
/// ```
/// use swseg::{run, AnnotationEvent, PipelineConfig, RegionMap, WaveEvent};
///
/// let events = [AnnotationEvent::start(100.0), AnnotationEvent::end(280.0)];
/// let waves = vec![
///     WaveEvent::new(150.0, 151.0, 150.4, -80.0, "E32").with_ptp(120.0),
///     WaveEvent::new(151.2, 152.0, 151.5, -95.0, "E32").with_ptp(140.0),
/// ];
/// let regions = RegionMap::from_groups([("Left Frontal", ["E32"])]);
///
/// let out = run(&events, waves, &regions, &PipelineConfig::default()).unwrap();
/// assert_eq!(out.classification.waves.len(), 2);
/// assert_eq!(out.quantification[0].count, 1);
/// assert_eq!(out.quantification[0].max, 140.0);
/// ```
pub fn run(
    events: &[AnnotationEvent],
    mut waves: Vec<WaveEvent>,
    regions: &RegionMap,
    cfg: &PipelineConfig,
) -> Result<RunOutput> {
    cfg.validate()?;
    if regions.is_empty() {
        return Err(Error::EmptyInput { what: "region map" });
    }

    let validation = validate(events, cfg.min_duration, cfg.max_duration)?;
    let segmentation = segment(&validation.protocols);

    sort_by_start(&mut waves);
    let classification = classify(&waves, &segmentation, regions);

    let mut by_start = classification.waves.clone();
    sort_by_start(&mut by_start);

    let variants = cfg
        .dedup
        .iter()
        .map(|&config| {
            let waves = deduplicate(&by_start, config)?;
            info!("dedup {config}: kept {} of {} wave(s)", waves.len(), by_start.len());
            Ok(DedupVariant { config, waves })
        })
        .collect::<Result<Vec<_>>>()?;

    let quantified_waves = match variants.iter().find(|v| v.config == cfg.quantify_variant) {
        Some(v) => v.waves.clone(),
        None => deduplicate(&by_start, cfg.quantify_variant)?,
    };
    let quantification = quantify(&quantified_waves)?;

    Ok(RunOutput {
        validation,
        segmentation,
        classification,
        variants,
        quantification,
        quantified_waves,
    })
}

//! Wave classification by time phase and scalp region.
//!
//! Time: the wave's `start` is tested against every `Pre` epoch (protocol
//! id ascending), then every `During`, then every `Post`; the first closed
//! interval `[start, end]` that contains it wins. Region: channel lookup in
//! the [`RegionMap`]. Waves outside every epoch are dropped and counted.
//!
//! Surviving waves are named `proto{id}_{phase}_sw{n}` where `n` is the
//! wave's 1-based rank inside its `(protocol, phase)` group in input order,
//! and returned ordered by `(protocol, phase, name)`. Names compare as
//! strings, so `sw10` sorts before `sw2`.
use log::{debug, info};
use std::collections::HashMap;

use crate::region::{Region, RegionMap};
use crate::segment::{Phase, Segmentation};
use crate::wave::{WaveEvent, WaveTiming};

/// A wave tagged with its protocol, phase and region.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedWave {
    pub wave: WaveEvent,
    pub protocol_id: u32,
    pub phase: Phase,
    pub region: Region,
    /// 1-based rank within the `(protocol, phase)` group.
    pub rank: u32,
    /// `proto{id}_{phase}_sw{rank}`.
    pub name: String,
}

impl WaveTiming for ClassifiedWave {
    #[inline]
    fn start(&self) -> f64 {
        self.wave.start
    }
    #[inline]
    fn end(&self) -> f64 {
        self.wave.end
    }
    #[inline]
    fn neg_peak_value(&self) -> f64 {
        self.wave.neg_peak_value
    }
}

/// Output of [`classify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub waves: Vec<ClassifiedWave>,
    /// Waves whose start lies outside every epoch.
    pub dropped: usize,
}

impl Classification {
    /// Number of waves per `(protocol, phase)`.
    pub fn counts(&self) -> Vec<((u32, Phase), usize)> {
        let mut out: Vec<((u32, Phase), usize)> = Vec::new();
        for w in &self.waves {
            let key = (w.protocol_id, w.phase);
            if let Some((k, n)) = out.last_mut() {
                if *k == key {
                    *n += 1;
                    continue;
                }
            }
            out.push((key, 1));
        }
        out
    }
}

/// Find the `(protocol id, phase)` whose epoch contains `t`.
///
/// Returns `None` for the unknown phase.
pub fn classify_time(t: f64, segmentation: &Segmentation) -> Option<(u32, Phase)> {
    Phase::ALL.iter().find_map(|&phase| {
        segmentation
            .epochs
            .iter()
            .map(|triple| triple.get(phase))
            .find(|epoch| epoch.contains(t))
            .map(|epoch| (epoch.protocol_id, phase))
    })
}

pub fn wave_name(protocol_id: u32, phase: Phase, rank: u32) -> String {
    format!("proto{protocol_id}_{phase}_sw{rank}")
}

/// Tag every wave with protocol, phase and region; drop unknown-phase waves.
pub fn classify(
    waves: &[WaveEvent],
    segmentation: &Segmentation,
    regions: &RegionMap,
) -> Classification {
    let mut ranks: HashMap<(u32, Phase), u32> = HashMap::new();
    let mut out = Classification::default();

    for wave in waves {
        let region = regions.classify(&wave.channel);
        let Some((protocol_id, phase)) = classify_time(wave.start, segmentation) else {
            debug!("wave at {:.3}s on {} is outside every epoch", wave.start, wave.channel);
            out.dropped += 1;
            continue;
        };
        let rank = ranks.entry((protocol_id, phase)).or_insert(0);
        *rank += 1;
        out.waves.push(ClassifiedWave {
            wave: wave.clone(),
            protocol_id,
            phase,
            region,
            rank: *rank,
            name: wave_name(protocol_id, phase, *rank),
        });
    }

    out.waves
        .sort_by(|a, b| (a.protocol_id, a.phase, &a.name).cmp(&(b.protocol_id, b.phase, &b.name)));

    info!(
        "classified {} wave(s), dropped {} outside all epochs",
        out.waves.len(),
        out.dropped
    );
    out
}

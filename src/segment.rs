//! Epoch segmentation: protocols → (Pre, During, Post) windows.
//!
//! For a protocol `[start, end)` of duration `d`:
//!
//! ```text
//!        Pre              During              Post
//!  [start − d, start) [start, end)      [end, end + d)
//! ```
//!
//! When protocol *i*'s nominal `Pre` starts before protocol *i − 1*'s `Post`
//! ends, the overlap is split evenly: the previous `Post.end` moves back by
//! half and the current `Pre.start` moves forward by half, so both meet at
//! the midpoint. Each correction only touches the two adjacent protocols; it
//! never cascades further back.
//!
//! The pass is a fold whose accumulator holds the previous protocol's triple
//! until the next protocol has been resolved against it, so an already
//! emitted epoch is never revisited.
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validate::Protocol;

/// Time phase of an epoch relative to its stimulation protocol.
///
/// Variant order is the output order (`Pre < During < Post`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "pre-stim")]
    Pre,
    #[serde(rename = "stim")]
    During,
    #[serde(rename = "post-stim")]
    Post,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Pre, Phase::During, Phase::Post];

    /// Label used in wave names and output tables.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Pre => "pre-stim",
            Phase::During => "stim",
            Phase::Post => "post-stim",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Epoch {
    pub start: f64,
    pub end: f64,
    pub protocol_id: u32,
    pub phase: Phase,
}

impl Epoch {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Closed-interval containment, `start <= t <= end`.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// The three epochs owned by one protocol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochTriple {
    pub pre: Epoch,
    pub during: Epoch,
    pub post: Epoch,
}

impl EpochTriple {
    /// Un-adjusted windows for `protocol`.
    pub fn nominal(protocol: &Protocol) -> Self {
        let d = protocol.duration();
        let epoch = |start, end, phase| Epoch { start, end, protocol_id: protocol.id, phase };
        Self {
            pre: epoch(protocol.start - d, protocol.start, Phase::Pre),
            during: epoch(protocol.start, protocol.end, Phase::During),
            post: epoch(protocol.end, protocol.end + d, Phase::Post),
        }
    }

    #[inline]
    pub fn protocol_id(&self) -> u32 {
        self.during.protocol_id
    }

    pub fn get(&self, phase: Phase) -> &Epoch {
        match phase {
            Phase::Pre => &self.pre,
            Phase::During => &self.during,
            Phase::Post => &self.post,
        }
    }

    /// Epochs in `(Pre, During, Post)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Epoch> {
        [&self.pre, &self.during, &self.post].into_iter()
    }
}

/// One resolved overlap between adjacent protocols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapRecord {
    /// `(previous id, current id)`.
    pub protocols: (u32, u32),
    /// Length of the overlap before adjustment, seconds.
    pub amount: f64,
    /// Overlapping region before adjustment.
    pub overlap_start: f64,
    pub overlap_end: f64,
    /// Adjusted previous `Post.end`.
    pub prev_post_end: f64,
    /// Adjusted current `Pre.start`.
    pub pre_start: f64,
}

/// Output of [`segment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segmentation {
    /// Adjusted epochs, one triple per protocol in id order.
    pub epochs: Vec<EpochTriple>,
    /// Windows before overlap resolution, same order.
    pub nominal: Vec<EpochTriple>,
    pub overlaps: Vec<OverlapRecord>,
}

impl Segmentation {
    /// All adjusted epochs flattened in `(protocol, Pre, During, Post)` order.
    pub fn iter_epochs(&self) -> impl Iterator<Item = &Epoch> {
        self.epochs.iter().flat_map(EpochTriple::iter)
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }
}

// ── Fold ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Acc {
    done: Vec<EpochTriple>,
    overlaps: Vec<OverlapRecord>,
    /// Previous triple, held back until the next protocol is resolved.
    pending: Option<EpochTriple>,
}

/// Resolve `current` against `prev`, returning the adjusted pair.
fn resolve(
    mut prev: EpochTriple,
    mut current: EpochTriple,
) -> (EpochTriple, EpochTriple, Option<OverlapRecord>) {
    let overlap = prev.post.end - current.pre.start;
    if overlap <= 0.0 {
        debug!("no overlap before protocol {}", current.protocol_id());
        return (prev, current, None);
    }

    let half = overlap / 2.0;
    let overlap_start = current.pre.start;

    let mut prev_end = prev.post.end - half;
    if prev_end < prev.post.start {
        warn!(
            "post-stim epoch of protocol {} would have negative duration; clamping to its start",
            prev.protocol_id()
        );
        prev_end = prev.post.start;
    }
    let mut pre_start = current.pre.start + half;
    if pre_start > current.pre.end {
        warn!(
            "pre-stim epoch of protocol {} would have negative duration; clamping to its end",
            current.protocol_id()
        );
        pre_start = current.pre.end;
    }
    prev.post.end = prev_end;
    current.pre.start = pre_start;

    info!(
        "overlap of {overlap:.2}s between protocols {} and {}: post-stim end → {prev_end:.2}s, pre-stim start → {pre_start:.2}s",
        prev.protocol_id(),
        current.protocol_id()
    );
    let record = OverlapRecord {
        protocols: (prev.protocol_id(), current.protocol_id()),
        amount: overlap,
        overlap_start,
        overlap_end: overlap_start + overlap,
        prev_post_end: prev_end,
        pre_start,
    };
    (prev, current, Some(record))
}

fn step(mut acc: Acc, protocol: &Protocol) -> Acc {
    let current = EpochTriple::nominal(protocol);
    let current = match acc.pending.take() {
        None => current,
        Some(prev) => {
            let (prev, current, record) = resolve(prev, current);
            acc.done.push(prev);
            acc.overlaps.extend(record);
            current
        }
    };
    acc.pending = Some(current);
    acc
}

/// Derive adjusted `(Pre, During, Post)` epochs for each protocol.
///
/// `protocols` must be in ascending id order (as returned by
/// [`validate`](crate::validate::validate)). The first protocol has no
/// predecessor and keeps its nominal windows, even when its `Pre` starts
/// before t = 0.
pub fn segment(protocols: &[Protocol]) -> Segmentation {
    let acc = protocols.iter().fold(Acc::default(), step);
    let mut epochs = acc.done;
    epochs.extend(acc.pending);

    info!(
        "segmented {} protocol(s), resolved {} overlap(s)",
        epochs.len(),
        acc.overlaps.len()
    );
    Segmentation {
        epochs,
        nominal: protocols.iter().map(EpochTriple::nominal).collect(),
        overlaps: acc.overlaps,
    }
}

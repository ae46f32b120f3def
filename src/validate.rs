//! Event validation: marker stream → stimulation protocols.
//!
//! A two-state automaton pairs `stim start` / `stim end` markers:
//!
//! ```text
//!                 start (buffer)
//!   ExpectingStart ───────────────▶ ExpectingEnd ──┐ start: reject, keep buffer
//!        ▲  │ end: reject                  │  ◀────┘
//!        │  └──┘                           │ end: accept or reject pair
//!        └─────────────────────────────────┘
//! ```
//!
//! `Other` markers are rejected in either state without changing it. Accepted
//! pairs get sequential ids starting at 1. A start still buffered when the
//! input runs out is rejected as unpaired.
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;

use crate::annotation::{AnnotationEvent, AnnotationKind};
use crate::error::{Error, Result};

/// One validated stimulation period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Protocol {
    /// 1-based, assigned in onset order among accepted pairs.
    pub id: u32,
    pub start: f64,
    pub end: f64,
}

impl Protocol {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The marker pair this protocol was built from.
    pub fn to_events(&self) -> [AnnotationEvent; 2] {
        [AnnotationEvent::start(self.start), AnnotationEvent::end(self.end)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// Marker arrived in a state that does not accept it.
    UnexpectedEvent,
    /// Start/end pair whose duration is outside the configured bounds.
    InvalidDuration { duration: f64 },
    /// Start marker still waiting for its end when the input ran out.
    UnpairedStart,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnexpectedEvent => f.write_str("unexpected event"),
            RejectReason::InvalidDuration { duration } => {
                write!(f, "invalid duration ({duration:.2}s)")
            }
            RejectReason::UnpairedStart => f.write_str("unpaired start"),
        }
    }
}

/// A marker the validator did not turn into (part of) a protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionRecord {
    /// Position of the marker in the caller's input.
    pub index: usize,
    pub onset: f64,
    pub kind: AnnotationKind,
    pub reason: RejectReason,
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub protocols: Vec<Protocol>,
    pub rejected: Vec<RejectionRecord>,
}

// ── State machine ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    ExpectingStart,
    /// Buffered start marker: (input index, onset).
    ExpectingEnd { start_index: usize, start_onset: f64 },
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    None,
    Reject(RejectReason),
    /// Close the buffered pair; the caller checks the duration.
    ClosePair { start_index: usize, start_onset: f64 },
}

fn transition(state: State, index: usize, event: &AnnotationEvent) -> (State, Action) {
    use AnnotationKind::*;
    match (state, &event.kind) {
        (s, Other(_)) => (s, Action::Reject(RejectReason::UnexpectedEvent)),
        (State::ExpectingStart, ProtocolStart) => (
            State::ExpectingEnd { start_index: index, start_onset: event.onset },
            Action::None,
        ),
        (State::ExpectingStart, ProtocolEnd) => {
            (State::ExpectingStart, Action::Reject(RejectReason::UnexpectedEvent))
        }
        (s @ State::ExpectingEnd { .. }, ProtocolStart) => {
            (s, Action::Reject(RejectReason::UnexpectedEvent))
        }
        (State::ExpectingEnd { start_index, start_onset }, ProtocolEnd) => (
            State::ExpectingStart,
            Action::ClosePair { start_index, start_onset },
        ),
    }
}

fn check_bounds(min_duration: f64, max_duration: f64) -> Result<()> {
    if !min_duration.is_finite() || !max_duration.is_finite() {
        return Err(Error::config("duration bounds must be finite"));
    }
    if min_duration <= 0.0 {
        return Err(Error::config(format!("min_duration must be > 0 (got {min_duration})")));
    }
    if min_duration > max_duration {
        return Err(Error::config(format!(
            "min_duration {min_duration} exceeds max_duration {max_duration}"
        )));
    }
    Ok(())
}

/// Pair protocol start/end markers into [`Protocol`]s.
///
/// `events` is stable-sorted by onset before scanning, so callers may pass
/// markers in file order. Every input marker ends up either inside an
/// accepted protocol or in [`Validation::rejected`].
///
/// # Errors
///
/// Fails on an empty event list, a non-finite onset, or invalid bounds
/// (`min_duration` must be positive and not exceed `max_duration`).
pub fn validate(
    events: &[AnnotationEvent],
    min_duration: f64,
    max_duration: f64,
) -> Result<Validation> {
    check_bounds(min_duration, max_duration)?;
    if events.is_empty() {
        return Err(Error::EmptyInput { what: "annotation events" });
    }
    if let Some(index) = events.iter().position(|e| !e.onset.is_finite()) {
        return Err(Error::NonFinite { field: "onset", index });
    }

    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by(|&a, &b| events[a].onset.total_cmp(&events[b].onset));

    let mut out = Validation::default();
    let mut state = State::ExpectingStart;
    let reject = |out: &mut Validation, index: usize, reason: RejectReason| {
        let ev = &events[index];
        warn!("rejected '{}' at {:.2}s: {reason}", ev.kind, ev.onset);
        out.rejected.push(RejectionRecord {
            index,
            onset: ev.onset,
            kind: ev.kind.clone(),
            reason,
        });
    };

    for &index in &order {
        let event = &events[index];
        let (next, action) = transition(state, index, event);
        debug!("{:?} + '{}' @ {:.2}s → {:?}", state, event.kind, event.onset, next);
        state = next;

        match action {
            Action::None => {}
            Action::Reject(reason) => reject(&mut out, index, reason),
            Action::ClosePair { start_index, start_onset } => {
                let duration = event.onset - start_onset;
                if (min_duration..=max_duration).contains(&duration) {
                    let id = out.protocols.len() as u32 + 1;
                    debug!("protocol {id}: {start_onset:.2}s – {:.2}s ({duration:.2}s)", event.onset);
                    out.protocols.push(Protocol { id, start: start_onset, end: event.onset });
                } else {
                    let reason = RejectReason::InvalidDuration { duration };
                    reject(&mut out, start_index, reason);
                    reject(&mut out, index, reason);
                }
            }
        }
    }

    if let State::ExpectingEnd { start_index, .. } = state {
        reject(&mut out, start_index, RejectReason::UnpairedStart);
    }

    info!(
        "validated {} protocol(s), rejected {} marker(s)",
        out.protocols.len(),
        out.rejected.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn other(onset: f64) -> AnnotationEvent {
        AnnotationEvent::from_label(onset, "Arousal")
    }

    #[test]
    fn transition_table_is_exhaustive() {
        let start = AnnotationEvent::start(1.0);
        let end = AnnotationEvent::end(2.0);
        let waiting = State::ExpectingEnd { start_index: 0, start_onset: 1.0 };

        assert_eq!(
            transition(State::ExpectingStart, 0, &start),
            (waiting, Action::None)
        );
        assert_eq!(
            transition(State::ExpectingStart, 1, &end),
            (State::ExpectingStart, Action::Reject(RejectReason::UnexpectedEvent))
        );
        assert_eq!(
            transition(waiting, 1, &start),
            (waiting, Action::Reject(RejectReason::UnexpectedEvent))
        );
        assert_eq!(
            transition(waiting, 1, &end),
            (State::ExpectingStart, Action::ClosePair { start_index: 0, start_onset: 1.0 })
        );
        assert_eq!(
            transition(waiting, 1, &other(1.5)),
            (waiting, Action::Reject(RejectReason::UnexpectedEvent))
        );
    }

    #[test]
    fn bounds_are_checked() {
        let ev = [AnnotationEvent::start(0.0)];
        assert!(matches!(validate(&ev, 0.0, 10.0), Err(Error::InvalidConfig { .. })));
        assert!(matches!(validate(&ev, 20.0, 10.0), Err(Error::InvalidConfig { .. })));
        assert!(matches!(validate(&ev, 1.0, f64::NAN), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn empty_input_fails_fast() {
        assert_eq!(
            validate(&[], 170.0, 220.0),
            Err(Error::EmptyInput { what: "annotation events" })
        );
    }

    #[test]
    fn non_finite_onset_fails_fast() {
        let ev = [AnnotationEvent::start(0.0), AnnotationEvent::end(f64::NAN)];
        assert_eq!(
            validate(&ev, 170.0, 220.0),
            Err(Error::NonFinite { field: "onset", index: 1 })
        );
    }

    #[test]
    fn unpaired_trailing_start_is_rejected() {
        let ev = [
            AnnotationEvent::start(0.0),
            AnnotationEvent::end(180.0),
            AnnotationEvent::start(500.0),
        ];
        let v = validate(&ev, 170.0, 220.0).unwrap();
        assert_eq!(v.protocols.len(), 1);
        assert_eq!(v.rejected.len(), 1);
        assert_eq!(v.rejected[0].index, 2);
        assert_eq!(v.rejected[0].reason, RejectReason::UnpairedStart);
    }

    #[test]
    fn reason_display() {
        assert_eq!(RejectReason::UnexpectedEvent.to_string(), "unexpected event");
        assert_eq!(
            RejectReason::InvalidDuration { duration: 12.345 }.to_string(),
            "invalid duration (12.35s)"
        );
    }
}

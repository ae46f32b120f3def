mod common;
use approx::assert_abs_diff_eq;
use common::protocol;
use proptest::prelude::*;
use swseg::{segment, Phase, Protocol};

#[test]
fn no_overlap_keeps_nominal_windows() {
    let s = segment(&[protocol(1, 100.0, 280.0), protocol(2, 640.0, 820.0)]);
    let (p1, p2) = (&s.epochs[0], &s.epochs[1]);
    assert_eq!((p1.pre.start, p1.pre.end), (-80.0, 100.0));
    assert_eq!((p1.during.start, p1.during.end), (100.0, 280.0));
    assert_eq!((p1.post.start, p1.post.end), (280.0, 460.0));
    assert_eq!((p2.pre.start, p2.pre.end), (460.0, 640.0));
    assert!(s.overlaps.is_empty());
    assert_eq!(s.epochs, s.nominal);
}

#[test]
fn overlap_of_ten_meets_at_455() {
    let s = segment(&[protocol(1, 100.0, 280.0), protocol(2, 630.0, 810.0)]);
    assert_abs_diff_eq!(s.epochs[0].post.end, 455.0);
    assert_abs_diff_eq!(s.epochs[1].pre.start, 455.0);
    // Nominal windows are kept alongside.
    assert_abs_diff_eq!(s.nominal[0].post.end, 460.0);
    assert_abs_diff_eq!(s.nominal[1].pre.start, 450.0);
}

#[test]
fn correction_is_pairwise_only() {
    // A 10 s protocol squeezed between two long ones: after both pairwise
    // corrections, protocol 3's Pre still reaches back into protocol 1's Post.
    let s = segment(&[
        protocol(1, 0.0, 200.0),
        protocol(2, 200.0, 210.0),
        protocol(3, 220.0, 420.0),
    ]);
    assert_eq!(s.overlaps.len(), 2);
    assert_eq!(s.overlaps[0].protocols, (1, 2));
    assert_eq!(s.overlaps[1].protocols, (2, 3));
    assert_abs_diff_eq!(s.epochs[0].post.end, 295.0);
    assert_abs_diff_eq!(s.epochs[1].pre.start, 200.0); // clamped to zero length
    assert_abs_diff_eq!(s.epochs[1].post.end, 210.0); // clamped to zero length
    assert_abs_diff_eq!(s.epochs[2].pre.start, 120.0);
    assert!(s.epochs[2].pre.start < s.epochs[0].post.end);
}

#[test]
fn epochs_flatten_in_protocol_then_phase_order() {
    let s = segment(&[protocol(1, 100.0, 280.0), protocol(2, 640.0, 820.0)]);
    let order: Vec<(u32, Phase)> = s.iter_epochs().map(|e| (e.protocol_id, e.phase)).collect();
    assert_eq!(
        order,
        vec![
            (1, Phase::Pre),
            (1, Phase::During),
            (1, Phase::Post),
            (2, Phase::Pre),
            (2, Phase::During),
            (2, Phase::Post),
        ]
    );
}

#[test]
fn epochs_json_names_phases() {
    let s = segment(&[protocol(1, 100.0, 280.0)]);
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["epochs"][0]["pre"]["phase"], "pre-stim");
    assert_eq!(json["epochs"][0]["post"]["end"], 460.0);
}

/// Back-to-back protocols with non-negative gaps, as the validator emits.
fn arb_protocols() -> impl Strategy<Value = Vec<Protocol>> {
    prop::collection::vec((1.0f64..400.0, 0.0f64..600.0), 0..12).prop_map(|v| {
        let mut t = 0.0;
        v.into_iter()
            .enumerate()
            .map(|(i, (dur, gap))| {
                let p = Protocol { id: i as u32 + 1, start: t + gap, end: t + gap + dur };
                t = p.end;
                p
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn no_epoch_has_negative_duration(ps in arb_protocols()) {
        let s = segment(&ps);
        prop_assert_eq!(s.epochs.len(), ps.len());
        for e in s.iter_epochs() {
            prop_assert!(e.end >= e.start, "{:?}", e);
        }
    }

    #[test]
    fn unclamped_overlaps_leave_no_residue(ps in arb_protocols()) {
        let s = segment(&ps);
        for o in &s.overlaps {
            let prev = &s.epochs[o.protocols.0 as usize - 1];
            let next = &s.epochs[o.protocols.1 as usize - 1];
            prop_assert_eq!(prev.post.end, o.prev_post_end);
            prop_assert_eq!(next.pre.start, o.pre_start);
            let clamped = prev.post.end == prev.post.start || next.pre.start == next.pre.end;
            if !clamped {
                prop_assert!((prev.post.end - next.pre.start).abs() < 1e-9);
                prop_assert!(prev.post.end <= next.pre.start + 1e-9);
            }
        }
    }

    #[test]
    fn during_epochs_are_never_adjusted(ps in arb_protocols()) {
        let s = segment(&ps);
        for (t, p) in s.epochs.iter().zip(&ps) {
            prop_assert_eq!((t.during.start, t.during.end), (p.start, p.end));
        }
    }
}

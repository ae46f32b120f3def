mod common;
use approx::assert_abs_diff_eq;
use common::{events_for, fixture_events, fixture_regions, fixture_waves, wave};
use swseg::{
    report, run, DedupConfig, Error, Phase, PipelineConfig, RegionMap, TieBreak,
};

#[test]
fn fixture_run_end_to_end() {
    let out = run(&fixture_events(), fixture_waves(), &fixture_regions(), &PipelineConfig::default())
        .unwrap();

    assert_eq!(out.validation.protocols.len(), 2);
    assert_eq!(out.validation.rejected.len(), 6);
    assert_eq!(out.segmentation.overlaps.len(), 1);
    assert_eq!(out.classification.waves.len(), 7);
    assert_eq!(out.classification.dropped, 1);

    let summary: Vec<(String, Vec<f64>)> = out
        .variants
        .iter()
        .map(|v| (v.config.file_name(), v.waves.iter().map(|w| w.wave.start).collect()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("filtered_epochs_500ms_first.csv".to_string(), vec![50.0, 150.0, 300.0, 455.0, 700.0, 701.8]),
            ("filtered_epochs_500ms_most_negative.csv".to_string(), vec![50.0, 151.3, 300.0, 455.0, 700.0, 701.8]),
            ("filtered_epochs_1000ms_first.csv".to_string(), vec![50.0, 150.0, 300.0, 455.0, 700.0]),
            ("filtered_epochs_1000ms_most_negative.csv".to_string(), vec![50.0, 151.3, 300.0, 455.0, 701.8]),
        ]
    );
}

#[test]
fn fixture_quantification() {
    let out = run(&fixture_events(), fixture_waves(), &fixture_regions(), &PipelineConfig::default())
        .unwrap();
    let q = &out.quantification;
    let keys: Vec<(u32, Phase)> = q.iter().map(|r| (r.protocol_id, r.phase)).collect();
    assert_eq!(
        keys,
        vec![
            (1, Phase::Pre),
            (1, Phase::During),
            (1, Phase::Post),
            (2, Phase::Pre),
            (2, Phase::During),
        ]
    );
    // Most-negative pick in protocol 1's stim group is the -95 µV wave.
    assert_abs_diff_eq!(q[1].max, 150.0);
    assert_eq!(q[4].count, 2);
    assert_abs_diff_eq!(q[4].mean, 135.0);
    assert_abs_diff_eq!(q[4].std, 7.07);
}

#[test]
fn quantify_variant_outside_the_dedup_list() {
    let cfg = PipelineConfig {
        dedup: vec![],
        quantify_variant: DedupConfig::new(1.0, TieBreak::First),
        ..PipelineConfig::default()
    };
    let out = run(&fixture_events(), fixture_waves(), &fixture_regions(), &cfg).unwrap();
    assert!(out.variants.is_empty());
    assert_eq!(out.quantified_waves.len(), 5);
}

#[test]
fn structural_errors_fail_fast() {
    let waves = vec![wave(150.0, 151.0, -80.0, "E1")];
    let regions = RegionMap::from_groups([("Parietal", ["E1"])]);
    let cfg = PipelineConfig::default();

    assert_eq!(
        run(&[], waves.clone(), &regions, &cfg).unwrap_err(),
        Error::EmptyInput { what: "annotation events" }
    );
    assert_eq!(
        run(&events_for(&[(100.0, 280.0)]), waves.clone(), &RegionMap::default(), &cfg).unwrap_err(),
        Error::EmptyInput { what: "region map" }
    );

    let bad = PipelineConfig { min_duration: 300.0, ..PipelineConfig::default() };
    assert!(matches!(
        run(&events_for(&[(100.0, 280.0)]), waves.clone(), &regions, &bad),
        Err(Error::InvalidConfig { .. })
    ));

    // A kept wave without PTP cannot be quantified.
    assert_eq!(
        run(&events_for(&[(100.0, 280.0)]), waves, &regions, &cfg).unwrap_err(),
        Error::MissingField { field: "PTP", index: 0 }
    );
}

#[test]
fn no_waves_is_not_an_error() {
    let regions = RegionMap::from_groups([("Parietal", ["E1"])]);
    let out = run(&events_for(&[(100.0, 280.0)]), vec![], &regions, &PipelineConfig::default())
        .unwrap();
    assert!(out.classification.waves.is_empty());
    assert!(out.variants.iter().all(|v| v.waves.is_empty()));
    assert!(out.quantification.is_empty());
}

#[test]
fn report_matches_run() {
    let out = run(&fixture_events(), fixture_waves(), &fixture_regions(), &PipelineConfig::default())
        .unwrap();
    let text = report::render(&out.validation, &out.segmentation, &out.classification);
    assert!(text.contains("Stimulation protocols: 2"), "{text}");
    assert!(text.contains("Rejected markers: 6"), "{text}");
    assert!(text.contains("invalid duration (50.00s)"), "{text}");
    assert!(text.contains("unpaired start"), "{text}");
    assert!(text.contains("Classified waves: 7 (1 outside all epochs)"), "{text}");
}

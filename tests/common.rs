/// Shared fixtures and builders for the integration tests.
use std::path::{Path, PathBuf};
use swseg::{io, AnnotationEvent, Protocol, RegionMap, WaveEvent};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[allow(unused)]
/// `annotations.csv`: two valid protocols (100–280, 630–810) plus one of
/// each rejection kind.
pub fn fixture_events() -> Vec<AnnotationEvent> {
    io::read_annotations(&fixtures_dir().join("annotations.csv"))
        .expect("fixture annotations.csv")
}

#[allow(unused)]
/// `slow_waves.csv`: eight waves in file (not time) order, one outside
/// every epoch.
pub fn fixture_waves() -> Vec<WaveEvent> {
    io::read_waves(&fixtures_dir().join("slow_waves.csv")).expect("fixture slow_waves.csv")
}

#[allow(unused)]
pub fn fixture_regions() -> RegionMap {
    RegionMap::from_json_file(&fixtures_dir().join("net_segmentation.json"))
        .expect("fixture net_segmentation.json")
}

#[allow(unused)]
pub fn protocol(id: u32, start: f64, end: f64) -> Protocol {
    Protocol { id, start, end }
}

#[allow(unused)]
/// Minimal wave: negative peak at the midpoint.
pub fn wave(start: f64, end: f64, neg_peak_value: f64, channel: &str) -> WaveEvent {
    WaveEvent::new(start, end, (start + end) / 2.0, neg_peak_value, channel)
}

#[allow(unused)]
/// Marker stream for `(start, end)` pairs, in order.
pub fn events_for(pairs: &[(f64, f64)]) -> Vec<AnnotationEvent> {
    pairs
        .iter()
        .flat_map(|&(s, e)| [AnnotationEvent::start(s), AnnotationEvent::end(e)])
        .collect()
}

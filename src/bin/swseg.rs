//! swseg: segment one recording into stimulation epochs and classify its
//! slow waves.
//!
//! Files written to `--output`:
//!   protocols.csv                          accepted stimulation protocols
//!   rejected_events.csv                    markers that formed no protocol
//!   epochs.json                            adjusted + nominal epochs, overlaps
//!   sorted_slow_waves.csv                  every classified wave
//!   filtered_epochs_{ms}ms_{tie}.csv       one per dedup variant
//!   wave_quantification.csv                PTP stats of the quantified variant
//!   wave_quantification_{region}.csv       same, one per mapped region
//!   run_summary.txt                        human-readable report
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use swseg::{io, quantify_region, report, run, PipelineConfig, Region, RegionMap};

#[derive(Parser, Debug)]
#[command(name = "swseg", about = "Stimulation-protocol segmentation and slow-wave classification")]
struct Args {
    /// Annotation CSV (`onset,label`).
    #[arg(long)]
    annotations: PathBuf,

    /// Detected slow-wave table (CSV).
    #[arg(long)]
    waves: PathBuf,

    /// Net segmentation JSON (region → channel groups).
    #[arg(long)]
    regions: PathBuf,

    /// Output directory.
    #[arg(long)]
    output: PathBuf,

    /// Pipeline config (TOML). Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shortest accepted protocol (s).
    #[arg(long)]
    min_duration: Option<f64>,

    /// Longest accepted protocol (s).
    #[arg(long)]
    max_duration: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let t0 = Instant::now();

    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(v) = args.min_duration {
        cfg.min_duration = v;
    }
    if let Some(v) = args.max_duration {
        cfg.max_duration = v;
    }

    // ── 1. Inputs ──────────────────────────────────────────────────────────
    let events = io::read_annotations(&args.annotations)?;
    let waves = io::read_waves(&args.waves)?;
    let regions = RegionMap::from_json_file(&args.regions)?;
    eprintln!(
        "Loaded {} marker(s), {} wave(s), {} mapped channel(s)",
        events.len(),
        waves.len(),
        regions.len()
    );

    // ── 2. Pipeline ────────────────────────────────────────────────────────
    let out = run(&events, waves, &regions, &cfg).context("pipeline failed")?;
    eprintln!(
        "{} protocol(s), {} rejected marker(s), {} overlap(s), {} wave(s) classified ({} dropped)",
        out.validation.protocols.len(),
        out.validation.rejected.len(),
        out.segmentation.overlaps.len(),
        out.classification.waves.len(),
        out.classification.dropped
    );

    // ── 3. Outputs ─────────────────────────────────────────────────────────
    let dir = &args.output;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    io::write_protocols(&dir.join("protocols.csv"), &out.validation.protocols)?;
    io::write_rejections(&dir.join("rejected_events.csv"), &out.validation.rejected)?;
    io::write_segmentation_json(&dir.join("epochs.json"), &out.segmentation)?;
    io::write_classified(&dir.join("sorted_slow_waves.csv"), &out.classification.waves)?;

    for v in &out.variants {
        let path = dir.join(v.config.file_name());
        io::write_classified(&path, &v.waves)?;
        eprintln!("  {:<22} {:>6} wave(s) → {}", v.config.to_string(), v.waves.len(), path.display());
    }

    io::write_quantification(&dir.join("wave_quantification.csv"), &out.quantification)?;
    for region in Region::MAPPED {
        let rows = quantify_region(&out.quantified_waves, region)?;
        let path = dir.join(format!("wave_quantification_{}.csv", region.label()));
        io::write_quantification(&path, &rows)?;
    }

    let summary = report::render(&out.validation, &out.segmentation, &out.classification);
    let summary_path = dir.join("run_summary.txt");
    std::fs::write(&summary_path, summary)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    eprintln!(
        "Written → {} ({:.1} ms)",
        dir.display(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

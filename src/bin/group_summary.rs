//! group_summary: merge one recording's `wave_quantification.csv` into the
//! project-wide `Group_Analysis/group_summary.csv`, keyed by
//! (subject, night, protocol, phase).
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use swseg::{io, GroupSummaryRow};

#[derive(Parser, Debug)]
#[command(name = "group_summary")]
struct Args {
    /// Project root; the summary lives in `<project-dir>/Group_Analysis/`.
    #[arg(long)]
    project_dir: PathBuf,

    /// Subject identifier.
    #[arg(long)]
    subject: String,

    /// Night / session identifier.
    #[arg(long)]
    night: String,

    /// `wave_quantification.csv` written by `swseg`.
    #[arg(long)]
    quantification: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows: Vec<GroupSummaryRow> = io::read_quantification(&args.quantification)?
        .iter()
        .map(|q| GroupSummaryRow::new(&args.subject, &args.night, q))
        .collect();

    let path = args.project_dir.join("Group_Analysis").join("group_summary.csv");
    let total = io::append_group_summary(&path, &rows)?;
    eprintln!(
        "{} / {}: merged {} row(s) → {} ({} total)",
        args.subject,
        args.night,
        rows.len(),
        path.display(),
        total
    );
    Ok(())
}

//! Plain-text run summary (`run_summary.txt`).
use std::fmt;

use crate::classify::Classification;
use crate::segment::Segmentation;
use crate::validate::Validation;

/// Borrowing view over one run's results; `Display` renders the report.
pub struct Report<'a> {
    pub validation: &'a Validation,
    pub segmentation: &'a Segmentation,
    pub classification: &'a Classification,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.validation;
        writeln!(f, "Stimulation protocols: {}", v.protocols.len())?;
        writeln!(f, "{:>4}  {:>10}  {:>10}  {:>8}", "id", "start", "end", "duration")?;
        for p in &v.protocols {
            writeln!(f, "{:>4}  {:>10.2}  {:>10.2}  {:>8.2}", p.id, p.start, p.end, p.duration())?;
        }

        writeln!(f)?;
        writeln!(f, "Rejected markers: {}", v.rejected.len())?;
        for r in &v.rejected {
            writeln!(f, "  #{:<4} {:>10.2}s  {:<12} {}", r.index, r.onset, r.kind.label(), r.reason)?;
        }

        writeln!(f)?;
        writeln!(f, "Epochs (adjusted):")?;
        for t in &self.segmentation.epochs {
            write!(f, "  protocol {:>3}:", t.protocol_id())?;
            for e in t.iter() {
                write!(f, "  {} [{:.2}, {:.2}]", e.phase, e.start, e.end)?;
            }
            writeln!(f)?;
        }

        let overlaps = &self.segmentation.overlaps;
        writeln!(f)?;
        writeln!(f, "Overlaps resolved: {}", overlaps.len())?;
        for o in overlaps {
            writeln!(
                f,
                "  {} → {}: {:.2}s in [{:.2}, {:.2}]; post-stim end {:.2}, pre-stim start {:.2}",
                o.protocols.0,
                o.protocols.1,
                o.amount,
                o.overlap_start,
                o.overlap_end,
                o.prev_post_end,
                o.pre_start
            )?;
        }

        let c = self.classification;
        writeln!(f)?;
        writeln!(
            f,
            "Classified waves: {} ({} outside all epochs)",
            c.waves.len(),
            c.dropped
        )?;
        for ((id, phase), n) in c.counts() {
            writeln!(f, "  protocol {id:>3} {:<10} {n}", phase.label())?;
        }
        Ok(())
    }
}

/// Render the run summary as text.
pub fn render(
    validation: &Validation,
    segmentation: &Segmentation,
    classification: &Classification,
) -> String {
    Report { validation, segmentation, classification }.to_string()
}

//! Annotation markers as they come out of a recording's event stream.
//!
//! Only two labels matter to the rest of the crate, `"stim start"` and
//! `"stim end"`. Matching is case-insensitive and ignores whitespace
//! (e.g. `"Stim  Start"` and `"STIMSTART"` both match). Everything else is
//! kept as [`AnnotationKind::Other`] so the validator can log it.
use serde::Serialize;
use std::fmt;

/// Label text for a protocol start marker.
pub const STIM_START: &str = "stim start";
/// Label text for a protocol end marker.
pub const STIM_END: &str = "stim end";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AnnotationKind {
    ProtocolStart,
    ProtocolEnd,
    /// Any other marker; carries the original label.
    Other(String),
}

impl AnnotationKind {
    /// Map a raw annotation label onto a kind.
    pub fn from_label(label: &str) -> Self {
        let norm = |s: &str| -> String {
            s.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
        };
        let l = norm(label);
        if l == norm(STIM_START) {
            AnnotationKind::ProtocolStart
        } else if l == norm(STIM_END) {
            AnnotationKind::ProtocolEnd
        } else {
            AnnotationKind::Other(label.to_string())
        }
    }

    /// Canonical label text.
    pub fn label(&self) -> &str {
        match self {
            AnnotationKind::ProtocolStart => STIM_START,
            AnnotationKind::ProtocolEnd => STIM_END,
            AnnotationKind::Other(l) => l,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timestamped marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationEvent {
    /// Onset in seconds from the start of the recording.
    pub onset: f64,
    pub kind: AnnotationKind,
}

impl AnnotationEvent {
    pub fn new(onset: f64, kind: AnnotationKind) -> Self {
        Self { onset, kind }
    }

    pub fn from_label(onset: f64, label: &str) -> Self {
        Self { onset, kind: AnnotationKind::from_label(label) }
    }

    pub fn start(onset: f64) -> Self {
        Self::new(onset, AnnotationKind::ProtocolStart)
    }

    pub fn end(onset: f64) -> Self {
        Self::new(onset, AnnotationKind::ProtocolEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_ignoring_case_and_spaces() {
        assert_eq!(AnnotationKind::from_label("stim start"), AnnotationKind::ProtocolStart);
        assert_eq!(AnnotationKind::from_label("Stim  Start"), AnnotationKind::ProtocolStart);
        assert_eq!(AnnotationKind::from_label(" STIMEND "), AnnotationKind::ProtocolEnd);
    }

    #[test]
    fn other_labels_keep_their_text() {
        let k = AnnotationKind::from_label("Arousal");
        assert_eq!(k, AnnotationKind::Other("Arousal".into()));
        assert_eq!(k.to_string(), "Arousal");
    }
}

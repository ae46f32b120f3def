//! Channel → scalp region lookup.
//!
//! The map is built from a net-segmentation document of the form
//!
//! ```json
//! {
//!   "Left Frontal":  [["E032", "E037", "E046"]],
//!   "Right Frontal": [["E025", "E018", "E010"]],
//!   "Parietal":      [["E084", "E085", "E086"]]
//! }
//! ```
//!
//! i.e. region name → list of channel groups. Source region names are folded
//! onto the fixed [`Region`] set; a channel listed under a region name that
//! is not recognised maps to [`Region::Unclassified`]. When a channel is
//! listed more than once, the first listing in document order wins.
use anyhow::{bail, Context};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "L_frontal")]
    LeftFrontal,
    #[serde(rename = "R_frontal")]
    RightFrontal,
    #[serde(rename = "Posterior")]
    Posterior,
    #[serde(rename = "Unclassified")]
    Unclassified,
}

impl Region {
    /// Regions a channel can actually be assigned to.
    pub const MAPPED: [Region; 3] = [Region::LeftFrontal, Region::RightFrontal, Region::Posterior];

    pub fn label(self) -> &'static str {
        match self {
            Region::LeftFrontal => "L_frontal",
            Region::RightFrontal => "R_frontal",
            Region::Posterior => "Posterior",
            Region::Unclassified => "Unclassified",
        }
    }

    /// Fold a source region name onto the fixed set.
    ///
    /// Case-insensitive, ignores spaces and underscores.
    pub fn from_source_name(name: &str) -> Region {
        let norm: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "leftfrontal" | "lfrontal" => Region::LeftFrontal,
            "rightfrontal" | "rfrontal" => Region::RightFrontal,
            "parietal" | "posterior" => Region::Posterior,
            _ => Region::Unclassified,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable channel → region lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    channels: HashMap<String, Region>,
}

impl RegionMap {
    /// Build from `(source region name, channels)` pairs, in priority order.
    pub fn from_groups<'a, I, C>(groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, C)>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut channels = HashMap::new();
        for (name, chans) in groups {
            let region = Region::from_source_name(name);
            for ch in chans {
                channels.entry(ch.as_ref().to_string()).or_insert(region);
            }
        }
        Self { channels }
    }

    /// Parse a net-segmentation JSON document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, on a layout other than
    /// `region → [[channel, …], …]`, or when no channel is listed at all.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        // `preserve_order` keeps the document order in `Map`.
        let doc: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).context("failed to parse net segmentation JSON")?;
        let mut groups = Vec::with_capacity(doc.len());
        for (name, value) in doc {
            let lists: Vec<Vec<String>> = serde_json::from_value(value)
                .with_context(|| format!("region '{name}' is not a list of channel groups"))?;
            groups.push((name, lists.into_iter().flatten().collect::<Vec<_>>()));
        }
        let map = Self::from_groups(groups.iter().map(|(n, chans)| (n.as_str(), chans)));
        if map.is_empty() {
            bail!("net segmentation lists no channels");
        }
        Ok(map)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading region map {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Region of `channel`, or [`Region::Unclassified`] when unmapped.
    pub fn classify(&self, channel: &str) -> Region {
        self.channels.get(channel).copied().unwrap_or(Region::Unclassified)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET: &str = r#"{
        "Left Frontal":  [["E032", "E037"], ["E046"]],
        "Right Frontal": [["E025", "E018"]],
        "Parietal":      [["E084", "E032"]],
        "Temporal":      [["E100"]]
    }"#;

    #[test]
    fn source_names_fold_onto_fixed_regions() {
        assert_eq!(Region::from_source_name("Left Frontal"), Region::LeftFrontal);
        assert_eq!(Region::from_source_name("R_frontal"), Region::RightFrontal);
        assert_eq!(Region::from_source_name("Parietal"), Region::Posterior);
        assert_eq!(Region::from_source_name("Temporal"), Region::Unclassified);
    }

    #[test]
    fn json_lookup() {
        let map = RegionMap::from_json_str(NET).unwrap();
        assert_eq!(map.classify("E046"), Region::LeftFrontal);
        assert_eq!(map.classify("E018"), Region::RightFrontal);
        assert_eq!(map.classify("E084"), Region::Posterior);
        assert_eq!(map.classify("E100"), Region::Unclassified);
        assert_eq!(map.classify("Cz"), Region::Unclassified);
    }

    #[test]
    fn first_listing_wins() {
        let map = RegionMap::from_json_str(NET).unwrap();
        assert_eq!(map.classify("E032"), Region::LeftFrontal);
    }

    #[test]
    fn empty_map_is_an_error() {
        assert!(RegionMap::from_json_str("{}").is_err());
        assert!(RegionMap::from_json_str(r#"{"Parietal": [[]]}"#).is_err());
    }
}

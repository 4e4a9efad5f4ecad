//! Network data model: locations, physical links and logical links.

use crate::config::{CopperConfig, LossConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cable medium of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    Copper,
    Fibre,
}

impl Medium {
    /// Classify a layer suffix such as `fibre` or `Copper`.
    pub fn from_layer_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_lowercase().as_str() {
            "copper" => Some(Self::Copper),
            "fibre" | "fiber" => Some(Self::Fibre),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copper => "copper",
            Self::Fibre => "fibre",
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cable subtype as printed in link schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subtype {
    /// Copper-clad aluminium, acceptable on short runs only.
    Cca,
    Copper,
    Fibre,
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cca => "CCA",
            Self::Copper => "Copper",
            Self::Fibre => "Fibre",
        })
    }
}

/// A network site or switch, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// Fibre cores this location itself consumes.
    pub cores_required: u32,
    pub deployed: bool,
    /// Identifier of the source point feature.
    pub feature_id: String,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            feature_id: name.clone(),
            name,
            cores_required: 1,
            deployed: true,
        }
    }
}

/// One physical cable run between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from_location: String,
    pub to_location: String,
    pub medium: Medium,
    /// Physical length in metres, festoon up/downs included.
    pub length: f64,
    /// Declared fibre cores or copper cable count.
    pub cores: u32,
    /// Downstream demand computed by capacity validation (fibre only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores_used: Option<u32>,
    pub deployed: bool,
    /// Demand beyond this link is capped at one core and logical links stop here.
    pub aggregated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fibre_name: Option<String>,
    pub feature_id: String,
    pub layer: String,
}

impl Link {
    pub fn new(
        from_location: impl Into<String>,
        to_location: impl Into<String>,
        medium: Medium,
        length: f64,
    ) -> Self {
        Self {
            from_location: from_location.into(),
            to_location: to_location.into(),
            medium,
            length,
            cores: 1,
            cores_used: None,
            deployed: true,
            aggregated: false,
            fibre_name: None,
            feature_id: String::new(),
            layer: String::new(),
        }
    }

    pub fn with_cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }

    pub fn aggregated(mut self) -> Self {
        self.aggregated = true;
        self
    }

    /// Swap the endpoints in place.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.from_location, &mut self.to_location);
    }

    /// Whether a logical link may keep extending upward past this link.
    pub fn continues_circuit(&self) -> bool {
        match self.medium {
            Medium::Fibre => !self.aggregated,
            Medium::Copper => false,
        }
    }

    pub fn subtype(&self, copper: &CopperConfig) -> Subtype {
        match self.medium {
            Medium::Fibre => Subtype::Fibre,
            Medium::Copper if self.length <= copper.cca_max_length => Subtype::Cca,
            Medium::Copper => Subtype::Copper,
        }
    }
}

/// How orientation classified a physical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// Part of the rooted tree; `from_location` is the parent end.
    Tree,
    /// Reached from the root but closes a loop onto an already visited location.
    Cyclic,
    /// Never reached from the root; orientation is undetermined.
    Unreachable,
    /// Reached from the root, but leads past the configured depth limit.
    DepthLimited,
}

/// An end-to-end circuit built from contiguous same-medium physical links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalLink {
    /// Upstream end (towards the root).
    pub from_location: String,
    /// Downstream end, the location this circuit serves.
    pub to_location: String,
    pub medium: Medium,
    /// Constituent physical links, downstream first.
    pub physical_links: Vec<Link>,
    /// Indices of the constituent links in the oriented link list.
    pub link_indices: Vec<usize>,
    pub total_length: f64,
    /// Intermediate splice points.
    pub couplers: u32,
}

impl LogicalLink {
    /// Estimated optical loss in dB. `None` for copper.
    pub fn loss(&self, budget: &LossConfig) -> Option<f64> {
        match self.medium {
            Medium::Fibre => Some(
                f64::from(self.couplers) * budget.coupler_db
                    + self.total_length / 1000.0 * budget.fibre_db_per_km,
            ),
            Medium::Copper => None,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.physical_links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medium_from_layer_suffix() {
        assert_eq!(Medium::from_layer_suffix("Fibre"), Some(Medium::Fibre));
        assert_eq!(Medium::from_layer_suffix("COPPER"), Some(Medium::Copper));
        assert_eq!(Medium::from_layer_suffix("switch"), None);
    }

    #[test]
    fn test_subtype_by_length() {
        let copper = CopperConfig::default();
        let short = Link::new("a", "b", Medium::Copper, 25.0);
        let long = Link::new("a", "b", Medium::Copper, 45.0);
        let fibre = Link::new("a", "b", Medium::Fibre, 10.0);
        assert_eq!(short.subtype(&copper), Subtype::Cca);
        assert_eq!(long.subtype(&copper), Subtype::Copper);
        assert_eq!(fibre.subtype(&copper), Subtype::Fibre);
        assert_eq!(short.subtype(&copper).to_string(), "CCA");
    }

    #[test]
    fn test_continues_circuit() {
        assert!(Link::new("a", "b", Medium::Fibre, 1.0).continues_circuit());
        assert!(!Link::new("a", "b", Medium::Fibre, 1.0).aggregated().continues_circuit());
        assert!(!Link::new("a", "b", Medium::Copper, 1.0).continues_circuit());
    }

    #[test]
    fn test_reverse_swaps_endpoints() {
        let mut link = Link::new("a", "b", Medium::Fibre, 1.0);
        link.reverse();
        assert_eq!(link.from_location, "b");
        assert_eq!(link.to_location, "a");
    }

    #[test]
    fn test_logical_link_loss() {
        let budget = LossConfig::default();
        let fibre = LogicalLink {
            from_location: "core".to_string(),
            to_location: "edge".to_string(),
            medium: Medium::Fibre,
            physical_links: Vec::new(),
            link_indices: Vec::new(),
            total_length: 2000.0,
            couplers: 2,
        };
        let loss = fibre.loss(&budget).unwrap();
        assert!((loss - (2.0 * 0.75 + 2.0 * 3.5)).abs() < 1e-9);

        let copper = LogicalLink {
            medium: Medium::Copper,
            couplers: 0,
            ..fibre
        };
        assert_eq!(copper.loss(&budget), None);
    }
}

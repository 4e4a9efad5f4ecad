//! Warning log and summary tallies for report and diagram generators.

use crate::config::CopperConfig;
use crate::diagnostics::Diagnostic;
use crate::graph::{Link, LinkState, Location, LogicalLink, Medium};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for one medium across physical links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalTally {
    pub count: usize,
    pub deployed: usize,
    pub length: f64,
    pub cores: u64,
}

/// Totals for one medium across logical links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalTally {
    pub count: usize,
    pub length: f64,
    pub couplers: u64,
}

/// Aggregate statistics for a planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub locations: usize,
    pub deployed_locations: usize,
    pub physical: BTreeMap<Medium, PhysicalTally>,
    pub logical: BTreeMap<Medium, LogicalTally>,
    pub total_couplers: u64,
    pub unreachable_links: usize,
    pub cyclic_links: usize,
    pub depth_limited_links: usize,
    /// Copper runs longer than the warning length.
    pub long_copper_links: usize,
    /// Copper runs longer than the critical length.
    pub critical_copper_links: usize,
}

impl Summary {
    pub fn physical(&self, medium: Medium) -> PhysicalTally {
        self.physical.get(&medium).copied().unwrap_or_default()
    }

    pub fn logical(&self, medium: Medium) -> LogicalTally {
        self.logical.get(&medium).copied().unwrap_or_default()
    }
}

/// Ordered warnings plus summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub warnings: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

/// Everything the aggregator counts over.
pub struct ReportInput<'a> {
    pub locations: &'a BTreeMap<String, Location>,
    pub links: &'a [Link],
    pub states: &'a [LinkState],
    pub logical_links: &'a [LogicalLink],
    pub diagnostics: Vec<Diagnostic>,
    pub copper: &'a CopperConfig,
}

pub fn aggregate(input: ReportInput<'_>) -> Report {
    let mut summary = Summary {
        locations: input.locations.len(),
        deployed_locations: input.locations.values().filter(|l| l.deployed).count(),
        ..Summary::default()
    };

    for link in input.links {
        let tally = summary.physical.entry(link.medium).or_default();
        tally.count += 1;
        tally.length += link.length;
        tally.cores += u64::from(link.cores);
        if link.deployed {
            tally.deployed += 1;
        }
        if link.medium == Medium::Copper {
            if link.length > input.copper.critical_length {
                summary.critical_copper_links += 1;
            } else if link.length > input.copper.warning_length {
                summary.long_copper_links += 1;
            }
        }
    }

    for state in input.states {
        match state {
            LinkState::Tree => {}
            LinkState::Cyclic => summary.cyclic_links += 1,
            LinkState::Unreachable => summary.unreachable_links += 1,
            LinkState::DepthLimited => summary.depth_limited_links += 1,
        }
    }

    for logical in input.logical_links {
        let tally = summary.logical.entry(logical.medium).or_default();
        tally.count += 1;
        tally.length += logical.total_length;
        tally.couplers += u64::from(logical.couplers);
        summary.total_couplers += u64::from(logical.couplers);
    }

    Report {
        warnings: input.diagnostics.iter().map(ToString::to_string).collect(),
        diagnostics: input.diagnostics,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies_by_medium() {
        let locations: BTreeMap<String, Location> = ["Core", "A", "B"]
            .iter()
            .map(|n| (n.to_string(), Location::new(*n)))
            .collect();
        let mut undeployed = Link::new("A", "B", Medium::Copper, 95.0);
        undeployed.deployed = false;
        let links = vec![
            Link::new("Core", "A", Medium::Fibre, 120.0).with_cores(8),
            undeployed,
            Link::new("A", "C", Medium::Copper, 75.0),
        ];
        let states = vec![LinkState::Tree, LinkState::DepthLimited, LinkState::Unreachable];
        let logical = vec![LogicalLink {
            from_location: "Core".to_string(),
            to_location: "A".to_string(),
            medium: Medium::Fibre,
            physical_links: vec![links[0].clone()],
            link_indices: vec![0],
            total_length: 120.0,
            couplers: 0,
        }];
        let report = aggregate(ReportInput {
            locations: &locations,
            links: &links,
            states: &states,
            logical_links: &logical,
            diagnostics: vec![Diagnostic::UntraceableLogicalLink {
                location: "B".to_string(),
            }],
            copper: &CopperConfig::default(),
        });

        let s = &report.summary;
        assert_eq!(s.locations, 3);
        assert_eq!(s.physical(Medium::Fibre).cores, 8);
        assert_eq!(s.physical(Medium::Copper).count, 2);
        assert_eq!(s.physical(Medium::Copper).deployed, 1);
        assert_eq!(s.physical(Medium::Copper).length, 170.0);
        assert_eq!(s.logical(Medium::Fibre).count, 1);
        assert_eq!(s.logical(Medium::Copper), LogicalTally::default());
        assert_eq!(s.unreachable_links, 1);
        assert_eq!(s.depth_limited_links, 1);
        assert_eq!(s.critical_copper_links, 1);
        assert_eq!(s.long_copper_links, 1);
        assert_eq!(
            report.warnings,
            vec!["unable to trace logical uplink for B".to_string()]
        );
    }
}

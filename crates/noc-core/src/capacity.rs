//! Fibre capacity validation over the oriented tree.
//!
//! A location needs its own `cores_required` plus, for every fibre link it feeds,
//! either the whole demand of that subtree or exactly one core when the link is
//! aggregated. Copper links carry no fibre demand upward, but the subtrees behind
//! them are still checked.

use crate::diagnostics::{self, Diagnostic, Outcome};
use crate::graph::{Link, Location, Medium};
use crate::orient::Orientation;
use std::collections::BTreeMap;
use tracing::info;

/// Demand computed for every location in the tree.
#[derive(Debug, Clone, Default)]
pub struct CapacityCheck {
    /// Cores required at each reachable location, its subtree included.
    /// Saturates at `u32::MAX`.
    pub required: BTreeMap<String, u32>,
    /// Oriented links with `cores_used` filled in for tree fibre links.
    pub links: Vec<Link>,
}

impl CapacityCheck {
    pub fn required_cores(&self, location: &str) -> Option<u32> {
        self.required.get(location).copied()
    }
}

struct Frame {
    location: String,
    /// Tree link this location was reached by.
    via: Option<usize>,
    children: Vec<usize>,
    next: usize,
    total: u32,
}

fn base_demand(locations: &BTreeMap<String, Location>, name: &str) -> u32 {
    locations.get(name).map_or(1, |l| l.cores_required)
}

fn frame_for(
    orientation: &Orientation,
    locations: &BTreeMap<String, Location>,
    location: String,
    via: Option<usize>,
) -> Frame {
    Frame {
        children: orientation.child_links(&location).collect(),
        total: base_demand(locations, &location),
        location,
        via,
        next: 0,
    }
}

/// Compute required cores from the root down and check every fibre link.
pub fn validate(
    orientation: &Orientation,
    locations: &BTreeMap<String, Location>,
) -> Outcome<CapacityCheck> {
    let mut diagnostics = Vec::new();
    let mut links = orientation.links.clone();
    let mut required = BTreeMap::new();

    let mut stack = vec![frame_for(
        orientation,
        locations,
        orientation.root.clone(),
        None,
    )];

    while let Some(frame) = stack.last_mut() {
        if let Some(&child_link) = frame.children.get(frame.next) {
            frame.next += 1;
            let child = links[child_link].to_location.clone();
            stack.push(frame_for(orientation, locations, child, Some(child_link)));
            continue;
        }

        let Some(done) = stack.pop() else { break };
        required.insert(done.location.clone(), done.total);

        let Some(i) = done.via else { continue };
        let link = &mut links[i];
        let contribution = match link.medium {
            Medium::Fibre if link.aggregated => 1,
            Medium::Fibre => done.total,
            Medium::Copper => continue,
        };
        link.cores_used = Some(contribution);
        if link.cores < contribution {
            diagnostics::record(
                &mut diagnostics,
                Diagnostic::CapacityShortfall {
                    from: link.from_location.clone(),
                    to: link.to_location.clone(),
                    required: contribution,
                    provisioned: link.cores,
                },
            );
        }
        if let Some(parent) = stack.last_mut() {
            parent.total = parent.total.saturating_add(contribution);
        }
    }

    info!(
        "Core {} requires {} cores",
        orientation.root,
        required.get(&orientation.root).copied().unwrap_or_default()
    );
    Outcome::new(CapacityCheck { required, links }, diagnostics)
}

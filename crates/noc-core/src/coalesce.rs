//! Logical link coalescing.
//!
//! Starting from each non-root location, follow tree uplinks towards the root and
//! merge contiguous same-medium links into one circuit. A copper link or an
//! aggregated fibre link always ends the circuit after its own hop; a change of
//! medium ends it before the differing link.

use crate::diagnostics::{self, Diagnostic, Outcome};
use crate::graph::{Link, Location, LogicalLink, Medium};
use crate::orient::Orientation;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Build the logical link serving `location`, or `None` if it has no uplink.
pub fn trace_uplink(
    orientation: &Orientation,
    links: &[Link],
    location: &str,
) -> Option<LogicalLink> {
    let mut medium: Option<Medium> = None;
    let mut from = location.to_string();
    let mut indices = Vec::new();

    while let Some(i) = orientation.parent_link(&from) {
        let link = &links[i];
        if medium.is_some_and(|m| m != link.medium) {
            break;
        }
        medium = Some(link.medium);
        from.clone_from(&link.from_location);
        indices.push(i);
        if !link.continues_circuit() {
            break;
        }
    }

    let medium = medium?;
    let physical_links: Vec<Link> = indices.iter().map(|&i| links[i].clone()).collect();
    let total_length = physical_links.iter().map(|l| l.length).sum();
    let couplers = match medium {
        Medium::Fibre => u32::try_from(physical_links.len().saturating_sub(1)).unwrap_or(u32::MAX),
        Medium::Copper => 0,
    };

    Some(LogicalLink {
        from_location: from,
        to_location: location.to_string(),
        medium,
        physical_links,
        link_indices: indices,
        total_length,
        couplers,
    })
}

/// One logical link per non-root location, in location name order.
pub fn coalesce(
    orientation: &Orientation,
    links: &[Link],
    locations: &BTreeMap<String, Location>,
) -> Outcome<Vec<LogicalLink>> {
    let mut diagnostics = Vec::new();
    let mut logical = Vec::new();

    for name in locations.keys() {
        if *name == orientation.root {
            continue;
        }
        match trace_uplink(orientation, links, name) {
            Some(link) => {
                debug!(
                    "Logical {} link {} -> {} over {} segments",
                    link.medium,
                    link.from_location,
                    link.to_location,
                    link.segment_count()
                );
                logical.push(link);
            }
            None => diagnostics::record(
                &mut diagnostics,
                Diagnostic::UntraceableLogicalLink {
                    location: name.clone(),
                },
            ),
        }
    }

    info!("Coalesced {} logical links", logical.len());
    Outcome::new(logical, diagnostics)
}

/// The chain of logical links from `location` back to the root, nearest first.
pub fn route_to_root<'a>(logical: &'a [LogicalLink], location: &str) -> Vec<&'a LogicalLink> {
    let mut route = Vec::new();
    let mut current = location;
    while let Some(link) = logical.iter().find(|l| l.to_location == current) {
        route.push(link);
        current = &link.from_location;
        if route.len() > logical.len() {
            break;
        }
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orient::orient;

    fn locations(names: &[&str]) -> BTreeMap<String, Location> {
        names
            .iter()
            .map(|n| (n.to_string(), Location::new(*n)))
            .collect()
    }

    fn run(root: &str, links: &[Link], names: &[&str]) -> Outcome<Vec<LogicalLink>> {
        let orientation = orient(root, links, 64).value;
        coalesce(&orientation, &orientation.links, &locations(names))
    }

    fn find<'a>(logical: &'a [LogicalLink], to: &str) -> &'a LogicalLink {
        logical.iter().find(|l| l.to_location == to).unwrap()
    }

    #[test]
    fn test_core_fan_out_scenario() {
        let links = vec![
            Link::new("Core", "A", Medium::Fibre, 100.0).with_cores(2),
            Link::new("A", "B", Medium::Fibre, 40.0).aggregated(),
            Link::new("A", "C", Medium::Fibre, 60.0),
        ];
        let outcome = run("Core", &links, &["Core", "A", "B", "C"]);
        let logical = &outcome.value;
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(logical.len(), 3);

        let b = find(logical, "B");
        assert_eq!(b.from_location, "A");
        assert_eq!(b.couplers, 0);
        assert_eq!(b.segment_count(), 1);

        let c = find(logical, "C");
        assert_eq!(c.from_location, "Core");
        assert_eq!(c.segment_count(), 2);
        assert_eq!(c.couplers, 1);
        assert_eq!(c.total_length, 160.0);
        assert_eq!(c.link_indices, vec![2, 0]);

        let a = find(logical, "A");
        assert_eq!(a.from_location, "Core");
        assert_eq!(a.couplers, 0);
    }

    #[test]
    fn test_medium_change_splits_circuit() {
        // Leaf to root: Fibre, Fibre, Copper, Fibre.
        let links = vec![
            Link::new("Core", "L1", Medium::Fibre, 10.0),
            Link::new("L1", "L2", Medium::Copper, 20.0),
            Link::new("L2", "L3", Medium::Fibre, 30.0),
            Link::new("L3", "L4", Medium::Fibre, 40.0),
        ];
        let outcome = run("Core", &links, &["Core", "L1", "L2", "L3", "L4"]);
        let route = route_to_root(&outcome.value, "L4");

        assert_eq!(route.len(), 3);
        assert_eq!(route[0].from_location, "L2");
        assert_eq!(route[0].medium, Medium::Fibre);
        assert_eq!(route[0].couplers, 1);
        assert_eq!(route[1].from_location, "L1");
        assert_eq!(route[1].medium, Medium::Copper);
        assert_eq!(route[2].from_location, "Core");
        assert_eq!(route[2].medium, Medium::Fibre);
    }

    #[test]
    fn test_copper_is_always_single_hop() {
        let links = vec![
            Link::new("Core", "A", Medium::Copper, 30.0),
            Link::new("A", "B", Medium::Copper, 30.0),
        ];
        let outcome = run("Core", &links, &["Core", "A", "B"]);
        let b = find(&outcome.value, "B");
        assert_eq!(b.from_location, "A");
        assert_eq!(b.couplers, 0);
    }

    #[test]
    fn test_unreachable_location_is_untraceable() {
        let links = vec![Link::new("Core", "A", Medium::Fibre, 1.0)];
        let outcome = run("Core", &links, &["Core", "A", "Island"]);
        assert_eq!(outcome.value.len(), 1);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::UntraceableLogicalLink {
                location: "Island".to_string()
            }]
        );
    }
}

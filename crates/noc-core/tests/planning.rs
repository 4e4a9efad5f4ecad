use noc_core::config::NocConfig;
use noc_core::diagnostics::{Diagnostic, Endpoint};
use noc_core::graph::{LinkState, Medium};
use noc_core::plan::{NetworkPlan, PlanError};
use noc_core::provider::{FeatureSet, MemoryProvider};
use noc_core::storage;
use std::path::Path;

fn site() -> FeatureSet {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site.json");
    storage::load_features(&path).unwrap()
}

fn config() -> NocConfig {
    let mut config = NocConfig::default();
    config.topology.core = Some("Core".to_string());
    config
}

fn generate() -> NetworkPlan {
    NetworkPlan::generate(&MemoryProvider::new(site()), &config()).unwrap()
}

#[test]
fn test_loads_locations_and_links() {
    let plan = generate();
    assert_eq!(plan.locations.len(), 6);
    assert!(plan.locations.contains_key("1A4"), "unnamed switch uses its feature id");
    assert!(!plan.locations.contains_key("WC"), "non-NOC layers are ignored");
    assert_eq!(plan.links.len(), 4, "the link with a dangling start is dropped");
    assert_eq!(plan.locations["Bar"].cores_required, 2);
}

#[test]
fn test_links_point_away_from_core() {
    let plan = generate();
    let depth = |name: &str| {
        plan.route_to_root(name)
            .iter()
            .map(|l| l.segment_count())
            .sum::<usize>()
    };
    for (link, state) in plan.links.iter().zip(&plan.link_states) {
        assert_eq!(*state, LinkState::Tree);
        assert!(
            depth(&link.from_location) < depth(&link.to_location),
            "{} -> {} is not oriented away from the core",
            link.from_location,
            link.to_location
        );
    }
    assert_eq!(plan.links[0].from_location, "Core");
    assert_eq!(plan.links[0].to_location, "Bar");
}

#[test]
fn test_required_cores() {
    let plan = generate();
    assert_eq!(plan.required_cores["Stage"], 1);
    assert_eq!(plan.required_cores["Camping"], 1);
    assert_eq!(plan.required_cores["Bar"], 4);
    assert_eq!(plan.required_cores["Core"], 5);
    assert_eq!(plan.links[0].cores_used, Some(4));
    assert_eq!(plan.links[3].cores_used, None, "copper carries no fibre demand");
}

#[test]
fn test_logical_links() {
    let plan = generate();
    assert_eq!(plan.logical_links.len(), 4);

    let camping = plan.logical_link("Camping").unwrap();
    assert_eq!(camping.from_location, "Core");
    assert_eq!(camping.couplers, 1);
    assert_eq!(camping.total_length, 200.0);

    let stage = plan.logical_link("Stage").unwrap();
    assert_eq!(stage.from_location, "Bar");
    assert_eq!(stage.couplers, 0);

    let edge = plan.logical_link("1A4").unwrap();
    assert_eq!(edge.medium, Medium::Copper);
    assert_eq!(edge.total_length, 61.0);

    let route = plan.route_to_root("1A4");
    assert_eq!(route.len(), 2);
    assert_eq!(route[1].from_location, "Core");
}

#[test]
fn test_warnings_in_stage_order() {
    let plan = generate();
    let diagnostics = &plan.report.diagnostics;
    assert_eq!(diagnostics.len(), 3);
    assert!(matches!(diagnostics[0], Diagnostic::MissingIdentifier { .. }));
    assert!(matches!(
        diagnostics[1],
        Diagnostic::UnresolvedEndpoint {
            endpoint: Endpoint::Start,
            matches: 0,
            ..
        }
    ));
    assert_eq!(
        diagnostics[2],
        Diagnostic::UntraceableLogicalLink {
            location: "Shed".to_string()
        }
    );
    assert_eq!(plan.warnings().len(), 3);
}

#[test]
fn test_summary() {
    let plan = generate();
    let s = &plan.report.summary;
    assert_eq!(s.locations, 6);
    assert_eq!(s.deployed_locations, 5);
    assert_eq!(s.physical(Medium::Fibre).count, 3);
    assert_eq!(s.physical(Medium::Fibre).length, 280.0);
    assert_eq!(s.physical(Medium::Fibre).cores, 6);
    assert_eq!(s.physical(Medium::Copper).count, 1);
    assert_eq!(s.logical(Medium::Fibre).count, 3);
    assert_eq!(s.logical(Medium::Fibre).length, 380.0);
    assert_eq!(s.total_couplers, 1);
    assert_eq!(s.unreachable_links, 0);
}

#[test]
fn test_missing_layers_is_fatal() {
    let provider = MemoryProvider::new(site());
    let mut config = config();
    config.layers.prefix = "Power".to_string();
    let err = NetworkPlan::generate(&provider, &config).unwrap_err();
    assert!(matches!(err, PlanError::MissingLayers { .. }));
}

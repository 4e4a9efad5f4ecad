use noc_core::config::NocConfig;
use noc_core::graph::{Link, Location, Medium};
use noc_core::loader::Topology;
use noc_core::plan::NetworkPlan;
use noc_core::{schema, storage};
use tempfile::TempDir;

fn small_plan() -> NetworkPlan {
    let mut config = NocConfig::default();
    config.topology.core = Some("Core".to_string());
    let topology = Topology {
        locations: ["Core", "A", "B"]
            .iter()
            .map(|n| (n.to_string(), Location::new(*n)))
            .collect(),
        links: vec![
            Link::new("A", "Core", Medium::Fibre, 120.0).with_cores(1),
            Link::new("A", "B", Medium::Copper, 35.0),
        ],
    };
    NetworkPlan::from_topology(topology, Vec::new(), &config).unwrap()
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let plan = small_plan();

    storage::save(root, &plan).unwrap();
    assert!(storage::plan_exists(root));

    let loaded = storage::load(root).unwrap();
    assert_eq!(loaded.root, "Core");
    assert_eq!(loaded.links, plan.links);
    assert_eq!(loaded.logical_links, plan.logical_links);
    assert_eq!(loaded.report, plan.report);
    assert_eq!(loaded.required_cores["Core"], 2);
}

#[test]
fn test_load_rejects_other_version() {
    let mut plan = small_plan();
    plan.version = "0.1.0".to_string();
    let json = schema::to_json(&plan).unwrap();
    let err = schema::from_json(&json).unwrap_err();
    assert!(err.to_string().contains("version mismatch"));
}

#[test]
fn test_load_missing_plan_fails() {
    let tmp = TempDir::new().unwrap();
    assert!(!storage::plan_exists(tmp.path()));
    assert!(storage::load(tmp.path()).is_err());
}

#[test]
fn test_load_features_reports_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("features.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = storage::load_features(&path).unwrap_err();
    assert!(err.to_string().contains("features.json"));
}

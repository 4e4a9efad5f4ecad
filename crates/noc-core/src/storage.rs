//! Read site-plan feature files and read/write plan snapshots on disk.

use crate::plan::NetworkPlan;
use crate::provider::FeatureSet;
use crate::schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const NOC_DIR: &str = ".noc";
const PLAN_FILE: &str = "plan.json";

/// Get the path to the planner directory for a given project root.
pub fn noc_dir(project_root: &Path) -> PathBuf {
    project_root.join(NOC_DIR)
}

/// Get the path to the saved plan for a given project root.
pub fn plan_file(project_root: &Path) -> PathBuf {
    noc_dir(project_root).join(PLAN_FILE)
}

/// Check if a plan has been saved under the given project root.
pub fn plan_exists(project_root: &Path) -> bool {
    plan_file(project_root).exists()
}

/// Load a site-plan feature export.
pub fn load_features(path: &Path) -> Result<FeatureSet> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read features from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse features in {}", path.display()))
}

/// Load a plan from disk.
pub fn load(project_root: &Path) -> Result<NetworkPlan> {
    let path = plan_file(project_root);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("failed to read plan from {}", path.display()))?;
    schema::from_json(&json)
}

/// Save a plan to disk, creating the .noc directory if needed.
pub fn save(project_root: &Path, plan: &NetworkPlan) -> Result<()> {
    let dir = noc_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create plan directory {}", dir.display()))?;

    let path = plan_file(project_root);
    let json = schema::to_json(plan)?;
    fs::write(&path, json).with_context(|| format!("failed to write plan to {}", path.display()))?;

    Ok(())
}

//! Version handling and JSON encoding for plan snapshots.

use crate::plan::NetworkPlan;
use anyhow::{Context, Result};

pub const CURRENT_VERSION: &str = "1.0.0";

/// Validate a plan snapshot's schema version.
pub fn validate_version(plan: &NetworkPlan) -> Result<()> {
    if plan.version != CURRENT_VERSION {
        anyhow::bail!(
            "plan version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            plan.version
        );
    }
    Ok(())
}

/// Check that a decoded plan hangs together: one state per link, a known root,
/// and logical links that only reference known locations.
pub fn validate_structure(plan: &NetworkPlan) -> Result<()> {
    if plan.links.len() != plan.link_states.len() {
        anyhow::bail!(
            "plan has {} links but {} link states",
            plan.links.len(),
            plan.link_states.len()
        );
    }
    if !plan.locations.contains_key(&plan.root) {
        anyhow::bail!("plan root {} is not a known location", plan.root);
    }
    for logical in &plan.logical_links {
        for end in [&logical.from_location, &logical.to_location] {
            if !plan.locations.contains_key(end) {
                anyhow::bail!(
                    "logical link {} -> {} references unknown location {}",
                    logical.from_location,
                    logical.to_location,
                    end
                );
            }
        }
    }
    Ok(())
}

/// Serialize a plan to a pretty-printed JSON string.
pub fn to_json(plan: &NetworkPlan) -> Result<String> {
    serde_json::to_string_pretty(plan).context("failed to serialize plan to JSON")
}

/// Deserialize a plan from a JSON string.
pub fn from_json(json: &str) -> Result<NetworkPlan> {
    let plan: NetworkPlan =
        serde_json::from_str(json).context("failed to deserialize plan from JSON")?;
    validate_version(&plan)?;
    validate_structure(&plan)?;
    Ok(plan)
}

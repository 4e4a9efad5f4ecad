//! Planning pipeline: load → orient → validate capacity → coalesce → report.

use crate::capacity;
use crate::coalesce;
use crate::config::NocConfig;
use crate::diagnostics::{self, Diagnostic};
use crate::graph::{Link, LinkState, Location, LogicalLink};
use crate::loader::{self, Topology};
use crate::orient;
use crate::provider::{ProviderError, SpatialProvider};
use crate::report::{self, Report, ReportInput};
use crate::schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Conditions that stop a planning run before any traversal starts.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("unable to locate all required NOC layers with prefix '{prefix}'. Layers discovered: {found:?}")]
    MissingLayers { prefix: String, found: Vec<String> },
    #[error("no locations found on the location layer")]
    NoLocations,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// The oriented, validated and coalesced network produced by one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPlan {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    /// The location the tree is rooted at.
    pub root: String,
    pub locations: BTreeMap<String, Location>,
    /// Physical links, oriented away from the root, `cores_used` filled in.
    pub links: Vec<Link>,
    /// Orientation classification of each link in `links`.
    pub link_states: Vec<LinkState>,
    /// Fibre cores required at each reachable location, subtree included.
    pub required_cores: BTreeMap<String, u32>,
    pub logical_links: Vec<LogicalLink>,
    pub report: Report,
}

impl NetworkPlan {
    /// Run every stage against a spatial provider.
    pub fn generate(provider: &dyn SpatialProvider, config: &NocConfig) -> Result<Self, PlanError> {
        let layers = loader::detect_layers(provider, &config.layers.prefix)?;
        let mut diagnostics = Vec::new();
        let topology =
            loader::load(provider, &layers, &config.topology)?.drain_into(&mut diagnostics);
        Self::from_topology(topology, diagnostics, config)
    }

    /// Run orientation onwards over an already loaded topology.
    ///
    /// `diagnostics` holds anything raised while loading; later stages append to it.
    pub fn from_topology(
        topology: Topology,
        mut diagnostics: Vec<Diagnostic>,
        config: &NocConfig,
    ) -> Result<Self, PlanError> {
        let start = Instant::now();
        let Topology { locations, links } = topology;
        let root = resolve_root(&locations, config.topology.core.as_deref(), &mut diagnostics)?;

        let orientation =
            orient::orient(&root, &links, config.topology.max_depth).drain_into(&mut diagnostics);
        let checked = capacity::validate(&orientation, &locations).drain_into(&mut diagnostics);
        let logical_links = coalesce::coalesce(&orientation, &checked.links, &locations)
            .drain_into(&mut diagnostics);

        let report = report::aggregate(ReportInput {
            locations: &locations,
            links: &checked.links,
            states: &orientation.states,
            logical_links: &logical_links,
            diagnostics,
            copper: &config.copper,
        });

        info!(
            "Plan generated in {:.2} seconds with {} warnings",
            start.elapsed().as_secs_f64(),
            report.warnings.len()
        );

        Ok(Self {
            version: schema::CURRENT_VERSION.to_string(),
            generated_at: Utc::now(),
            root,
            locations,
            links: checked.links,
            link_states: orientation.states,
            required_cores: checked.required,
            logical_links,
            report,
        })
    }

    /// The logical link serving `location`.
    pub fn logical_link(&self, location: &str) -> Option<&LogicalLink> {
        self.logical_links
            .iter()
            .find(|l| l.to_location == location)
    }

    /// Logical links from `location` back to the root, nearest first.
    pub fn route_to_root(&self, location: &str) -> Vec<&LogicalLink> {
        coalesce::route_to_root(&self.logical_links, location)
    }

    pub fn warnings(&self) -> &[String] {
        &self.report.warnings
    }
}

/// Pick the configured core, or fall back to the first location by name.
fn resolve_root(
    locations: &BTreeMap<String, Location>,
    requested: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<String, PlanError> {
    if let Some(name) = requested
        && locations.contains_key(name)
    {
        return Ok(name.to_string());
    }

    let fallback = locations.keys().next().ok_or(PlanError::NoLocations)?.clone();
    diagnostics::record(
        diagnostics,
        Diagnostic::UnresolvedRoot {
            requested: requested.unwrap_or("<unset>").to_string(),
            fallback: fallback.clone(),
        },
    );
    Ok(fallback)
}

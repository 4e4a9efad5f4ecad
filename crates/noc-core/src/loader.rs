//! Topology loading: site-plan features → locations and physical links.

use crate::config::TopologyConfig;
use crate::diagnostics::{self, Diagnostic, Endpoint, Outcome};
use crate::graph::{Link, Location, Medium};
use crate::plan::PlanError;
use crate::provider::{Coordinate, LineFeature, SpatialProvider};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Layer suffixes (after the configured prefix) that hold location points.
const LOCATION_SUFFIXES: &[&str] = &["switch", "location"];

/// The NOC layers discovered in a site plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSet {
    pub location_layer: String,
    /// Link layer name → medium.
    pub link_layers: BTreeMap<String, Medium>,
}

impl LayerSet {
    pub fn link_layer_names(&self) -> Vec<String> {
        self.link_layers.keys().cloned().collect()
    }
}

/// Locations and physical links as captured, before orientation.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub locations: BTreeMap<String, Location>,
    pub links: Vec<Link>,
}

/// Find the location layer and the copper/fibre link layers under `prefix`.
pub fn detect_layers(provider: &dyn SpatialProvider, prefix: &str) -> Result<LayerSet, PlanError> {
    let layers = provider.list_layers(prefix)?;

    let mut location_layer = None;
    let mut link_layers = BTreeMap::new();
    for layer in &layers {
        let Some(suffix) = layer.strip_prefix(prefix) else {
            continue;
        };
        if LOCATION_SUFFIXES.contains(&suffix.to_lowercase().as_str()) {
            location_layer = Some(layer.clone());
        } else if let Some(medium) = Medium::from_layer_suffix(suffix) {
            link_layers.insert(layer.clone(), medium);
        }
    }

    match location_layer {
        Some(location_layer) if !link_layers.is_empty() => {
            info!(
                "NOC layers detected. Locations: '{}', Links: {:?}",
                location_layer,
                link_layers.keys().collect::<Vec<_>>()
            );
            Ok(LayerSet {
                location_layer,
                link_layers,
            })
        }
        _ => Err(PlanError::MissingLayers {
            prefix: prefix.to_string(),
            found: layers,
        }),
    }
}

/// Load locations and links from the provider.
///
/// Links whose endpoints do not resolve to exactly one location are dropped with a
/// diagnostic; everything else that is malformed is defaulted and reported.
pub fn load(
    provider: &dyn SpatialProvider,
    layers: &LayerSet,
    config: &TopologyConfig,
) -> Result<Outcome<Topology>, PlanError> {
    let mut diagnostics = Vec::new();
    let mut topology = Topology::default();

    info!("Loading locations");
    for point in provider.points_in_layer(&layers.location_layer)? {
        let name = match point.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                diagnostics::record(
                    &mut diagnostics,
                    Diagnostic::MissingIdentifier {
                        feature_id: point.feature_id.clone(),
                        layer: point.layer.clone(),
                    },
                );
                point.feature_id.clone()
            }
        };

        if topology.locations.contains_key(&name) {
            diagnostics::record(
                &mut diagnostics,
                Diagnostic::DuplicateLocation {
                    name,
                    feature_id: point.feature_id,
                },
            );
            continue;
        }

        topology.locations.insert(
            name.clone(),
            Location {
                name,
                cores_required: point.cores_required.unwrap_or(1).max(1),
                deployed: point.deployed,
                feature_id: point.feature_id,
            },
        );
    }

    info!("Loading links");
    for line in provider.lines_in_layer(&layers.link_layer_names())? {
        let Some(&medium) = layers.link_layers.get(&line.layer) else {
            continue;
        };

        let from = resolve_endpoint(
            provider,
            layers,
            config,
            &line,
            Endpoint::Start,
            &mut diagnostics,
        )?;
        let to = resolve_endpoint(
            provider,
            layers,
            config,
            &line,
            Endpoint::End,
            &mut diagnostics,
        )?;
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };

        debug!("Link {} from {} to {}", line.feature_id, from, to);

        let length =
            line.length + f64::from(line.updowns.unwrap_or(0)) * config.updown_length;
        let cores = match (line.cores, medium) {
            (Some(cores), _) => cores,
            (None, Medium::Fibre) => {
                diagnostics::record(
                    &mut diagnostics,
                    Diagnostic::MissingCapacity {
                        from: from.clone(),
                        to: to.clone(),
                    },
                );
                1
            }
            (None, Medium::Copper) => 1,
        };

        topology.links.push(Link {
            from_location: from,
            to_location: to,
            medium,
            length,
            cores,
            cores_used: None,
            deployed: line.deployed,
            aggregated: line.aggregated,
            fibre_name: line.fibre_name,
            feature_id: line.feature_id,
            layer: line.layer,
        });
    }

    info!(
        "Loaded {} locations and {} links",
        topology.locations.len(),
        topology.links.len()
    );
    Ok(Outcome::new(topology, diagnostics))
}

/// Resolve one end of a line to a single location name.
fn resolve_endpoint(
    provider: &dyn SpatialProvider,
    layers: &LayerSet,
    config: &TopologyConfig,
    line: &LineFeature,
    endpoint: Endpoint,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<String>, PlanError> {
    let coordinate: Coordinate = match endpoint {
        Endpoint::Start => line.start,
        Endpoint::End => line.end,
    };
    let mut matches =
        provider.nearest_point_in_layer(&layers.location_layer, coordinate, config.buffer)?;

    if matches.len() == 1 {
        return Ok(matches.pop());
    }
    diagnostics::record(
        diagnostics,
        Diagnostic::UnresolvedEndpoint {
            feature_id: line.feature_id.clone(),
            layer: line.layer.clone(),
            endpoint,
            matches: matches.len(),
        },
    );
    Ok(None)
}

//! Spatial feature provider abstraction.
//!
//! The planner never reads geometry itself; it asks a provider which layers exist,
//! which features they hold, and which location points sit near a line endpoint.
//! [`MemoryProvider`] answers those questions from a [`FeatureSet`] loaded from JSON.

use serde::{Deserialize, Serialize};

/// Errors from spatial provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("layer not found: {0}")]
    UnknownLayer(String),
}

/// A planar coordinate in site-plan units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A point feature on a location layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub feature_id: String,
    pub layer: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cores_required: Option<u32>,
    #[serde(default = "default_true")]
    pub deployed: bool,
    #[serde(default)]
    pub position: Coordinate,
}

/// A line feature on a link layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub feature_id: String,
    pub layer: String,
    /// Geometric length, site-plan units (metres).
    pub length: f64,
    #[serde(default)]
    pub cores: Option<u32>,
    /// Number of festoon pole up-and-downs along the run.
    #[serde(default)]
    pub updowns: Option<u32>,
    #[serde(default)]
    pub aggregated: bool,
    #[serde(default)]
    pub fibre_name: Option<String>,
    #[serde(default = "default_true")]
    pub deployed: bool,
    pub start: Coordinate,
    pub end: Coordinate,
}

fn default_true() -> bool {
    true
}

/// Source of site-plan features. Calls are synchronous and may block.
pub trait SpatialProvider {
    /// All layer names starting with `prefix`.
    fn list_layers(&self, prefix: &str) -> Result<Vec<String>, ProviderError>;

    /// Point features on a layer.
    fn points_in_layer(&self, layer: &str) -> Result<Vec<PointFeature>, ProviderError>;

    /// Line features on any of the given layers, in source order.
    fn lines_in_layer(&self, layers: &[String]) -> Result<Vec<LineFeature>, ProviderError>;

    /// Names of points on `layer` within `buffer` of `coordinate`.
    fn nearest_point_in_layer(
        &self,
        layer: &str,
        coordinate: Coordinate,
        buffer: f64,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Raw site-plan features as exported from the drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub points: Vec<PointFeature>,
    #[serde(default)]
    pub lines: Vec<LineFeature>,
}

/// In-memory provider over a [`FeatureSet`].
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    features: FeatureSet,
}

impl MemoryProvider {
    pub fn new(features: FeatureSet) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    fn has_layer(&self, layer: &str) -> bool {
        self.features.points.iter().any(|p| p.layer == layer)
            || self.features.lines.iter().any(|l| l.layer == layer)
    }

    fn require_layer(&self, layer: &str) -> Result<(), ProviderError> {
        if self.has_layer(layer) {
            Ok(())
        } else {
            Err(ProviderError::UnknownLayer(layer.to_string()))
        }
    }
}

impl SpatialProvider for MemoryProvider {
    fn list_layers(&self, prefix: &str) -> Result<Vec<String>, ProviderError> {
        let mut layers: Vec<String> = self
            .features
            .points
            .iter()
            .map(|p| p.layer.as_str())
            .chain(self.features.lines.iter().map(|l| l.layer.as_str()))
            .filter(|layer| layer.starts_with(prefix))
            .map(str::to_string)
            .collect();
        layers.sort();
        layers.dedup();
        Ok(layers)
    }

    fn points_in_layer(&self, layer: &str) -> Result<Vec<PointFeature>, ProviderError> {
        self.require_layer(layer)?;
        Ok(self
            .features
            .points
            .iter()
            .filter(|p| p.layer == layer)
            .cloned()
            .collect())
    }

    fn lines_in_layer(&self, layers: &[String]) -> Result<Vec<LineFeature>, ProviderError> {
        for layer in layers {
            self.require_layer(layer)?;
        }
        Ok(self
            .features
            .lines
            .iter()
            .filter(|l| layers.contains(&l.layer))
            .cloned()
            .collect())
    }

    fn nearest_point_in_layer(
        &self,
        layer: &str,
        coordinate: Coordinate,
        buffer: f64,
    ) -> Result<Vec<String>, ProviderError> {
        self.require_layer(layer)?;
        // Unnamed points fall back to their feature id, matching the loader.
        Ok(self
            .features
            .points
            .iter()
            .filter(|p| p.layer == layer && p.position.distance(&coordinate) <= buffer)
            .map(|p| match &p.name {
                Some(name) if !name.trim().is_empty() => name.clone(),
                _ => p.feature_id.clone(),
            })
            .collect())
    }
}

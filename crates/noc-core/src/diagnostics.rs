//! Non-fatal planning diagnostics and the per-stage `Outcome` wrapper.
//!
//! Every stage returns its value together with the diagnostics it raised. None of
//! these abort a run; they are collected for operator review.

use serde::{Deserialize, Serialize};

/// Which end of a line feature failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// A recoverable problem found while planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("location name not found in feature {feature_id} on {layer} layer, using feature id")]
    MissingIdentifier { feature_id: String, layer: String },

    #[error("location {name} is defined more than once (feature {feature_id} ignored)")]
    DuplicateLocation { name: String, feature_id: String },

    #[error("{}", unresolved_endpoint(.feature_id, .layer, .endpoint, .matches))]
    UnresolvedEndpoint {
        feature_id: String,
        layer: String,
        endpoint: Endpoint,
        matches: usize,
    },

    #[error("fibre link from {from} to {to} had no cores, assuming 1")]
    MissingCapacity { from: String, to: String },

    #[error("configured core location {requested} not found, using {fallback}")]
    UnresolvedRoot { requested: String, fallback: String },

    #[error("location {location} has a loop of links")]
    CycleDetected { location: String },

    #[error("location {location} is deeper than {max_depth} links from the core, branch skipped")]
    DepthLimitExceeded { location: String, max_depth: usize },

    #[error("link {feature_id} between {a} and {b} is not connected to the core")]
    UnreachableLink {
        feature_id: String,
        a: String,
        b: String,
    },

    #[error("link from {from} to {to} requires {required} cores but has {provisioned}")]
    CapacityShortfall {
        from: String,
        to: String,
        required: u32,
        provisioned: u32,
    },

    #[error("unable to trace logical uplink for {location}")]
    UntraceableLogicalLink { location: String },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn unresolved_endpoint(
    feature_id: &str,
    layer: &str,
    endpoint: &Endpoint,
    matches: &usize,
) -> String {
    if *matches == 0 {
        format!(
            "link {} on {} layer does not {} at a location",
            feature_id,
            layer,
            endpoint.verb()
        )
    } else {
        format!(
            "link {} on {} layer {}s at {} locations",
            feature_id,
            layer,
            endpoint.verb(),
            matches
        )
    }
}

/// A stage result paired with the diagnostics raised while producing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Move this outcome's diagnostics onto `sink` and return the value.
    pub fn drain_into(self, sink: &mut Vec<Diagnostic>) -> T {
        sink.extend(self.diagnostics);
        self.value
    }
}

/// Record a diagnostic and log it.
pub(crate) fn record(sink: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!("{}", diagnostic);
    sink.push(diagnostic);
}

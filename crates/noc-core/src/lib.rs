//! Core engine for planning and auditing a site-plan cable network.
//!
//! Loads locations and cable runs from a [`provider::SpatialProvider`], orients the
//! links away from the network core ([`orient`]), checks fibre core capacity
//! ([`capacity`]), coalesces physical runs into logical circuits ([`coalesce`]),
//! and tallies the result for report generators ([`report`]). The [`plan`]
//! module threads the stages together.

pub mod capacity;
pub mod coalesce;
pub mod config;
pub mod diagnostics;
pub mod graph;
pub mod loader;
pub mod orient;
pub mod plan;
pub mod provider;
pub mod report;
pub mod schema;
pub mod storage;

//! Configuration for layer detection, topology resolution and loss budgets.
//!
//! Load order: `.noc/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NocConfig {
    pub layers: LayerConfig,
    pub topology: TopologyConfig,
    pub loss: LossConfig,
    pub copper: CopperConfig,
}

/// Which site-plan layers hold NOC features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Prefix shared by all NOC layers, e.g. `NOC` for `NOCSwitch`, `NOCFibre`.
    pub prefix: String,
}

/// Topology resolution and traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Name of the root location (the network core).
    pub core: Option<String>,
    /// Search radius around a line endpoint when resolving its location.
    pub buffer: f64,
    /// Metres added per up-and-down of a festoon pole.
    pub updown_length: f64,
    /// Deepest tree level traversed before a branch is abandoned.
    pub max_depth: usize,
}

/// Optical loss budget used by [`crate::graph::LogicalLink::loss`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LossConfig {
    /// Attenuation per coupler (splice/patch point), dB.
    pub coupler_db: f64,
    /// Attenuation per kilometre of fibre, dB.
    pub fibre_db_per_km: f64,
}

/// Copper run length thresholds, metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CopperConfig {
    /// Runs up to this length may use copper-clad aluminium.
    pub cca_max_length: f64,
    /// Runs longer than this are flagged as long.
    pub warning_length: f64,
    /// Runs longer than this are flagged as critical.
    pub critical_length: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            prefix: "NOC".to_string(),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            core: None,
            buffer: 1.0,
            updown_length: 6.0,
            max_depth: 4096,
        }
    }
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            coupler_db: 0.75,
            fibre_db_per_km: 3.5,
        }
    }
}

impl Default for CopperConfig {
    fn default() -> Self {
        Self {
            cca_max_length: 30.0,
            warning_length: 70.0,
            critical_length: 90.0,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl NocConfig {
    /// Load config from `.noc/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".noc").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        // Environment variable overrides
        env_override("NOC_LAYER_PREFIX", &mut config.layers.prefix);
        if let Ok(core) = std::env::var("NOC_CORE")
            && !core.trim().is_empty()
        {
            config.topology.core = Some(core);
        }
        env_override("NOC_BUFFER", &mut config.topology.buffer);
        env_override("NOC_UPDOWN_LENGTH", &mut config.topology.updown_length);
        env_override("NOC_MAX_DEPTH", &mut config.topology.max_depth);
        env_override("NOC_COUPLER_DB", &mut config.loss.coupler_db);
        env_override("NOC_FIBRE_DB_PER_KM", &mut config.loss.fibre_db_per_km);

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the planner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.topology.buffer <= 0.0 {
            anyhow::bail!(
                "topology.buffer ({}) must be positive",
                self.topology.buffer
            );
        }
        if self.topology.max_depth == 0 {
            anyhow::bail!("topology.max_depth must be at least 1");
        }
        if self.copper.warning_length >= self.copper.critical_length {
            anyhow::bail!(
                "copper.warning_length ({}) must be less than copper.critical_length ({})",
                self.copper.warning_length,
                self.copper.critical_length,
            );
        }
        Ok(())
    }
}

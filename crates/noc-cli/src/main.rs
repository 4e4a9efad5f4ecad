//! CLI binary for noc-planner: orient, validate and coalesce site network cabling.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noc_core::config::NocConfig;
use noc_core::graph::{LinkState, Medium};
use noc_core::plan::NetworkPlan;
use noc_core::provider::MemoryProvider;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "noc-planner", about = "Site network cabling planner")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a plan from a site-plan feature export
    Plan {
        /// JSON file with point and line features
        #[arg(short, long)]
        features: PathBuf,

        /// Root location (overrides topology.core from config)
        #[arg(long)]
        core: Option<String>,

        /// Print the full plan as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Write the plan to .noc/plan.json
        #[arg(long)]
        save: bool,
    },

    /// Show statistics for the saved plan
    Info,

    /// List warnings raised while generating the saved plan
    Warnings,

    /// Show the logical links from a location back to the core
    Trace {
        /// Location name
        location: String,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;

    match cli.command {
        Commands::Plan {
            features,
            core,
            json,
            save,
        } => cmd_plan(&project_root, &features, core, json, save),
        Commands::Info => cmd_info(&project_root),
        Commands::Warnings => cmd_warnings(&project_root),
        Commands::Trace { location } => cmd_trace(&project_root, &location),
    }
}

fn load_saved(project_root: &Path) -> Result<NetworkPlan> {
    if !noc_core::storage::plan_exists(project_root) {
        anyhow::bail!("No plan found. Run `noc-planner plan --features <file> --save` first.");
    }
    noc_core::storage::load(project_root)
}

fn cmd_plan(
    project_root: &Path,
    features: &Path,
    core: Option<String>,
    json: bool,
    save: bool,
) -> Result<()> {
    let mut config = NocConfig::load(project_root)?;
    if core.is_some() {
        config.topology.core = core;
    }

    let provider = MemoryProvider::new(noc_core::storage::load_features(features)?);
    debug!(
        "Loaded {} points and {} lines from {}",
        provider.features().points.len(),
        provider.features().lines.len(),
        features.display()
    );

    let plan = NetworkPlan::generate(&provider, &config)
        .with_context(|| format!("failed to plan network from {}", features.display()))?;

    if json {
        println!("{}", noc_core::schema::to_json(&plan)?);
    } else {
        print_summary(&plan, &config);
        for warning in plan.warnings() {
            eprintln!("WARN: {}", warning);
        }
    }

    if save {
        noc_core::storage::save(project_root, &plan)?;
        eprintln!(
            "Saved plan to {}",
            noc_core::storage::plan_file(project_root).display()
        );
    }

    Ok(())
}

fn print_summary(plan: &NetworkPlan, config: &NocConfig) {
    let summary = &plan.report.summary;

    println!("Plan v{}", plan.version);
    println!("Generated: {}", plan.generated_at);
    println!("Core: {}", plan.root);
    println!(
        "Core fibre demand: {} cores",
        plan.required_cores.get(&plan.root).copied().unwrap_or_default()
    );
    println!();
    println!(
        "Locations: {} ({} deployed)",
        summary.locations, summary.deployed_locations
    );
    for medium in [Medium::Fibre, Medium::Copper] {
        let physical = summary.physical(medium);
        let logical = summary.logical(medium);
        println!(
            "{}: {} physical links ({} deployed, {:.0} m, {} cores), {} logical links ({:.0} m)",
            medium,
            physical.count,
            physical.deployed,
            physical.length,
            physical.cores,
            logical.count,
            logical.length
        );
    }
    println!("Couplers: {}", summary.total_couplers);
    if summary.long_copper_links > 0 || summary.critical_copper_links > 0 {
        println!(
            "Copper over {:.0} m: {} (over {:.0} m: {})",
            config.copper.warning_length,
            summary.long_copper_links,
            config.copper.critical_length,
            summary.critical_copper_links
        );
    }
    if summary.unreachable_links + summary.cyclic_links + summary.depth_limited_links > 0 {
        println!(
            "Links outside the tree: {} unreachable, {} cyclic, {} past depth limit",
            summary.unreachable_links, summary.cyclic_links, summary.depth_limited_links
        );
    }
    println!("Warnings: {}", plan.warnings().len());
}

fn cmd_info(project_root: &Path) -> Result<()> {
    let plan = load_saved(project_root)?;
    let config = NocConfig::load(project_root)?;
    print_summary(&plan, &config);

    if !plan.logical_links.is_empty() {
        println!("\nLogical links:");
        for link in &plan.logical_links {
            let loss = link
                .loss(&config.loss)
                .map(|db| format!(", {:.2} dB", db))
                .unwrap_or_default();
            println!(
                "  {} <- {} [{}] {:.0} m, {} segments, {} couplers{}",
                link.to_location,
                link.from_location,
                link.medium,
                link.total_length,
                link.segment_count(),
                link.couplers,
                loss
            );
        }
    }

    Ok(())
}

fn cmd_warnings(project_root: &Path) -> Result<()> {
    let plan = load_saved(project_root)?;

    if plan.warnings().is_empty() {
        eprintln!("No warnings. The plan is consistent.");
        return Ok(());
    }
    for warning in plan.warnings() {
        println!("WARN: {}", warning);
    }
    for (link, state) in plan.links.iter().zip(&plan.link_states) {
        if *state != LinkState::Tree {
            debug!("{} link {} is {:?}", link.medium, link.feature_id, state);
        }
    }
    eprintln!("\n{} warnings", plan.warnings().len());

    Ok(())
}

fn cmd_trace(project_root: &Path, location: &str) -> Result<()> {
    let plan = load_saved(project_root)?;
    let config = NocConfig::load(project_root)?;

    if !plan.locations.contains_key(location) {
        anyhow::bail!("Location not found: {}", location);
    }
    if location == plan.root {
        println!("{} is the network core.", location);
        return Ok(());
    }

    let route = plan.route_to_root(location);
    if route.is_empty() {
        anyhow::bail!("{} is not connected to {}", location, plan.root);
    }

    let required = plan
        .required_cores
        .get(location)
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    println!("{} (requires {} cores)", location, required);
    for logical in &route {
        println!(
            "  <- {} [{}] {:.0} m, {} couplers",
            logical.from_location, logical.medium, logical.total_length, logical.couplers
        );
        if let Some(db) = logical.loss(&config.loss) {
            println!("     estimated loss {:.2} dB", db);
        }
        for physical in &logical.physical_links {
            let name = physical.fibre_name.as_deref().unwrap_or(&physical.feature_id);
            println!(
                "     {} -> {}: {} {} {:.0} m, {} of {} cores{}",
                physical.from_location,
                physical.to_location,
                name,
                physical.subtype(&config.copper),
                physical.length,
                physical.cores_used.unwrap_or_default(),
                physical.cores,
                if physical.aggregated { " (aggregated)" } else { "" }
            );
        }
    }

    if route.last().is_some_and(|l| l.from_location != plan.root) {
        eprintln!("WARN: route from {} stops before {}", location, plan.root);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_plan_commands_fail_without_plan() {
        let tmpdir = tempfile::tempdir().unwrap();
        for result in [
            cmd_info(tmpdir.path()),
            cmd_warnings(tmpdir.path()),
            cmd_trace(tmpdir.path(), "Core"),
        ] {
            let err = result.unwrap_err();
            assert!(err.to_string().starts_with("No plan found"), "{}", err);
        }
    }
}

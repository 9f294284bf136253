use grid_cbs::common::Agent;
use grid_cbs::config::{Cli, Config};
use grid_cbs::map::{Grid, Map, OpenGrid};
use grid_cbs::scenario::Scenario;
use grid_cbs::solver::{Solver, CBS};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let scenario_path = config
        .scenario_path
        .as_deref()
        .context("No scenario file given")?;
    let agents = Scenario::load_agents(scenario_path, config.num_agents)?;

    match config.map_path.as_deref() {
        Some(map_path) => run(&config, agents, &Map::from_file(map_path)?),
        None => {
            info!("No map file specified, planning on an open grid");
            run(&config, agents, &OpenGrid)
        }
    }
}

fn run<G: Grid>(config: &Config, agents: Vec<Agent>, grid: &G) -> anyhow::Result<()> {
    let mut solver = CBS::new(agents.clone(), grid);
    let Some(solution) = solver.solve(config)? else {
        error!("cbs solve fails");
        return Ok(());
    };

    if !solution.verify(grid, &agents) {
        bail!("cbs returned an invalid solution");
    }
    info!(
        "cbs solution: cost {} makespan {}",
        solution.cost(),
        solution.makespan()
    );

    let output = serde_json::to_string_pretty(&solution)?;
    match config.output_path.as_deref() {
        Some(output_path) => std::fs::write(output_path, output)
            .with_context(|| format!("failed to write solution: {output_path}"))?,
        None => println!("{output}"),
    }
    Ok(())
}

use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Grid CBS",
    about = "Conflict-Based Search for multi-agent path finding on 4-connected grids.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Path to the scenario file: a YAML agent list or a MovingAI .scen file"
    )]
    pub scenario_path: Option<String>,

    #[arg(
        long,
        help = "Path to a MovingAI map file; without it agents move on an unbounded open grid"
    )]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to write the solution as JSON; printed when omitted")]
    pub output_path: Option<String>,

    #[arg(long, help = "Number of agents taken from a .scen file")]
    pub num_agents: Option<usize>,

    #[arg(long, help = "Give up after expanding this many high-level nodes")]
    pub max_high_level_expansions: Option<usize>,

    #[arg(long, help = "Give up after this many milliseconds")]
    pub time_limit_ms: Option<u64>,

    #[arg(
        long,
        help = "Optimization: replan only the newly constrained agent",
        default_value_t = false
    )]
    pub op_incremental_replan: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scenario_path: Option<String>,
    pub map_path: Option<String>,
    pub output_path: Option<String>,
    pub num_agents: Option<usize>,
    pub max_high_level_expansions: Option<usize>,
    pub time_limit_ms: Option<u64>,
    pub op_incremental_replan: bool,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse config")
    }

    /// Command line values win over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(scenario_path) = &cli.scenario_path {
            self.scenario_path = Some(scenario_path.clone());
        }
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if cli.num_agents.is_some() {
            self.num_agents = cli.num_agents;
        }
        if cli.max_high_level_expansions.is_some() {
            self.max_high_level_expansions = cli.max_high_level_expansions;
        }
        if cli.time_limit_ms.is_some() {
            self.time_limit_ms = cli.time_limit_ms;
        }
        self.op_incremental_replan |= cli.op_incremental_replan;

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scenario_path.is_none() {
            return Err(anyhow!("No scenario file given"));
        }

        if self.num_agents == Some(0) {
            return Err(anyhow!("Number of agents must be greater than 0"));
        }

        if self.max_high_level_expansions == Some(0) {
            return Err(anyhow!(
                "High-level expansion limit must be greater than 0"
            ));
        }

        if self.time_limit_ms == Some(0) {
            return Err(anyhow!("Time limit must be greater than 0"));
        }

        Ok(())
    }
}

mod cbs;

pub use cbs::CBS;

use crate::common::{Agent, AgentId, Cell, Solution};
use crate::config::Config;
use crate::map::Grid;

use anyhow::anyhow;
use std::collections::HashMap;

pub trait Solver {
    /// `Ok(None)` means no conflict-free solution exists. Errors are reserved for malformed
    /// input and exhausted search budgets.
    fn solve(&mut self, config: &Config) -> anyhow::Result<Option<Solution>>;
}

/// Runs CBS for agents given as an id list with start and goal lookups.
pub fn plan<G: Grid>(
    agent_ids: &[AgentId],
    starts: &HashMap<AgentId, Cell>,
    goals: &HashMap<AgentId, Cell>,
    grid: &G,
    config: &Config,
) -> anyhow::Result<Option<Solution>> {
    let agents = agent_ids
        .iter()
        .map(|&id| {
            let start = *starts
                .get(&id)
                .ok_or_else(|| anyhow!("Agent {id} has no start cell"))?;
            let goal = *goals
                .get(&id)
                .ok_or_else(|| anyhow!("Agent {id} has no goal cell"))?;
            Ok(Agent { id, start, goal })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    CBS::new(agents, grid).solve(config)
}

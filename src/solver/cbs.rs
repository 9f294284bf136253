use super::Solver;
use crate::common::{Agent, Constraint, HighLevelNode, OpenOrderWrapper, Solution};
use crate::config::Config;
use crate::map::Grid;
use crate::stat::Stats;

use anyhow::bail;
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, warn};

pub struct CBS<'a, G: Grid> {
    agents: Vec<Agent>,
    grid: &'a G,
    constraints: Vec<Constraint>, // applied to the root node
    stats: Stats,
}

impl<'a, G: Grid> CBS<'a, G> {
    pub fn new(agents: Vec<Agent>, grid: &'a G) -> Self {
        Self::with_constraints(agents, grid, Vec::new())
    }

    /// Starts the search from `constraints` instead of an empty constraint set.
    pub fn with_constraints(
        agents: Vec<Agent>,
        grid: &'a G,
        constraints: Vec<Constraint>,
    ) -> Self {
        CBS {
            agents,
            grid,
            constraints,
            stats: Stats::default(),
        }
    }

    /// Statistics of the last `solve` call.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Errors on malformed input. `Ok(false)` if two agents share a start or a goal cell: the
    /// first collides at time 0, the second once both are parked.
    fn check_agents(&self) -> anyhow::Result<bool> {
        if self.agents.is_empty() {
            bail!("No agents to plan for");
        }

        let mut ids = HashSet::new();
        let mut starts = HashSet::new();
        let mut goals = HashSet::new();
        let mut feasible = true;

        for agent in &self.agents {
            if !ids.insert(agent.id) {
                bail!("Duplicate agent id {}", agent.id);
            }
            if !agent.verify(self.grid) {
                bail!(
                    "Agent {} start {:?} or goal {:?} is not a free cell of the grid",
                    agent.id,
                    agent.start,
                    agent.goal
                );
            }
            if !starts.insert(agent.start) {
                warn!("Agent {} shares start {:?}", agent.id, agent.start);
                feasible = false;
            }
            if !goals.insert(agent.goal) {
                warn!("Agent {} shares goal {:?}", agent.id, agent.goal);
                feasible = false;
            }
        }

        Ok(feasible)
    }

    fn check_budget(&self, config: &Config, solve_start_time: Instant) -> anyhow::Result<()> {
        if let Some(limit) = config.max_high_level_expansions {
            if self.stats.high_level_expand_nodes >= limit {
                bail!("High-level expansion limit {limit} reached without a solution");
            }
        }

        if let Some(limit) = config.time_limit_ms {
            if solve_start_time.elapsed().as_millis() >= u128::from(limit) {
                bail!("Time limit of {limit} ms reached without a solution");
            }
        }

        Ok(())
    }
}

impl<G: Grid> Solver for CBS<'_, G> {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Option<Solution>> {
        let total_solve_start_time = Instant::now();
        self.stats = Stats::default();

        if !self.check_agents()? {
            warn!("cbs solve fails: agents share a start or goal cell");
            return Ok(None);
        }

        let Some(root) = HighLevelNode::new(
            &self.agents,
            self.grid,
            self.constraints.clone(),
            &mut self.stats,
        ) else {
            warn!("cbs solve fails: some agent cannot reach its goal");
            return Ok(None);
        };

        let mut open = BTreeSet::new();
        let mut sequence = 0;
        open.insert(OpenOrderWrapper::new(root, sequence));
        self.stats.high_level_generate_nodes += 1;

        while let Some(OpenOrderWrapper {
            node: current_node,
            ..
        }) = open.pop_first()
        {
            self.check_budget(config, total_solve_start_time)?;
            self.stats.high_level_expand_nodes += 1;

            let Some(conflict) = current_node.detect_conflict() else {
                // No conflicts, return solution.
                self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
                self.stats.costs = current_node.cost;
                self.stats.print();
                return Ok(Some(current_node.into_solution()));
            };
            debug!("conflict: {conflict:?}");

            for resolve_first in [true, false] {
                match current_node.update_constraint(
                    &self.agents,
                    &conflict,
                    resolve_first,
                    self.grid,
                    config,
                    &mut self.stats,
                ) {
                    Some(child) => {
                        sequence += 1;
                        open.insert(OpenOrderWrapper::new(child, sequence));
                        self.stats.high_level_generate_nodes += 1;
                    }
                    None => self.stats.high_level_prune_nodes += 1,
                }
            }
        }

        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.print();
        warn!("cbs solve fails: open list exhausted");
        Ok(None)
    }
}

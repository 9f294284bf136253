use super::{construct_path, ConstraintTable, Trace};
use crate::common::{Agent, Constraint, LowLevelNode, Path};
use crate::map::Grid;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, trace};

/// Time-expanded A* for one agent.
///
/// Every move takes one time step and the agent never waits in place. Only the constraints
/// that belong to `agent` are applied. The search stops the first time the goal is popped,
/// whatever the time; `None` means the open list ran dry.
#[instrument(skip_all, name = "a_star", fields(agent = agent.id, start = ?agent.start, goal = ?agent.goal), level = "debug")]
pub fn a_star_search<G: Grid>(
    grid: &G,
    agent: &Agent,
    constraints: &[Constraint],
    stats: &mut Stats,
) -> Option<Path> {
    let table = ConstraintTable::new(agent.id, constraints);
    debug!("constraints: {table:?}");

    let mut open_list = BTreeSet::new();
    let mut best_g_cost: HashMap<_, usize> = HashMap::new();
    let mut trace = Trace::new();

    open_list.insert(LowLevelNode {
        position: agent.start,
        f_cost: grid.heuristic(agent.start, agent.goal),
        g_cost: 0,
        time_step: 0,
    });

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");

        if current.position == agent.goal {
            return Some(construct_path(&trace, (current.position, current.g_cost)));
        }

        let state = (current.position, current.time_step);
        if best_g_cost
            .get(&state)
            .is_some_and(|&g_cost| current.g_cost >= g_cost)
        {
            continue;
        }
        best_g_cost.insert(state, current.g_cost);
        stats.low_level_expand_nodes += 1;

        // Assuming uniform cost, which also indicate the arrival time.
        let tentative_g_cost = current.g_cost + 1;
        let tentative_time_step = table.time_key(tentative_g_cost);

        for neighbor in grid.neighbors(current.position) {
            if !table.allows(current.position, neighbor, tentative_g_cost) {
                continue; // This move is prohibited due to a constraint.
            }

            if best_g_cost
                .get(&(neighbor, tentative_time_step))
                .is_some_and(|&g_cost| tentative_g_cost >= g_cost)
            {
                continue;
            }

            // If this node has already in the open list, we ignore this update.
            if open_list.insert(LowLevelNode {
                position: neighbor,
                f_cost: tentative_g_cost + grid.heuristic(neighbor, agent.goal),
                g_cost: tentative_g_cost,
                time_step: tentative_time_step,
            }) {
                trace.insert(
                    (neighbor, tentative_g_cost),
                    (current.position, current.g_cost),
                );
            }
        }
    }

    debug!("cannot find solution");
    None
}

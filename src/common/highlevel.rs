use super::{path_cost, Agent, AgentId, Cell, Path, Solution};
use crate::algorithm::a_star_search;
use crate::config::Config;
use crate::map::Grid;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A prohibition for a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `agent` must not stand on `position` at `time_step`.
    Vertex {
        agent: AgentId,
        position: Cell,
        time_step: usize,
    },
    /// `agent` must not move `from_position -> to_position` arriving at `to_time_step`.
    Edge {
        agent: AgentId,
        from_position: Cell,
        to_position: Cell,
        to_time_step: usize,
    },
}

impl Constraint {
    pub fn agent(&self) -> AgentId {
        match self {
            Constraint::Vertex { agent, .. } | Constraint::Edge { agent, .. } => *agent,
        }
    }

    pub fn time_step(&self) -> usize {
        match self {
            Constraint::Vertex { time_step, .. } => *time_step,
            Constraint::Edge { to_time_step, .. } => *to_time_step,
        }
    }

    /// Whether `agent` moving `from -> to` and arriving at `time` breaks this constraint.
    pub fn is_violated(&self, agent: AgentId, from: Cell, to: Cell, time: usize) -> bool {
        if agent != self.agent() || time != self.time_step() {
            return false;
        }

        match *self {
            Constraint::Vertex { position, .. } => to == position,
            Constraint::Edge {
                from_position,
                to_position,
                ..
            } => from == from_position && to == to_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    Vertex {
        position: Cell,
        time_step: usize,
    },
    /// Positions follow `agent_1`'s direction of travel.
    Edge {
        from_position: Cell,
        to_position: Cell,
        time_step: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conflict {
    pub agent_1: AgentId,
    pub agent_2: AgentId,
    pub conflict_type: ConflictType,
}

impl Conflict {
    pub fn time_step(&self) -> usize {
        match self.conflict_type {
            ConflictType::Vertex { time_step, .. } | ConflictType::Edge { time_step, .. } => {
                time_step
            }
        }
    }

    /// The constraint that forbids `agent_1` (or `agent_2`) its part of the conflict.
    pub fn constraint_for(&self, resolve_first: bool) -> Constraint {
        let agent = if resolve_first {
            self.agent_1
        } else {
            self.agent_2
        };

        match self.conflict_type {
            ConflictType::Vertex {
                position,
                time_step,
            } => Constraint::Vertex {
                agent,
                position,
                time_step,
            },
            ConflictType::Edge {
                from_position,
                to_position,
                time_step,
            } => {
                // agent_2 travels the same edge the other way round.
                let (from_position, to_position) = if resolve_first {
                    (from_position, to_position)
                } else {
                    (to_position, from_position)
                };
                Constraint::Edge {
                    agent,
                    from_position,
                    to_position,
                    to_time_step: time_step,
                }
            }
        }
    }
}

// Past its last index an agent stays parked on its goal.
fn position_at(path: &Path, time_step: usize) -> Option<Cell> {
    path.get(time_step).or_else(|| path.last()).copied()
}

/// Finds the earliest conflict in a set of paths.
///
/// Time steps are scanned in ascending order; at each step vertex conflicts are checked before
/// edge (swap) conflicts, and agents are visited in ascending id order.
pub fn detect_conflict(paths: &BTreeMap<AgentId, Path>) -> Option<Conflict> {
    let horizon = paths.values().map(Vec::len).max()?;

    for time_step in 0..horizon {
        let mut occupied: HashMap<Cell, AgentId> = HashMap::new();
        for (&agent, path) in paths {
            let Some(position) = position_at(path, time_step) else {
                continue;
            };
            if let Some(&holder) = occupied.get(&position) {
                return Some(Conflict {
                    agent_1: holder,
                    agent_2: agent,
                    conflict_type: ConflictType::Vertex {
                        position,
                        time_step,
                    },
                });
            }
            occupied.insert(position, agent);
        }

        for (index, (&agent_1, path_1)) in paths.iter().enumerate() {
            for (&agent_2, path_2) in paths.iter().skip(index + 1) {
                let (Some(pos_1), Some(next_pos_1), Some(pos_2), Some(next_pos_2)) = (
                    position_at(path_1, time_step),
                    position_at(path_1, time_step + 1),
                    position_at(path_2, time_step),
                    position_at(path_2, time_step + 1),
                ) else {
                    continue;
                };

                if pos_1 == next_pos_2 && pos_2 == next_pos_1 {
                    return Some(Conflict {
                        agent_1,
                        agent_2,
                        conflict_type: ConflictType::Edge {
                            from_position: pos_1,
                            to_position: next_pos_1,
                            time_step: time_step + 1,
                        },
                    });
                }
            }
        }
    }

    None
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct HighLevelNode {
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) paths: BTreeMap<AgentId, Path>,
    pub(crate) cost: usize, // Sum of moves over all paths under current constraints
}

impl HighLevelNode {
    /// Plans every agent under `constraints`; `None` if any agent has no path.
    pub(crate) fn new<G: Grid>(
        agents: &[Agent],
        grid: &G,
        constraints: Vec<Constraint>,
        stats: &mut Stats,
    ) -> Option<Self> {
        let mut paths = BTreeMap::new();
        for agent in agents {
            let Some(path) = a_star_search(grid, agent, &constraints, stats) else {
                debug!("agent {} has no path under {constraints:?}", agent.id);
                return None;
            };
            paths.insert(agent.id, path);
        }

        Some(Self::from_parts(constraints, paths))
    }

    fn from_parts(constraints: Vec<Constraint>, paths: BTreeMap<AgentId, Path>) -> Self {
        let cost = paths.values().map(path_cost).sum();
        HighLevelNode {
            constraints,
            paths,
            cost,
        }
    }

    pub(crate) fn detect_conflict(&self) -> Option<Conflict> {
        detect_conflict(&self.paths)
    }

    /// Child node with one more constraint for one side of `conflict`.
    ///
    /// Returns `None` when the new constraint set leaves some agent without a path, or when
    /// the constraint is already part of this node (the child would repeat this node).
    pub(crate) fn update_constraint<G: Grid>(
        &self,
        agents: &[Agent],
        conflict: &Conflict,
        resolve_first: bool,
        grid: &G,
        config: &Config,
        stats: &mut Stats,
    ) -> Option<HighLevelNode> {
        let constraint = conflict.constraint_for(resolve_first);
        if self.constraints.contains(&constraint) {
            debug!("constraint {constraint:?} already applied, drop branch");
            return None;
        }

        let mut new_constraints = self.constraints.clone();
        new_constraints.push(constraint);

        if !config.op_incremental_replan {
            return HighLevelNode::new(agents, grid, new_constraints, stats);
        }

        let agent_to_update = agents
            .iter()
            .find(|agent| agent.id == constraint.agent())?;
        let new_path = a_star_search(grid, agent_to_update, &new_constraints, stats)?;
        debug!(
            "Update agent {:?} with path {new_path:?} for conflict {conflict:?}",
            agent_to_update.id
        );

        let mut new_paths = self.paths.clone();
        new_paths.insert(agent_to_update.id, new_path);
        Some(Self::from_parts(new_constraints, new_paths))
    }

    pub(crate) fn into_solution(self) -> Solution {
        Solution { paths: self.paths }
    }
}

/// Frontier entry: lowest cost first, ties in insertion order.
#[derive(Debug)]
pub(crate) struct OpenOrderWrapper {
    pub(crate) sequence: usize,
    pub(crate) node: HighLevelNode,
}

impl OpenOrderWrapper {
    pub(crate) fn new(node: HighLevelNode, sequence: usize) -> Self {
        OpenOrderWrapper { sequence, node }
    }
}

impl PartialEq for OpenOrderWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenOrderWrapper {}

impl PartialOrd for OpenOrderWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenOrderWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .cost
            .cmp(&other.node.cost)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

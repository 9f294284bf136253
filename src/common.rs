mod highlevel;
mod lowlevel;

pub use highlevel::{detect_conflict, Conflict, ConflictType, Constraint};
pub(crate) use highlevel::{HighLevelNode, OpenOrderWrapper};
pub(crate) use lowlevel::LowLevelNode;

use crate::map::Grid;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub type AgentId = usize;

/// Grid coordinate. On a `Map` this is `(row, col)`.
pub type Cell = (i32, i32);

/// Position at index `t` is where the agent stands at time `t`.
pub type Path = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub start: Cell,
    pub goal: Cell,
}

impl Agent {
    pub fn verify<G: Grid>(&self, grid: &G) -> bool {
        grid.contains(self.start) && grid.contains(self.goal)
    }
}

/// Number of moves along a path.
pub fn path_cost(path: &Path) -> usize {
    path.len().saturating_sub(1)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub paths: BTreeMap<AgentId, Path>,
}

impl Solution {
    /// Sum of costs over all agents.
    pub fn cost(&self) -> usize {
        self.paths.values().map(path_cost).sum()
    }

    pub fn makespan(&self) -> usize {
        self.paths.values().map(path_cost).max().unwrap_or(0)
    }

    /// Checks that every agent walks from its start to its goal over grid edges and that no two
    /// agents collide, including agents parked on their goal.
    pub fn verify<G: Grid>(&self, grid: &G, agents: &[Agent]) -> bool {
        if self.paths.len() != agents.len() {
            debug!(
                "solution has {} paths for {} agents",
                self.paths.len(),
                agents.len()
            );
            return false;
        }

        for agent in agents {
            let Some(path) = self.paths.get(&agent.id) else {
                debug!("agent {} has no path", agent.id);
                return false;
            };

            if path.first() != Some(&agent.start) || path.last() != Some(&agent.goal) {
                debug!("agent {} path does not connect its start and goal", agent.id);
                return false;
            }

            if path
                .windows(2)
                .any(|step| !grid.neighbors(step[0]).contains(&step[1]))
            {
                debug!("agent {} path leaves the grid edges", agent.id);
                return false;
            }
        }

        detect_conflict(&self.paths).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Map, OpenGrid};

    fn corridor_agents() -> Vec<Agent> {
        vec![
            Agent {
                id: 0,
                start: (0, 0),
                goal: (0, 2),
            },
            Agent {
                id: 1,
                start: (1, 0),
                goal: (1, 2),
            },
        ]
    }

    #[test]
    fn test_solution_cost_and_makespan() {
        let solution = Solution {
            paths: BTreeMap::from([
                (0, vec![(0, 0), (0, 1), (0, 2)]),
                (1, vec![(5, 5)]),
                (2, vec![(3, 3), (3, 4), (4, 4), (4, 5)]),
            ]),
        };
        assert_eq!(solution.cost(), 5);
        assert_eq!(solution.makespan(), 3);
        assert_eq!(path_cost(&Vec::new()), 0);
    }

    #[test]
    fn test_verify_accepts_parallel_paths() {
        let solution = Solution {
            paths: BTreeMap::from([
                (0, vec![(0, 0), (0, 1), (0, 2)]),
                (1, vec![(1, 0), (1, 1), (1, 2)]),
            ]),
        };
        assert!(solution.verify(&OpenGrid, &corridor_agents()));
    }

    #[test]
    fn test_verify_rejects_teleport_and_wrong_goal() {
        let agents = corridor_agents();

        let teleport = Solution {
            paths: BTreeMap::from([
                (0, vec![(0, 0), (0, 2)]),
                (1, vec![(1, 0), (1, 1), (1, 2)]),
            ]),
        };
        assert!(!teleport.verify(&OpenGrid, &agents));

        let wrong_goal = Solution {
            paths: BTreeMap::from([
                (0, vec![(0, 0), (0, 1)]),
                (1, vec![(1, 0), (1, 1), (1, 2)]),
            ]),
        };
        assert!(!wrong_goal.verify(&OpenGrid, &agents));

        let missing_agent = Solution {
            paths: BTreeMap::from([(0, vec![(0, 0), (0, 1), (0, 2)])]),
        };
        assert!(!missing_agent.verify(&OpenGrid, &agents));
    }

    #[test]
    fn test_verify_rejects_collision_and_obstacle() {
        let agents = vec![
            Agent {
                id: 0,
                start: (0, 0),
                goal: (0, 2),
            },
            Agent {
                id: 1,
                start: (1, 1),
                goal: (0, 1),
            },
        ];
        // Agent 1 parks on (0, 1) while agent 0 walks through it.
        let collision = Solution {
            paths: BTreeMap::from([
                (0, vec![(0, 0), (0, 1), (0, 2)]),
                (1, vec![(1, 1), (0, 1)]),
            ]),
        };
        assert!(!collision.verify(&OpenGrid, &agents));

        let map: Map = "type octile\nheight 2\nwidth 3\nmap\n...\n.@.\n".parse().unwrap();
        let agent = Agent {
            id: 0,
            start: (1, 0),
            goal: (1, 2),
        };
        let through_wall = Solution {
            paths: BTreeMap::from([(0, vec![(1, 0), (1, 1), (1, 2)])]),
        };
        assert!(agent.verify(&map));
        assert!(!through_wall.verify(&map, &[agent]));
    }
}

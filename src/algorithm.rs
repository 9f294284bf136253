mod astar;

pub use astar::a_star_search;

use std::collections::{HashMap, HashSet};

use crate::common::{AgentId, Cell, Constraint, Path};

type Trace = HashMap<(Cell, usize), (Cell, usize)>;

/// One agent's constraints, indexed for constant time lookups.
#[derive(Debug, Default)]
struct ConstraintTable {
    vertex: HashSet<(Cell, usize)>,
    edge: HashSet<(Cell, Cell, usize)>,
    horizon: usize, // latest constrained time step
}

impl ConstraintTable {
    fn new(agent: AgentId, constraints: &[Constraint]) -> Self {
        let mut table = ConstraintTable::default();
        for constraint in constraints.iter().filter(|c| c.agent() == agent) {
            match *constraint {
                Constraint::Vertex {
                    position,
                    time_step,
                    ..
                } => {
                    table.vertex.insert((position, time_step));
                }
                Constraint::Edge {
                    from_position,
                    to_position,
                    to_time_step,
                    ..
                } => {
                    table.edge.insert((from_position, to_position, to_time_step));
                }
            }
            table.horizon = table.horizon.max(constraint.time_step());
        }
        table
    }

    fn allows(&self, from: Cell, to: Cell, time: usize) -> bool {
        !self.vertex.contains(&(to, time)) && !self.edge.contains(&(from, to, time))
    }

    // Beyond the horizon nothing is constrained, so all later times share one key.
    fn time_key(&self, time: usize) -> usize {
        time.min(self.horizon + 1)
    }
}

fn construct_path(trace: &Trace, mut current: (Cell, usize)) -> Path {
    let mut path = vec![current.0];
    while let Some(&previous) = trace.get(&current) {
        path.push(previous.0);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_table_filters_agent() {
        let constraints = vec![
            Constraint::Vertex {
                agent: 0,
                position: (1, 1),
                time_step: 2,
            },
            Constraint::Edge {
                agent: 0,
                from_position: (0, 0),
                to_position: (0, 1),
                to_time_step: 5,
            },
            Constraint::Vertex {
                agent: 1,
                position: (2, 2),
                time_step: 9,
            },
        ];
        let table = ConstraintTable::new(0, &constraints);

        assert!(!table.allows((1, 0), (1, 1), 2));
        assert!(table.allows((1, 0), (1, 1), 3));
        assert!(!table.allows((0, 0), (0, 1), 5));
        assert!(table.allows((0, 1), (0, 0), 5));
        assert!(table.allows((2, 1), (2, 2), 9));

        assert_eq!(table.horizon, 5);
        assert_eq!(table.time_key(4), 4);
        assert_eq!(table.time_key(6), 6);
        assert_eq!(table.time_key(60), 6);
    }

    #[test]
    fn test_construct_path() {
        let mut trace = Trace::new();
        trace.insert(((0, 1), 1), ((0, 0), 0));
        trace.insert(((1, 1), 2), ((0, 1), 1));

        assert_eq!(
            construct_path(&trace, ((1, 1), 2)),
            vec![(0, 0), (0, 1), (1, 1)]
        );
        assert_eq!(construct_path(&Trace::new(), ((4, 4), 0)), vec![(4, 4)]);
    }
}

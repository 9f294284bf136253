use super::Cell;

use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LowLevelNode {
    pub(crate) position: Cell,
    pub(crate) f_cost: usize,
    pub(crate) g_cost: usize, // also the time the agent stands on `position`
    pub(crate) time_step: usize, // g_cost clamped to the constraint horizon + 1
}

impl Ord for LowLevelNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Higher g cost (time) has higher priority
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.position.cmp(&other.position))
            .then_with(|| self.time_step.cmp(&other.time_step))
    }
}

impl PartialOrd for LowLevelNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

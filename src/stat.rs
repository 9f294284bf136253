use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub costs: usize,
    pub time_us: usize,
    pub high_level_expand_nodes: usize,
    pub high_level_generate_nodes: usize,
    pub high_level_prune_nodes: usize, // children dropped instead of queued
    pub low_level_expand_nodes: usize,
}

impl Stats {
    pub(crate) fn print(&self) {
        info!(
            "Cost {:?} Time(microseconds) {:?} High level expand nodes number: {:?} generate: {:?} prune: {:?} Low level expand nodes number {:?}",
            self.costs,
            self.time_us,
            self.high_level_expand_nodes,
            self.high_level_generate_nodes,
            self.high_level_prune_nodes,
            self.low_level_expand_nodes
        );
    }
}

/// Exploration bounds for the symbolic engine.

use super::strategy::SearchOrder;

/// Per-path transition bound: a single path that runs this long without
/// terminating is dropped without classification.
pub const MAX_STEPS_PER_STATE: u32 = 100;

#[derive(Debug, Clone)]
pub struct SymConfig {
    /// Global transition budget across all paths; `None` is unbounded.
    pub max_steps: Option<u32>,
    /// Branch-depth bound per path; `None` is unbounded.
    pub max_depth: Option<u32>,
    /// Wall-clock budget for the whole exploration.
    pub timeout_seconds: f64,
    pub order: SearchOrder,
    /// With the solver off, every path is assumed feasible.
    pub use_solver: bool,
}

impl Default for SymConfig {
    fn default() -> Self {
        SymConfig {
            max_steps: Some(1000),
            max_depth: Some(300),
            timeout_seconds: 10.0,
            order: SearchOrder::Dfs,
            use_solver: true,
        }
    }
}

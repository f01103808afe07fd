/// Worklist order: depth-first explores one path to its end before
/// backtracking, breadth-first sweeps the frontier level by level. No
/// fairness beyond bounded exploration.

use std::collections::VecDeque;

use super::state::SymbolicState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    #[default]
    Dfs,
    Bfs,
}

#[derive(Debug)]
pub struct Worklist {
    order: SearchOrder,
    items: VecDeque<SymbolicState>,
}

impl Worklist {
    pub fn new(order: SearchOrder, initial: SymbolicState) -> Self {
        let mut items = VecDeque::new();
        items.push_back(initial);
        Worklist { order, items }
    }

    pub fn push(&mut self, state: SymbolicState) {
        self.items.push_back(state);
    }

    pub fn pop(&mut self) -> Option<SymbolicState> {
        match self.order {
            SearchOrder::Dfs => self.items.pop_back(),
            SearchOrder::Bfs => self.items.pop_front(),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//! Strategy persistence port.

use crate::domain::strategy::Strategy;

pub trait StrategyStore {
    fn get(&self, id: &str) -> Option<Strategy>;

    /// All stored strategies ordered by id.
    fn list(&self) -> Vec<Strategy>;

    /// Insert or replace the strategy with the same id.
    fn upsert(&mut self, strategy: Strategy);

    /// Returns whether a strategy was removed.
    fn delete(&mut self, id: &str) -> bool;
}

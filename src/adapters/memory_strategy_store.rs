//! In-memory strategy store seeded from INI strategy sections.

use crate::domain::config_validation::{strategy_from_config, strategy_ids};
use crate::domain::error::ScanError;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::strategy_store::StrategyStore;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct InMemoryStrategyStore {
    strategies: BTreeMap<String, Strategy>,
}

impl InMemoryStrategyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl StrategyStore for InMemoryStrategyStore {
    fn get(&self, id: &str) -> Option<Strategy> {
        self.strategies.get(id).cloned()
    }

    fn list(&self) -> Vec<Strategy> {
        self.strategies.values().cloned().collect()
    }

    fn upsert(&mut self, strategy: Strategy) {
        self.strategies.insert(strategy.id.clone(), strategy);
    }

    fn delete(&mut self, id: &str) -> bool {
        self.strategies.remove(id).is_some()
    }
}

/// Parse and validate every `[strategy.<id>]` section into a store.
///
/// The first invalid section aborts loading.
pub fn load_strategies(config: &dyn ConfigPort) -> Result<InMemoryStrategyStore, ScanError> {
    let mut store = InMemoryStrategyStore::new();
    for id in strategy_ids(config) {
        let strategy = strategy_from_config(config, &id)?;
        tracing::debug!(strategy = %id, conditions = strategy.conditions.len(), "loaded strategy");
        store.upsert(strategy);
    }
    Ok(store)
}

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, MatchingConfig, MatchingCoordinator, ResultEngine, TriggerMode,
    store::{DatabaseLedger, LedgerStore},
};

mod donors;
mod ledger;
mod matching;

pub use ledger::Recorded;

/// Entry point of the donation tracking engine.
///
/// Cloning is cheap: clones share the store and the matching lock.
#[derive(Clone, Debug)]
pub struct Engine {
    store: Arc<dyn LedgerStore>,
    coordinator: MatchingCoordinator,
    trigger: TriggerMode,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &MatchingCoordinator {
        &self.coordinator
    }

    pub fn trigger_mode(&self) -> TriggerMode {
        self.trigger
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    matching: MatchingConfig,
    trigger: TriggerMode,
}

impl EngineBuilder {
    /// Use a sea-orm database as the ledger store.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Arc::new(DatabaseLedger::new(db)));
        self
    }

    /// Use any `LedgerStore` implementation.
    pub fn store(mut self, store: Arc<dyn LedgerStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    pub fn matching(mut self, config: MatchingConfig) -> EngineBuilder {
        self.matching = config;
        self
    }

    pub fn trigger(mut self, mode: TriggerMode) -> EngineBuilder {
        self.trigger = mode;
        self
    }

    /// Construct `Engine`. Does no I/O: connect and migrate the database first.
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Validation("a ledger store is required".to_string()))?;
        if self.matching.max_attempts == 0 {
            return Err(EngineError::Validation(
                "matching.max_attempts must be >= 1".to_string(),
            ));
        }
        Ok(Engine {
            coordinator: MatchingCoordinator::new(store.clone(), self.matching),
            store,
            trigger: self.trigger,
        })
    }
}

//! Trigger coordination for matching passes.
//!
//! Every donation or expenditure insert asks for a full matching pass. The
//! [`MatchingCoordinator`] makes sure at most one pass commits matches at a
//! time within the process, and the store's optimistic precondition on each
//! commit covers writers outside it. A pass is idempotent, so a failed one is
//! simply retried from scratch.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    EngineError, Match, NewMatch, ResultEngine,
    allocator::{self, DonationBalance, ExpenditureNeed},
    store::LedgerStore,
};

/// How an insert triggers its matching pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// The caller awaits the pass.
    #[default]
    Inline,
    /// The pass is spawned on the runtime and the caller returns immediately.
    Background,
}

/// Retry and timeout policy for matching passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Total attempts per pass, including the first one.
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Applied to each match commit, not to the whole pass.
    pub commit_timeout: Duration,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
            commit_timeout: Duration::from_secs(5),
        }
    }
}

impl MatchingConfig {
    /// Delay before retry number `attempt` (1-based): doubles each time, capped.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Result of the matching pass triggered by an insert.
///
/// The insert itself is already committed whatever the outcome; a failed pass
/// can be redone later because passes are idempotent.
#[derive(Debug, PartialEq)]
pub enum PassOutcome {
    /// The pass ran inline and committed these new matches.
    Completed(Vec<Match>),
    /// The pass was handed to a background task.
    Scheduled,
    /// The pass ran inline and gave up after retries.
    Failed(EngineError),
}

#[derive(Debug)]
struct Inner {
    store: Arc<dyn LedgerStore>,
    config: MatchingConfig,
    lock: Mutex<()>,
}

/// Serializes matching passes over one ledger.
#[derive(Clone, Debug)]
pub struct MatchingCoordinator {
    inner: Arc<Inner>,
}

impl MatchingCoordinator {
    pub fn new(store: Arc<dyn LedgerStore>, config: MatchingConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> MatchingConfig {
        self.inner.config
    }

    /// Run one full matching pass and return the matches it created.
    ///
    /// Transient failures (conflicts, timeouts, storage errors) restart the
    /// pass after a backoff, up to `max_attempts`. Matches committed by an
    /// attempt that later failed stay in the ledger and are part of the
    /// returned list.
    pub async fn run_matching(&self) -> ResultEngine<Vec<Match>> {
        let _guard = self.inner.lock.lock().await;
        let config = self.inner.config;
        let mut created = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt_pass(&mut created).await {
                Ok(()) => {
                    tracing::info!(attempt, created = created.len(), "matching pass finished");
                    return Ok(created);
                }
                Err(err) if err.is_transient() && attempt < config.max_attempts => {
                    let delay = config.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "matching pass failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if matches!(err, EngineError::InvariantViolation(_)) {
                        tracing::error!("ledger invariant check rejected a planned match: {err}");
                    } else {
                        tracing::warn!(attempt, "matching pass gave up: {err}");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Run the pass as `mode` says and report what happened.
    pub async fn trigger(&self, mode: TriggerMode) -> PassOutcome {
        match mode {
            TriggerMode::Inline => match self.run_matching().await {
                Ok(created) => PassOutcome::Completed(created),
                Err(err) => PassOutcome::Failed(err),
            },
            TriggerMode::Background => {
                self.spawn_matching();
                PassOutcome::Scheduled
            }
        }
    }

    /// Spawn a pass on the current tokio runtime.
    pub fn spawn_matching(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match coordinator.run_matching().await {
                Ok(created) => {
                    tracing::debug!(created = created.len(), "background matching pass done")
                }
                Err(err) => tracing::error!("background matching pass failed: {err}"),
            }
        })
    }

    async fn attempt_pass(&self, created: &mut Vec<Match>) -> ResultEngine<()> {
        let store = &self.inner.store;

        let donations = store.list_donations_ordered_by_time().await?;
        let mut balances = Vec::with_capacity(donations.len());
        for donation in &donations {
            balances.push(DonationBalance {
                donation_id: donation.id,
                donated_at: donation.donated_at,
                amount: donation.amount,
                allocated: store.sum_allocated_for_donation(donation.id).await?,
            });
        }

        let expenditures = store.list_expenditures_ordered_by_time().await?;
        let mut needs = Vec::with_capacity(expenditures.len());
        for expenditure in &expenditures {
            needs.push(ExpenditureNeed {
                expenditure_id: expenditure.id,
                spent_at: expenditure.spent_at,
                amount: expenditure.amount,
                allocated: store.sum_allocated_for_expenditure(expenditure.id).await?,
            });
        }

        let planned = allocator::plan(&balances, &needs);
        tracing::debug!(
            donations = balances.len(),
            expenditures = needs.len(),
            planned = planned.len(),
            "matching pass planned"
        );

        for new_match in planned {
            created.push(self.commit(new_match).await?);
        }
        Ok(())
    }

    async fn commit(&self, new_match: NewMatch) -> ResultEngine<Match> {
        let timeout = self.inner.config.commit_timeout;
        match tokio::time::timeout(timeout, self.inner.store.create_match(new_match)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(format!(
                "match commit for donation {} and expenditure {} exceeded {}ms",
                new_match.donation_id,
                new_match.expenditure_id,
                timeout.as_millis()
            ))),
        }
    }
}

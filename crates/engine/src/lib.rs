//! Donation tracking engine.
//!
//! Donations (credits) and expenditures (debits) are recorded by external
//! callers. After each insert the engine runs a matching pass that appends
//! [`Match`] rows linking part of a donation to part of an expenditure, so
//! every dollar spent can be traced back to the donations that funded it.
//!
//! - [`allocator`] computes new matches from current balances (pure).
//! - [`MatchingCoordinator`] serializes passes and retries transient failures.
//! - [`LedgerStore`] is the storage boundary; [`DatabaseLedger`] implements it
//!   with sea-orm.
//! - [`Engine::dashboard`] summarizes a donor's giving.

pub use commands::{NewDonation, NewDonor, NewExpenditure, NewMedia};
pub use coordinator::{MatchingConfig, MatchingCoordinator, PassOutcome, TriggerMode};
pub use dashboard::{Contribution, Dashboard};
pub use donations::Donation;
pub use donors::Donor;
pub use error::EngineError;
pub use expenditures::Expenditure;
pub use matches::{Match, NewMatch};
pub use media::{Media, MediaKind};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, Recorded};
pub use store::{DatabaseLedger, LedgerStore};

pub mod allocator;
mod commands;
mod coordinator;
mod dashboard;
mod donations;
mod donors;
mod error;
mod expenditures;
mod matches;
mod media;
mod money;
mod ops;
mod store;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

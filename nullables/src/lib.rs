//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the DAO core (wall clock, balance custodian,
//! reward pool) has an in-memory stand-in here that:
//! - returns deterministic values
//! - can be steered programmatically, including forced failures
//! - records what was asked of it so tests can assert on it
//!
//! Usage: hand these to the ledger and the DAO in tests instead of real ones.

pub mod clock;
pub mod custodian;
pub mod reward_pool;

pub use clock::NullClock;
pub use custodian::NullCustodian;
pub use reward_pool::NullRewardPool;

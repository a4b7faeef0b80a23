//! Proposal module - the heart of campus voting
//!
//! Handles proposals, vote casting and result tallying.

mod ledger;
mod models;
pub mod seed;
mod store;
pub mod tally;

pub use ledger::VoteReceipt;
pub use models::*;
pub use store::{ProposalStats, ProposalStore, VoteHistoryEntry, VoteResult};

//! Application layer containing the core business logic orchestration.
//!
//! `AccountManager` owns the account lifecycle and its validation rules.
//! `TransferEngine` executes transfers as a single unit of work, writing
//! balance changes back through the account manager.

pub mod accounts;
pub mod ledger;
pub mod transfers;

#[cfg(test)]
mod log_capture;

pub use accounts::AccountManager;
pub use ledger::Ledger;
pub use transfers::TransferEngine;

//! Core of a peer-to-peer payments ledger.
//!
//! Accounts hold a non-negative balance and are identified by a tax document
//! (individual or organization) and an email. Transfers move money between
//! accounts atomically and are never modified afterwards.
//!
//! The crate is laid out as ports and adapters: `domain` holds the types and
//! the storage ports, `application` the services, `infrastructure` the store
//! backends and `interfaces` the batch command surface used by the binary.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;

pub use application::{AccountManager, Ledger, TransferEngine};
pub use error::{LedgerError, Result};

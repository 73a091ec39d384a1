//! Domain types and the storage ports the application layer depends on.

pub mod account;
pub mod document;
pub mod ports;
pub mod transfer;

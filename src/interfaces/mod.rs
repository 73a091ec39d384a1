//! Outer adapters: batch commands and their CSV encoding.

pub mod command;
pub mod csv;

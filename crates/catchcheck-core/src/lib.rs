//! Catchcheck Core - Domain models, verification rules, and configuration
//!
//! This crate contains the catch-submission domain types, the verification
//! engine that gates whether a catch is auto-accepted, and layered config.

pub mod config;
pub mod error;
pub mod models;
pub mod verification;

pub use error::{CatchError, Result};

//! Catchcheck Store - Persistence port and adapters
//!
//! This crate defines the persistence collaborator that receives finalized
//! catches, plus in-memory and JSON-file implementations.

pub mod file;
pub mod memory;
pub mod ports;

pub use file::JsonFileCatchStore;
pub use memory::MemoryCatchStore;
pub use ports::{review_catch, CatchStore};

//! Catchcheck Oracle - Image analysis port and adapters
//!
//! This crate defines the contract an external image-analysis service must
//! satisfy, the fail-closed guard the submission flow calls it through, and
//! an HTTP adapter for the Gemini `generateContent` API.

pub mod gemini;
pub mod guard;
pub mod ports;
pub mod response;

// Re-export main types
pub use gemini::GeminiOracle;
pub use guard::{analyze_fail_closed, AnalysisOutcome};
pub use ports::ImageOracle;

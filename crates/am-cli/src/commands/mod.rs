//! CLI command implementations.
//!
//! - [`silence`] - Silence management

pub mod silence;

pub use silence::{SilenceAddCommand, SubmissionReport};

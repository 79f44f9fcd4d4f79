//! Tabline Core - Common infrastructure for tabular data extractors
//!
//! This crate provides the HTTP plumbing, error types, logging,
//! progress reporting and JSON output shared by the source crates.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod writer;

// Re-exports for convenience
pub use error::{FetchError, WriteError};
pub use http::{SHARED_RUNTIME, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress};
pub use writer::write_json;

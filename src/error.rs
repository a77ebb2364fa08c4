//! Error types and result handling for nsq-shipper.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use nsq_shipper::{Error, Result};
//!
//! fn check_capacity(capacity: usize) -> Result<()> {
//!     if capacity == 0 {
//!         return Err(Error::Config("queue capacity must be at least 1".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! match check_capacity(0) {
//!     Ok(()) => println!("Capacity ok"),
//!     Err(Error::Config(msg)) => eprintln!("Configuration error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for nsq-shipper operations.
///
/// This enum represents all possible errors that can occur while encoding
/// and delivering records, from configuration issues to transport failures.
/// Errors raised inside the logging pipeline are absorbed by the background
/// worker and only surface through tracing; the redo pipeline and the worker
/// lifecycle operations return them directly.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, typically an invalid queue or endpoint setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding error for a log record.
    #[error("Log encoding error: {0}")]
    LogEncoding(#[from] serde_json::Error),

    /// MessagePack encoding error for a redo record envelope.
    #[error("Redo encoding error: {0}")]
    RedoEncoding(#[from] rmp_serde::encode::Error),

    /// BSON encoding error for a change value document.
    #[error("Change document encoding error: {0}")]
    DocEncoding(#[from] bson::ser::Error),

    /// BSON decoding error for a change value document.
    #[error("Change document decoding error: {0}")]
    DocDecoding(#[from] bson::de::Error),

    /// HTTP client error: connection failure, timeout, or an unreadable
    /// response body.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The broker answered the publish request with a non-success status.
    #[error("Broker rejected publish (status {status}): {reply}")]
    Rejected {
        /// HTTP status code returned by the broker.
        status: u16,
        /// Response body, as text.
        reply: String,
    },

    /// The worker did not finish draining within the shutdown grace period.
    #[error("Worker did not drain within the grace period")]
    DrainTimeout,
}

/// A convenient Result type alias for nsq-shipper operations.
///
/// This is equivalent to `std::result::Result<T, nsq_shipper::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
pub mod error;
pub mod metrics;
pub mod transport;

pub mod logger;
pub mod redo;

pub use config::{LoggerConfig, OverflowPolicy, RedoConfig};
pub use error::{Error, Result};
pub use logger::{Level, LogRecord, LogShipper, LogWorker};
pub use metrics::MetricsSnapshot;
pub use redo::{Change, RedoRecord, RedoShipper};
pub use transport::HttpTransport;

//! Redo record publishing.
//!
//! Unlike the log pipeline there is no queue here: a transaction wants to
//! know whether its redo record made it out, so `publish` encodes and POSTs
//! inline and hands the outcome back to the caller.

use crate::config::RedoConfig;
use crate::metrics::{MetricsSnapshot, ShipperMetrics};
use crate::redo::record::RedoRecord;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use tracing::{error, warn};

/// Publisher for redo records. Clones share one HTTP client and one
/// counter set.
#[derive(Debug, Clone)]
pub struct RedoShipper {
    pub_addr: String,
    transport: HttpTransport,
    metrics: Arc<ShipperMetrics>,
}

impl RedoShipper {
    /// Creates a publisher for the configured endpoint.
    pub fn new(config: RedoConfig) -> Result<Self> {
        Ok(Self {
            pub_addr: config.pub_addr,
            transport: HttpTransport::new(config.request_timeout)?,
            metrics: Arc::new(ShipperMetrics::default()),
        })
    }

    /// Encodes `record` as a MessagePack map and POSTs it to the broker.
    ///
    /// The record is borrowed, not consumed: on failure the caller still
    /// holds it and decides whether to retry, park it, or give it up.
    pub async fn publish(&self, record: &RedoRecord) -> Result<()> {
        let body = match rmp_serde::to_vec_named(record) {
            Ok(body) => body,
            Err(e) => {
                self.metrics.record_failed();
                error!(api = record.api(), error = %e, "failed to encode redo record");
                return Err(e.into());
            }
        };
        match self.transport.deliver(&self.pub_addr, body.into()).await {
            Ok(()) => {
                self.metrics.record_delivered();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_failed();
                warn!(api = record.api(), uid = record.uid(), error = %e, "failed to publish redo record");
                Err(e)
            }
        }
    }

    /// A point-in-time copy of the publisher counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

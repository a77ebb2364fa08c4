//! Log shipping facade and its background worker.
//!
//! [`LogShipper`] is the producer side: a cheap-to-clone handle whose level
//! methods stamp a [`LogRecord`] and enqueue it. [`LogWorker`] owns the
//! consumer side: a single task that dequeues records, encodes them as JSON
//! and POSTs them to the broker. The two halves share nothing but the queue
//! and a counter set, so a slow or dead broker never stalls the caller
//! beyond the queue bound.

use crate::config::{LoggerConfig, OverflowPolicy};
use crate::logger::record::{Level, LogRecord};
use crate::metrics::{MetricsSnapshot, ShipperMetrics};
use crate::transport::HttpTransport;
use crate::{Error, Result};
use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Producer handle for the log pipeline.
///
/// Every level method captures its call site, stamps a record and hands it
/// to the queue. The returned future completes once the record is enqueued
/// (or discarded, per the overflow policy); it never resolves to an error.
/// Clones share the same queue and worker.
#[derive(Debug, Clone)]
pub struct LogShipper {
    tx: mpsc::Sender<LogRecord>,
    inner: Arc<ShipperShared>,
}

/// State shared by all clones of a [`LogShipper`].
#[derive(Debug)]
struct ShipperShared {
    prefix: String,
    host: String,
    overflow: OverflowPolicy,
    metrics: Arc<ShipperMetrics>,
    closed_warned: AtomicBool,
}

impl LogShipper {
    /// Creates the pipeline: bounded queue, HTTP transport, and the worker
    /// task. Must be called from within a Tokio runtime.
    ///
    /// Returns the producer handle together with the [`LogWorker`] that owns
    /// the spawned task. Keep the worker around for shutdown; dropping it
    /// stops the task after a final drain.
    pub fn start(config: LoggerConfig) -> Result<(LogShipper, LogWorker)> {
        if config.capacity == 0 {
            return Err(Error::Config(
                "log queue capacity must be at least 1".to_string(),
            ));
        }
        let transport = HttpTransport::new(config.request_timeout)?;
        let (tx, rx) = mpsc::channel(config.capacity);
        let (stop_tx, stop_rx) = oneshot::channel();
        let metrics = Arc::new(ShipperMetrics::default());

        let task = PublishTask {
            rx,
            stop: stop_rx,
            transport,
            pub_addr: config.pub_addr,
            metrics: Arc::clone(&metrics),
        };
        let join = tokio::spawn(task.run());

        let shipper = LogShipper {
            tx,
            inner: Arc::new(ShipperShared {
                prefix: config.prefix,
                host: config.host,
                overflow: config.overflow,
                metrics,
                closed_warned: AtomicBool::new(false),
            }),
        };
        let worker = LogWorker {
            stop: stop_tx,
            join,
        };
        Ok((shipper, worker))
    }

    /// Emits a FINEST-level record.
    #[track_caller]
    pub fn finest(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Finest, msg.into(), Location::caller())
    }

    /// Emits a FINEST-level record from format arguments.
    #[track_caller]
    pub fn finestf<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Finest, args.to_string(), Location::caller())
    }

    /// Emits a FINE-level record.
    #[track_caller]
    pub fn fine(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Fine, msg.into(), Location::caller())
    }

    /// Emits a FINE-level record from format arguments.
    #[track_caller]
    pub fn finef<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Fine, args.to_string(), Location::caller())
    }

    /// Emits a DEBUG-level record.
    #[track_caller]
    pub fn debug(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Debug, msg.into(), Location::caller())
    }

    /// Emits a DEBUG-level record from format arguments.
    #[track_caller]
    pub fn debugf<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Debug, args.to_string(), Location::caller())
    }

    /// Emits a TRACE-level record.
    #[track_caller]
    pub fn trace(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Trace, msg.into(), Location::caller())
    }

    /// Emits a TRACE-level record from format arguments.
    #[track_caller]
    pub fn tracef<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Trace, args.to_string(), Location::caller())
    }

    /// Emits an INFO-level record.
    ///
    /// ```no_run
    /// # async fn example(shipper: nsq_shipper::LogShipper) {
    /// shipper.info("listener started").await;
    /// shipper.infof(format_args!("accepted connection from {}", "10.0.0.7")).await;
    /// # }
    /// ```
    #[track_caller]
    pub fn info(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Info, msg.into(), Location::caller())
    }

    /// Emits an INFO-level record from format arguments.
    #[track_caller]
    pub fn infof<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Info, args.to_string(), Location::caller())
    }

    /// Emits a WARNING-level record.
    #[track_caller]
    pub fn warning(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Warning, msg.into(), Location::caller())
    }

    /// Emits a WARNING-level record from format arguments.
    #[track_caller]
    pub fn warningf<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Warning, args.to_string(), Location::caller())
    }

    /// Emits an ERROR-level record.
    #[track_caller]
    pub fn error(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Error, msg.into(), Location::caller())
    }

    /// Emits an ERROR-level record from format arguments.
    #[track_caller]
    pub fn errorf<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Error, args.to_string(), Location::caller())
    }

    /// Emits a CRITICAL-level record.
    #[track_caller]
    pub fn critical(&self, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(Level::Critical, msg.into(), Location::caller())
    }

    /// Emits a CRITICAL-level record from format arguments.
    #[track_caller]
    pub fn criticalf<'a>(&'a self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'a {
        self.publish(Level::Critical, args.to_string(), Location::caller())
    }

    /// Emits a record at a level chosen at runtime.
    #[track_caller]
    pub fn log(&self, level: Level, msg: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.publish(level, msg.into(), Location::caller())
    }

    /// A point-in-time copy of the pipeline counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stamps the record synchronously, so the timestamp and call site
    /// reflect the moment of the call even if the future is polled later,
    /// then enqueues it per the overflow policy.
    fn publish(
        &self,
        level: Level,
        msg: String,
        caller: &'static Location<'static>,
    ) -> impl Future<Output = ()> + Send + '_ {
        let record = LogRecord {
            prefix: self.inner.prefix.clone(),
            time: Utc::now(),
            host: self.inner.host.clone(),
            level,
            msg,
            caller: caller.file().to_string(),
            line_no: caller.line(),
        };
        async move {
            match self.inner.overflow {
                OverflowPolicy::Block => {
                    if self.tx.send(record).await.is_ok() {
                        self.inner.metrics.record_enqueued();
                    } else {
                        self.absorb_closed();
                    }
                }
                OverflowPolicy::Drop => match self.tx.try_send(record) {
                    Ok(()) => self.inner.metrics.record_enqueued(),
                    Err(TrySendError::Full(_)) => self.inner.metrics.record_dropped(),
                    Err(TrySendError::Closed(_)) => self.absorb_closed(),
                },
            }
        }
    }

    /// The queue only closes once the worker has stopped. Count the record
    /// as dropped and say so once, not once per record.
    fn absorb_closed(&self) {
        self.inner.metrics.record_dropped();
        if !self.inner.closed_warned.swap(true, Ordering::Relaxed) {
            warn!("log queue is closed; discarding further records");
        }
    }
}

/// Owner of the background publish task.
pub struct LogWorker {
    stop: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl LogWorker {
    /// Stops the worker and waits up to `grace` for it to drain the queue.
    ///
    /// On a stop signal the worker refuses new records, ships everything
    /// already queued, and exits. [`Error::DrainTimeout`] means the deadline
    /// passed first; the task keeps draining in the background but this
    /// process may exit before it finishes.
    pub async fn shutdown(self, grace: Duration) -> Result<()> {
        // send fails only if the task already exited; the join settles it.
        let _ = self.stop.send(());
        match tokio::time::timeout(grace, self.join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!(error = %e, "log publish task aborted");
                Ok(())
            }
            Err(_) => Err(Error::DrainTimeout),
        }
    }
}

/// The consumer loop. One instance per pipeline, driven by a spawned task.
struct PublishTask {
    rx: mpsc::Receiver<LogRecord>,
    stop: oneshot::Receiver<()>,
    transport: HttpTransport,
    pub_addr: String,
    metrics: Arc<ShipperMetrics>,
}

impl PublishTask {
    async fn run(mut self) {
        debug!(pub_addr = %self.pub_addr, "log publish loop started");
        loop {
            tokio::select! {
                maybe = self.rx.recv() => match maybe {
                    Some(record) => self.ship(record).await,
                    // Every producer handle is gone.
                    None => break,
                },
                _ = &mut self.stop => break,
            }
        }
        // Refuse new records, then push out whatever is already queued.
        // Closing also wakes producers blocked on a full queue.
        self.rx.close();
        while let Ok(record) = self.rx.try_recv() {
            self.ship(record).await;
        }
        debug!("log publish loop stopped");
    }

    /// Encodes and POSTs one record. Failures are counted and traced, never
    /// propagated: the record is simply lost.
    async fn ship(&self, record: LogRecord) {
        let body = match serde_json::to_vec(&record) {
            Ok(body) => body,
            Err(e) => {
                let e = Error::LogEncoding(e);
                self.metrics.record_failed();
                error!(error = %e, "failed to encode log record, discarding");
                return;
            }
        };
        match self.transport.deliver(&self.pub_addr, body.into()).await {
            Ok(()) => self.metrics.record_delivered(),
            Err(e) => {
                self.metrics.record_failed();
                warn!(error = %e, msg = %record.msg, "failed to publish log record");
            }
        }
    }
}

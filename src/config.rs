//! Pipeline configuration and broker endpoint resolution.
//!
//! Both pipelines resolve their publish endpoint once, at configuration
//! construction time: an `NSQD_HOST` override produces
//! `<override>/pub?topic=<TOPIC>`, otherwise the hardcoded default address
//! (which already carries its topic) is used. The resolved URL is immutable
//! for the lifetime of the shipper built from it.

use std::env;
use std::time::Duration;

/// Environment variable overriding the nsqd base address for both pipelines.
pub const ENV_NSQD_HOST: &str = "NSQD_HOST";

/// Default publish endpoint for the log pipeline.
pub const DEFAULT_LOG_PUB_ADDR: &str = "http://172.17.42.1:4151/pub?topic=LOG";

/// Default publish endpoint for the redo pipeline.
pub const DEFAULT_REDO_PUB_ADDR: &str = "http://172.17.42.1:4151/pub?topic=REDOLOG";

/// Broker topic carrying log records.
pub const LOG_TOPIC: &str = "LOG";

/// Broker topic carrying redo records.
pub const REDO_TOPIC: &str = "REDOLOG";

/// Default bound of the log publishing queue, in records.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Producer behavior when the log publishing queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Wait until the consumer frees a slot. Enqueue latency is unbounded
    /// under sustained overload, but no record is lost before the transport.
    #[default]
    Block,
    /// Discard the record immediately and increment the dropped counter.
    Drop,
}

/// Configuration for the log shipping pipeline.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Process-wide tag stamped into every record.
    pub prefix: String,
    /// Host identity stamped into every record.
    pub host: String,
    /// Full publish URL, including the topic query parameter.
    pub pub_addr: String,
    /// Queue bound, in records. Must be at least 1.
    pub capacity: usize,
    /// Full-queue policy.
    pub overflow: OverflowPolicy,
    /// Per-request deadline for the HTTP POST. `None` relies on the client
    /// default, which does not time out.
    pub request_timeout: Option<Duration>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            host: "localhost".to_string(),
            pub_addr: DEFAULT_LOG_PUB_ADDR.to_string(),
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
            request_timeout: None,
        }
    }
}

impl LoggerConfig {
    /// Builds a configuration from the process environment: the publish
    /// address honors [`ENV_NSQD_HOST`] and the host identity is seeded from
    /// `HOSTNAME` when present.
    pub fn from_env() -> Self {
        Self {
            host: env_hostname(),
            pub_addr: resolve_pub_addr(ENV_NSQD_HOST, DEFAULT_LOG_PUB_ADDR, LOG_TOPIC),
            ..Self::default()
        }
    }
}

/// Configuration for the redo shipping pipeline.
#[derive(Debug, Clone)]
pub struct RedoConfig {
    /// Full publish URL, including the topic query parameter.
    pub pub_addr: String,
    /// Per-request deadline for the HTTP POST. `None` relies on the client
    /// default, which does not time out.
    pub request_timeout: Option<Duration>,
}

impl Default for RedoConfig {
    fn default() -> Self {
        Self {
            pub_addr: DEFAULT_REDO_PUB_ADDR.to_string(),
            request_timeout: None,
        }
    }
}

impl RedoConfig {
    /// Builds a configuration from the process environment, honoring
    /// [`ENV_NSQD_HOST`].
    pub fn from_env() -> Self {
        Self {
            pub_addr: resolve_pub_addr(ENV_NSQD_HOST, DEFAULT_REDO_PUB_ADDR, REDO_TOPIC),
            ..Self::default()
        }
    }
}

/// Computes a publish URL for `topic` under the given broker base address.
pub fn pub_addr_for(base_addr: &str, topic: &str) -> String {
    format!("{}/pub?topic={}", base_addr.trim_end_matches('/'), topic)
}

/// Resolves a pipeline's publish URL: the environment override wins when set
/// and non-empty, otherwise the hardcoded default (already carrying its
/// topic) is returned unchanged.
pub fn resolve_pub_addr(env_var: &str, default_addr: &str, topic: &str) -> String {
    match env::var(env_var) {
        Ok(base) if !base.trim().is_empty() => pub_addr_for(&base, topic),
        _ => default_addr.to_string(),
    }
}

fn env_hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

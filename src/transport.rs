//! HTTP delivery to the broker's publish endpoint.

use crate::{Error, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

/// Content type of every publish request body.
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// One-shot HTTP publisher.
///
/// `deliver` performs a single POST per call: no retry, no backoff. The
/// response body is read to completion and discarded on every path so the
/// underlying connection is always returned to the pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport. A `request_timeout` of `None` leaves the round
    /// trip unbounded (the reqwest default).
    pub fn new(request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// POSTs `body` to `pub_addr` and drains the response.
    ///
    /// A connection-level failure maps to [`Error::Transport`]; a non-2xx
    /// status to [`Error::Rejected`], with the drained reply attached.
    pub async fn deliver(&self, pub_addr: &str, body: Bytes) -> Result<()> {
        let response = self
            .client
            .post(pub_addr)
            .header(CONTENT_TYPE, MIME_OCTET_STREAM)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let reply = response.bytes().await?;
        trace!(pub_addr, status = status.as_u16(), "publish round trip");

        if !status.is_success() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                reply: String::from_utf8_lossy(&reply).into_owned(),
            });
        }
        Ok(())
    }
}

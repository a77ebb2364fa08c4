use nsq_shipper::config::pub_addr_for;
use nsq_shipper::transport::MIME_OCTET_STREAM;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a broker double that accepts publishes for `topic` with a plain
/// `OK`, the way nsqd answers `/pub`.
pub async fn start_broker(topic: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pub"))
        .and(query_param("topic", topic))
        .and(header("content-type", MIME_OCTET_STREAM))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    server
}

/// Starts a broker double that rejects every publish with `status`.
pub async fn start_rejecting_broker(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(status).set_body_string("E_BAD_TOPIC"))
        .mount(&server)
        .await;
    server
}

/// The full publish URL for `topic` on the mock broker.
pub fn pub_addr(server: &MockServer, topic: &str) -> String {
    pub_addr_for(&server.uri(), topic)
}

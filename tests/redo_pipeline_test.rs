mod common;

use common::{pub_addr, start_broker, start_rejecting_broker};
use nsq_shipper::{Error, RedoConfig, RedoRecord, RedoShipper};
use std::time::Duration;

fn redo_config(addr: String) -> RedoConfig {
    RedoConfig {
        pub_addr: addr,
        request_timeout: Some(Duration::from_secs(5)),
    }
}

#[tokio::test]
async fn test_published_record_decodes_with_changes_in_order() {
    let server = start_broker("REDOLOG").await;
    let shipper = RedoShipper::new(redo_config(pub_addr(&server, "REDOLOG"))).unwrap();

    let mut record = RedoRecord::new(42, "UpdateProfile", 1000);
    record.add_change("users", "name", &"Alice");
    record.add_change("users", "age", &30i32);
    shipper.publish(&record).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let back: RedoRecord = rmp_serde::from_slice(&requests[0].body).unwrap();
    assert_eq!(back.api(), "UpdateProfile");
    assert_eq!(back.uid(), 42);
    assert_eq!(back.ts(), 1000);

    let changes = back.changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].collection, "users");
    assert_eq!(changes[0].field, "name");
    assert_eq!(changes[0].decode::<String>().unwrap(), "Alice");
    assert_eq!(changes[1].field, "age");
    assert_eq!(changes[1].decode::<i32>().unwrap(), 30);

    assert_eq!(shipper.metrics().delivered, 1);
}

#[tokio::test]
async fn test_record_without_changes_still_publishes() {
    let server = start_broker("REDOLOG").await;
    let shipper = RedoShipper::new(redo_config(pub_addr(&server, "REDOLOG"))).unwrap();

    let record = RedoRecord::new(7, "Heartbeat", 2000);
    shipper.publish(&record).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let back: RedoRecord = rmp_serde::from_slice(&requests[0].body).unwrap();
    assert!(back.changes().is_empty());
}

#[tokio::test]
async fn test_rejected_publish_surfaces_status() {
    let server = start_rejecting_broker(404).await;
    let shipper = RedoShipper::new(redo_config(pub_addr(&server, "REDOLOG"))).unwrap();

    let record = RedoRecord::new(1, "Purchase", 3000);
    match shipper.publish(&record).await {
        Err(Error::Rejected { status, reply }) => {
            assert_eq!(status, 404);
            assert_eq!(reply, "E_BAD_TOPIC");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert_eq!(shipper.metrics().failed, 1);
}

#[tokio::test]
async fn test_unreachable_broker_surfaces_transport_error() {
    let shipper = RedoShipper::new(redo_config(
        "http://127.0.0.1:9/pub?topic=REDOLOG".to_string(),
    ))
    .unwrap();

    let record = RedoRecord::new(1, "Purchase", 3000);
    assert!(matches!(
        shipper.publish(&record).await,
        Err(Error::Transport(_))
    ));
    assert_eq!(shipper.metrics().failed, 1);
}

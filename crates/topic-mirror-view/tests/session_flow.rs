//! End-to-end flow: snapshots in, tree + selection + history out.

use serde_json::json;
use topic_mirror_core::MirrorConfig;
use topic_mirror_view::{ConnectionState, MirrorSession};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn temp_snapshot(message: &str, counter: u64) -> serde_json::Value {
    json!({
        "sensors": {
            "temp": {
                "_message": message,
                "_messagesCounter": counter,
                "_topic": "sensors/temp",
            }
        }
    })
}

#[test]
fn select_then_refresh_appends_exactly_one_entry() {
    init_tracing();
    let mut session = MirrorSession::new(MirrorConfig::default());
    session.connect("broker-1");

    session
        .apply_snapshot(&temp_snapshot("21", 1))
        .expect("first snapshot");

    let temp_id = {
        let tree = session.tree().expect("tree");
        let sensors = tree.child("sensors").expect("sensors");
        let temp = sensors.child("temp").expect("temp");
        assert_eq!(temp.id, "topic-tree-root/sensors/temp");
        assert_eq!(temp.meta.full_path.as_deref(), Some("sensors/temp"));
        temp.id.clone()
    };

    session.select(&temp_id);
    assert!(session.history().is_empty());

    session
        .apply_snapshot(&temp_snapshot("22", 2))
        .expect("second snapshot");

    assert_eq!(session.history().len(), 1);
    assert_eq!(
        session.history().get(0).and_then(|e| e.message.as_deref()),
        Some("22")
    );
    let node = session.selected_node().expect("resolved");
    assert_eq!(node.meta.message.as_deref(), Some("22"));
}

#[test]
fn sixty_accepted_changes_cap_history_at_51() {
    init_tracing();
    let mut session = MirrorSession::new(MirrorConfig::default());
    session.connect("broker-1");
    session
        .apply_snapshot(&temp_snapshot("0", 0))
        .expect("seed snapshot");
    session.select("topic-tree-root/sensors/temp");

    for n in 1..=60u64 {
        session
            .apply_snapshot(&temp_snapshot(&format!("payload-{n}"), n))
            .expect("refresh");
    }

    assert_eq!(session.history().len(), 51);
    assert_eq!(
        session.history().get(0).and_then(|e| e.message.as_deref()),
        Some("payload-60")
    );
    assert_eq!(
        session.history().iter().last().and_then(|e| e.message.as_deref()),
        Some("payload-10")
    );
}

#[test]
fn full_lifecycle_across_connection_switch() {
    init_tracing();
    let mut session = MirrorSession::new(MirrorConfig::default());
    assert_eq!(session.state(), ConnectionState::Disconnected);

    session.connect("broker-1");
    session
        .apply_snapshot(&temp_snapshot("21", 1))
        .expect("snapshot");
    session.select("topic-tree-root/sensors/temp");
    session
        .apply_snapshot(&temp_snapshot("22", 2))
        .expect("snapshot");
    assert_eq!(session.history().len(), 1);

    // Switching brokers resets everything; history never leaks across.
    session.connect("broker-2");
    assert_eq!(session.state(), ConnectionState::ConnectedNoSnapshot);
    assert!(session.history().is_empty());
    assert!(session.selected_id().is_none());

    session
        .apply_snapshot(&json!({"other": {"_messagesCounter": 7}}))
        .expect("snapshot on new broker");
    assert_eq!(session.state(), ConnectionState::ConnectedWithTree);
    assert!(session.tree().expect("tree").child("other").is_some());

    session.disconnect();
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(session.tree().is_none());
}

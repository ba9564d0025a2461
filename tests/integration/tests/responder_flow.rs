//! Integration test: connection auto-responder against the in-memory
//! agent, including failure isolation and stop semantics.

use std::sync::Arc;
use std::time::Duration;

use fides_agent::{AgentClient, ConnectionFilter, ConnectionState, MemoryAgent};
use fides_responder::ConnectionResponder;

#[tokio::test]
async fn test_responder_drains_inbound_offers() {
    let agent = Arc::new(MemoryAgent::new());
    for i in 0..3 {
        agent.seed_inbound_offer(&format!("holder-{}", i));
    }

    let responder = ConnectionResponder::new(agent.clone());
    responder.set_interval_ms(10).unwrap();
    responder.start().unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    responder.stop().await;

    assert_eq!(agent.accept_count(), 3);
    let pending = agent
        .get_connections(&ConnectionFilter::by_state(ConnectionState::InboundOffer))
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_responder_survives_accept_failures() {
    let agent = Arc::new(MemoryAgent::new());
    agent.set_fail_accept(true);
    agent.seed_inbound_offer("bad-holder");

    let responder = ConnectionResponder::new(agent.clone());
    responder.set_interval_ms(10).unwrap();
    responder.start().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    // The failed offer was deleted and the loop kept going: a new,
    // healthy offer is still accepted.
    agent.set_fail_accept(false);
    agent.seed_inbound_offer("good-holder");
    tokio::time::sleep(Duration::from_millis(100)).await;
    responder.stop().await;

    assert_eq!(agent.accept_count(), 1);
    let connected = agent
        .get_connections(&ConnectionFilter::by_state(ConnectionState::Connected))
        .await
        .unwrap();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].remote.name.as_deref(), Some("good-holder"));
}

#[tokio::test]
async fn test_responder_stop_halts_accepting() {
    let agent = Arc::new(MemoryAgent::new());
    let responder = ConnectionResponder::new(agent.clone());
    responder.set_interval_ms(10).unwrap();
    responder.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    responder.stop().await;

    let before = agent.accept_count();
    agent.seed_inbound_offer("late-holder");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(agent.accept_count(), before);
}

use std::sync::Arc;
use std::time::Duration;

use beamcast_client::SessionEvent;
use beamcast_core::{Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TestPatternCapture, bridge, fast_retry_config, spawn_session,
    spawn_session_with_config};

/// Presenter and viewer in room "R1", cross-wired the way the relay would
/// wire them: both reach `Stable`, one answer total, the request loop
/// self-cancels, and every transmitted offer is the same cached
/// description.
#[tokio::test]
async fn test_end_to_end_negotiation_reaches_stable() {
    init_tracing();

    let mut viewer = spawn_session_with_config(Role::Viewer, "R1", None, fast_retry_config());
    let mut presenter = spawn_session(Role::Presenter, "R1", Some(Arc::new(TestPatternCapture)));

    bridge(presenter.take_outbound(), viewer.inbound.clone());
    bridge(viewer.take_outbound(), presenter.inbound.clone());

    // the viewer is alone in the room first and starts asking for an offer
    viewer.start().await;
    viewer.inbound.send(SignalMessage::Joined).await.unwrap();

    presenter.start().await;
    presenter.inbound.send(SignalMessage::Joined).await.unwrap();

    viewer
        .wait_for_event("viewer stable", |e| {
            matches!(e, SessionEvent::NegotiationComplete)
        })
        .await;
    presenter
        .wait_for_event("presenter stable", |e| {
            matches!(e, SessionEvent::NegotiationComplete)
        })
        .await;

    // the request loop has self-cancelled
    let before = viewer.signaling.count_need_offers().await;
    tokio::time::sleep(Duration::from_millis(900)).await;
    let after = viewer.signaling.count_need_offers().await;
    assert!(after - before <= 1, "need-offer loop still running");

    // duplicate requests only ever produced the one cached description and
    // a single answer
    let offers = presenter.signaling.offers().await;
    assert!(!offers.is_empty());
    assert!(
        offers.iter().all(|sdp| sdp == &offers[0]),
        "retransmissions must reuse the committed offer"
    );
    assert_eq!(viewer.signaling.answers().await.len(), 1);
}

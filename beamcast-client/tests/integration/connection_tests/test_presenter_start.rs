use std::sync::Arc;
use std::time::Duration;

use beamcast_core::{Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{DeniedCapture, TestPatternCapture, spawn_session};

#[tokio::test]
async fn test_presenter_joins_and_offers_on_start() {
    init_tracing();

    let mut presenter = spawn_session(Role::Presenter, "R1", Some(Arc::new(TestPatternCapture)));
    presenter.start().await;

    presenter
        .expect_outbound("join", |m| {
            matches!(m, SignalMessage::Join { room } if room.as_str() == "R1")
        })
        .await;
    let offer = presenter
        .expect_outbound("offer", |m| matches!(m, SignalMessage::Offer { .. }))
        .await;
    let SignalMessage::Offer { sdp } = offer else {
        unreachable!()
    };
    assert!(sdp.contains("v=0"), "offer should carry an SDP description");

    presenter.wait_for_status_containing("presenting in room R1").await;
}

#[tokio::test]
async fn test_capture_failure_is_terminal_for_the_attempt() {
    init_tracing();

    let mut presenter = spawn_session(Role::Presenter, "R1", Some(Arc::new(DeniedCapture)));
    presenter.start().await;

    let status = presenter
        .wait_for_status_containing("screen capture failed")
        .await;
    assert!(status.contains("permission denied"));

    // no offer ever goes out and the core does not retry on its own
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(presenter.signaling.offers().await.is_empty());
}

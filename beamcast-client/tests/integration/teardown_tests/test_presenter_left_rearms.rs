use std::time::Duration;

use beamcast_client::SessionEvent;
use beamcast_core::{Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{OfferFactory, fast_retry_config, spawn_session_with_config};

/// The viewer loses its presenter, re-arms the request loop and
/// renegotiates with a second presenter joining the same room later.
#[tokio::test]
async fn test_presenter_left_rearms_and_renegotiates() {
    init_tracing();

    let mut viewer = spawn_session_with_config(Role::Viewer, "R2", None, fast_retry_config());
    viewer.start().await;
    viewer.inbound.send(SignalMessage::Joined).await.unwrap();
    viewer
        .expect_outbound("first need-offer", |m| matches!(m, SignalMessage::NeedOffer))
        .await;

    let mut first = OfferFactory::new().await;
    let sdp = first.offer().await;
    viewer
        .inbound
        .send(SignalMessage::Offer { sdp })
        .await
        .unwrap();
    viewer
        .wait_for_event("first negotiation", |e| {
            matches!(e, SessionEvent::NegotiationComplete)
        })
        .await;

    // the presenter goes away: teardown, clear the surface, ask again
    viewer
        .inbound
        .send(SignalMessage::PresenterLeft)
        .await
        .unwrap();
    viewer
        .wait_for_event("render surface cleared", |e| {
            matches!(e, SessionEvent::RemoteCleared)
        })
        .await;
    viewer.wait_for_status_containing("awaiting new presenter").await;

    let resumed_from = viewer.signaling.count_need_offers().await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(
        viewer.signaling.count_need_offers().await > resumed_from,
        "need-offer requests must resume after the presenter leaves"
    );

    // a second presenter appears and negotiation completes again
    let mut second = OfferFactory::new().await;
    let sdp = second.offer().await;
    viewer
        .inbound
        .send(SignalMessage::Offer { sdp })
        .await
        .unwrap();
    viewer
        .wait_for_event("second negotiation", |e| {
            matches!(e, SessionEvent::NegotiationComplete)
        })
        .await;
    assert_eq!(viewer.signaling.answers().await.len(), 2);

    let settled = viewer.signaling.count_need_offers().await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(
        viewer.signaling.count_need_offers().await - settled <= 1,
        "the loop must cancel again after renegotiation"
    );
}

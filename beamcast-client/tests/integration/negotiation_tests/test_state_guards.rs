use beamcast_client::{CaptureSource, NegotiationState, PeerSession, SessionConfig};
use beamcast_core::{Role, SignalMessage};
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{OfferFactory, TestPatternCapture, spawn_session};

const HOST_CANDIDATE: &str =
    r#"{"candidate":"candidate:1 1 udp 2130706431 127.0.0.1 54555 typ host"}"#;

#[tokio::test]
async fn test_full_offer_answer_walks_the_states() {
    init_tracing();

    let (ptx, _prx) = mpsc::channel(64);
    let mut presenter = PeerSession::new(&SessionConfig::default(), ptx)
        .await
        .unwrap();
    let tracks = TestPatternCapture.acquire().await.unwrap();
    presenter.attach_local_media(tracks).await.unwrap();
    assert_eq!(presenter.negotiation_state(), NegotiationState::Idle);

    let offer = presenter.create_offer().await.unwrap();
    assert_eq!(presenter.negotiation_state(), NegotiationState::HaveLocalOffer);

    let (vtx, _vrx) = mpsc::channel(64);
    let mut viewer = PeerSession::new(&SessionConfig::default(), vtx)
        .await
        .unwrap();
    let answer = viewer
        .accept_remote_offer(offer)
        .await
        .unwrap()
        .expect("fresh offer must be answered");
    assert_eq!(viewer.negotiation_state(), NegotiationState::Stable);

    let applied = presenter.apply_remote_answer(answer).await.unwrap();
    assert!(applied);
    assert_eq!(presenter.negotiation_state(), NegotiationState::Stable);
}

#[tokio::test]
async fn test_early_candidates_do_not_break_negotiation() {
    init_tracing();

    let mut viewer = spawn_session(Role::Viewer, "R1", None);
    viewer.start().await;

    // a candidate racing ahead of the first offer is dropped, not fatal
    viewer
        .inbound
        .send(SignalMessage::Ice {
            candidate: HOST_CANDIDATE.to_string(),
        })
        .await
        .unwrap();

    let mut presenter = OfferFactory::new().await;
    let sdp = presenter.offer().await;
    viewer
        .inbound
        .send(SignalMessage::Offer { sdp })
        .await
        .unwrap();
    viewer
        .expect_outbound("answer", |m| matches!(m, SignalMessage::Answer { .. }))
        .await;
}

#[tokio::test]
async fn test_repeated_candidates_are_tolerated() {
    init_tracing();

    let mut presenter = OfferFactory::new().await;
    let offer = presenter.offer().await;

    let (tx, _rx) = mpsc::channel(64);
    let mut viewer = PeerSession::new(&SessionConfig::default(), tx)
        .await
        .unwrap();
    viewer.accept_remote_offer(offer).await.unwrap();

    // the same candidate twice, then a malformed one: all tolerated
    viewer
        .apply_remote_candidate(HOST_CANDIDATE.to_string())
        .await;
    viewer
        .apply_remote_candidate(HOST_CANDIDATE.to_string())
        .await;
    viewer
        .apply_remote_candidate("not a candidate".to_string())
        .await;
    assert_eq!(viewer.negotiation_state(), NegotiationState::Stable);
}

use std::sync::Arc;

use beamcast_core::{Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{OfferFactory, TestPatternCapture, spawn_session};

#[tokio::test]
async fn test_the_local_offer_is_cached_per_connection() {
    init_tracing();

    let mut factory = OfferFactory::new().await;
    let first = factory.offer().await;
    let second = factory.offer().await;
    assert_eq!(first, second, "a committed offer must be reused verbatim");
}

#[tokio::test]
async fn test_a_new_connection_mints_a_new_description() {
    init_tracing();

    let mut first = OfferFactory::new().await;
    let mut second = OfferFactory::new().await;
    assert_ne!(first.offer().await, second.offer().await);
}

#[tokio::test]
async fn test_need_offer_retransmits_the_committed_description() {
    init_tracing();

    let mut presenter = spawn_session(Role::Presenter, "R1", Some(Arc::new(TestPatternCapture)));
    presenter.start().await;
    presenter
        .expect_outbound("offer", |m| matches!(m, SignalMessage::Offer { .. }))
        .await;

    presenter.inbound.send(SignalMessage::NeedOffer).await.unwrap();
    presenter.inbound.send(SignalMessage::NeedOffer).await.unwrap();
    presenter
        .expect_outbound("retransmission", |m| matches!(m, SignalMessage::Offer { .. }))
        .await;
    presenter
        .expect_outbound("retransmission", |m| matches!(m, SignalMessage::Offer { .. }))
        .await;

    let offers = presenter.signaling.offers().await;
    assert_eq!(offers.len(), 3);
    assert!(
        offers.iter().all(|sdp| sdp == &offers[0]),
        "every need-offer must be answered with the same description"
    );
}

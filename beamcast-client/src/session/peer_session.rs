use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::media::CaptureTracks;
use crate::session::negotiation::NegotiationState;
use crate::session::peer_event::PeerEvent;
use beamcast_core::{CandidateInfo, CandidateSeen};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;

/// One peer connection's lifecycle: creation, track attachment,
/// description exchange, candidate application, teardown.
///
/// Mutation goes through the owning `RoomSession`; connection callbacks
/// only forward `PeerEvent`s into its loop.
pub struct PeerSession {
    pc: Arc<RTCPeerConnection>,
    state: NegotiationState,
    cached_offer: Option<String>,
    last_remote_offer: Option<String>,
    senders: Vec<Arc<RTCRtpSender>>,
    attached_tracks: HashSet<String>,
    local_seen: CandidateSeen,
    remote_seen: CandidateSeen,
    closed: bool,
}

impl PeerSession {
    /// Create the underlying connection and register the four observation
    /// callbacks (local candidate, remote track, signaling state,
    /// connection state). An empty ICE server list is valid and keeps
    /// negotiation on host candidates only.
    pub async fn new(
        config: &SessionConfig,
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self, SessionError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        let pc = Arc::new(
            api.new_peer_connection(RTCConfiguration {
                ice_servers,
                ..Default::default()
            })
            .await?,
        );

        let ice_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |candidate| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(json) = serde_json::to_string(&init) else {
                    return;
                };
                let _ = tx.send(PeerEvent::LocalCandidate(json)).await;
            })
        }));

        let track_tx = event_tx.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                info!(kind = %track.kind(), "remote track received");
                let _ = tx.send(PeerEvent::RemoteTrack(track)).await;
            })
        }));

        let sig_tx = event_tx.clone();
        pc.on_signaling_state_change(Box::new(move |state| {
            let tx = sig_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PeerEvent::SignalingChange(state)).await;
            })
        }));

        let conn_tx = event_tx;
        pc.on_peer_connection_state_change(Box::new(move |state| {
            let tx = conn_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PeerEvent::ConnectionChange(state)).await;
            })
        }));

        Ok(Self {
            pc,
            state: NegotiationState::Idle,
            cached_offer: None,
            last_remote_offer: None,
            senders: Vec::new(),
            attached_tracks: HashSet::new(),
            local_seen: CandidateSeen::new(),
            remote_seen: CandidateSeen::new(),
            closed: false,
        })
    }

    pub fn negotiation_state(&self) -> NegotiationState {
        self.state
    }

    /// Attach local capture tracks for outbound transmission. Re-adding a
    /// track that is already attached is a silent no-op.
    pub async fn attach_local_media(&mut self, tracks: CaptureTracks) -> Result<(), SessionError> {
        for track in tracks {
            if !self.attached_tracks.insert(track.id().to_string()) {
                debug!(track = %track.id(), "track already attached, skipping");
                continue;
            }
            let sender = self.pc.add_track(track).await?;
            self.senders.push(sender);
        }
        Ok(())
    }

    /// Generate and commit the local offer, or return the cached one when a
    /// description is already committed. Regenerating for a live connection
    /// risks a description/ICE mismatch, so a fresh description only exists
    /// after teardown and re-creation.
    pub async fn create_offer(&mut self) -> Result<String, SessionError> {
        if let Some(sdp) = &self.cached_offer {
            debug!("retransmitting cached local offer");
            return Ok(sdp.clone());
        }
        let offer = self.pc.create_offer(None).await?;
        self.pc.set_local_description(offer.clone()).await?;
        self.cached_offer = Some(offer.sdp.clone());
        self.state = NegotiationState::HaveLocalOffer;
        Ok(offer.sdp)
    }

    /// Commit a remote offer, then answer only if the post-commit state is
    /// `HaveRemoteOffer`. A duplicate of the already-applied offer leaves
    /// the state as-is and yields no answer; a different offer on a stable
    /// session is genuine renegotiation.
    pub async fn accept_remote_offer(
        &mut self,
        sdp: String,
    ) -> Result<Option<String>, SessionError> {
        let renegotiation = self.state == NegotiationState::Stable
            && self.last_remote_offer.as_deref() != Some(sdp.as_str());

        let desc = RTCSessionDescription::offer(sdp.clone())?;
        if let Err(e) = self.pc.set_remote_description(desc).await {
            // duplicates and racing descriptions are expected under
            // unordered delivery; the state guard below decides the outcome
            warn!(error = %e, "remote offer not applied by transport");
        }
        self.last_remote_offer = Some(sdp);

        self.state = match self.state {
            NegotiationState::Idle => NegotiationState::HaveRemoteOffer,
            NegotiationState::Stable if renegotiation => NegotiationState::HaveRemoteOffer,
            other => other,
        };

        if self.state != NegotiationState::HaveRemoteOffer {
            info!(state = ?self.state, "offer accepted without answer");
            return Ok(None);
        }

        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer.clone()).await?;
        self.state = NegotiationState::Stable;
        Ok(Some(answer.sdp))
    }

    /// Commit a remote answer. Outside the `HaveLocalOffer` state the
    /// answer is discarded, not applied. Returns whether negotiation
    /// reached `Stable`.
    pub async fn apply_remote_answer(&mut self, sdp: String) -> Result<bool, SessionError> {
        if self.state != NegotiationState::HaveLocalOffer {
            info!(state = ?self.state, "discarding answer outside offer exchange");
            return Ok(false);
        }
        let desc = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        self.state = NegotiationState::Stable;
        Ok(true)
    }

    /// Add a remote ICE candidate. A candidate racing ahead of the remote
    /// description is expected under unordered delivery, so failures are
    /// logged and swallowed.
    pub async fn apply_remote_candidate(&mut self, candidate_json: String) {
        Self::note_candidate(&mut self.remote_seen, "remote", &candidate_json);
        let init = match serde_json::from_str::<RTCIceCandidateInit>(&candidate_json) {
            Ok(init) => init,
            // tolerate a bare attribute line as well
            Err(_) => RTCIceCandidateInit {
                candidate: candidate_json,
                ..Default::default()
            },
        };
        if let Err(e) = self.pc.add_ice_candidate(init).await {
            warn!(error = %e, "remote candidate not applied");
        }
    }

    pub(crate) fn note_local_candidate(&mut self, candidate_json: &str) {
        Self::note_candidate(&mut self.local_seen, "local", candidate_json);
    }

    fn note_candidate(seen: &mut CandidateSeen, direction: &str, candidate_json: &str) {
        let line = match serde_json::from_str::<RTCIceCandidateInit>(candidate_json) {
            Ok(init) => init.candidate,
            Err(_) => candidate_json.to_string(),
        };
        match CandidateInfo::parse(&line) {
            Some(info) => {
                if seen.insert(&info) {
                    debug!(
                        direction,
                        typ = %info.typ,
                        address = %info.address,
                        port = info.port,
                        "ice candidate"
                    );
                }
            }
            None => debug!(direction, "unparseable candidate line ignored"),
        }
    }

    /// Release senders before closing so capture indicators do not linger,
    /// then close the connection. Safe to call more than once; every step
    /// is guarded so one failure never blocks the rest.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for sender in self.senders.drain(..) {
            if let Err(e) = sender.replace_track(None).await {
                warn!(error = %e, "failed to detach sender track");
            }
        }
        if let Err(e) = self.pc.close().await {
            warn!(error = %e, "failed to close peer connection");
        }
        self.state = NegotiationState::Idle;
    }
}

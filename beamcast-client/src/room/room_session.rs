use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::media::CaptureSource;
use crate::room::command::SessionCommand;
use crate::room::event::SessionEvent;
use crate::room::retry::NeedOfferRetry;
use crate::session::{PeerEvent, PeerSession};
use crate::signaling::SignalingChannel;
use beamcast_core::{Role, RoomName, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Reason the relay refuses a second presenter for a live room.
const PRESENTER_EXISTS: &str = "presenter-exists";

/// Role-specific negotiation state machine for one room attempt.
///
/// Owns the peer session, the cached offer and the retry controller
/// exclusively. Collaborators only observe emitted `SessionEvent`s and the
/// outbound signaling messages; nothing mutates session state from outside
/// the loop.
pub struct RoomSession {
    role: Role,
    room: RoomName,
    config: SessionConfig,
    signaling: Arc<dyn SignalingChannel>,
    capture: Option<Arc<dyn CaptureSource>>,
    events: mpsc::Sender<SessionEvent>,
    peer: Option<PeerSession>,
    peer_tx: mpsc::Sender<PeerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    retry: Option<NeedOfferRetry>,
    started: bool,
}

impl RoomSession {
    pub fn new(
        role: Role,
        room: RoomName,
        config: SessionConfig,
        signaling: Arc<dyn SignalingChannel>,
        capture: Option<Arc<dyn CaptureSource>>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let (peer_tx, peer_rx) = mpsc::channel(64);
        Self {
            role,
            room,
            config,
            signaling,
            capture,
            events,
            peer: None,
            peer_tx,
            peer_rx,
            retry: None,
            started: false,
        }
    }

    /// Event loop over caller commands, inbound signaling and peer events.
    /// Runs until the command channel closes or the signaling stream ends.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut inbound: mpsc::Receiver<SignalMessage>,
    ) {
        info!(room = %self.room, role = ?self.role, "room session started");

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(SessionCommand::Start) => self.handle_start().await,
                    Some(SessionCommand::End) => self.handle_end().await,
                    None => {
                        debug!("command channel closed, shutting down");
                        self.teardown("session dropped").await;
                        break;
                    }
                },

                msg = inbound.recv() => match msg {
                    Some(msg) => self.handle_signal(msg).await,
                    None => {
                        // relay connection dropped: nothing can progress
                        self.status("signaling channel closed").await;
                        self.teardown("signaling channel closed").await;
                        break;
                    }
                },

                evt = self.peer_rx.recv() => {
                    if let Some(evt) = evt {
                        self.handle_peer_event(evt).await;
                    }
                }
            }
        }

        info!(room = %self.room, role = ?self.role, "room session finished");
    }

    async fn handle_start(&mut self) {
        if self.started {
            debug!("start ignored, session already started");
            return;
        }
        self.started = true;
        match self.role {
            Role::Presenter => self.start_presenter().await,
            Role::Viewer => self.start_viewer().await,
        }
    }

    async fn start_presenter(&mut self) {
        self.status("preparing broadcast").await;
        if self
            .send(SignalMessage::Join {
                room: self.room.clone(),
            })
            .await
            .is_err()
        {
            self.started = false;
            return;
        }

        let Some(capture) = self.capture.clone() else {
            self.status("no capture source configured").await;
            self.started = false;
            return;
        };
        let tracks = match capture.acquire().await {
            Ok(tracks) => tracks,
            Err(e) => {
                // terminal for this attempt: the user may retry, the core
                // does not
                self.status(&format!("screen capture failed: {e}")).await;
                self.started = false;
                return;
            }
        };

        let mut peer = match PeerSession::new(&self.config, self.peer_tx.clone()).await {
            Ok(peer) => peer,
            Err(e) => {
                self.status(&format!("peer connection failed: {e}")).await;
                self.started = false;
                return;
            }
        };
        if let Err(e) = peer.attach_local_media(tracks).await {
            self.status(&format!("failed to attach capture tracks: {e}"))
                .await;
            peer.close().await;
            self.started = false;
            return;
        }

        match peer.create_offer().await {
            Ok(sdp) => {
                self.peer = Some(peer);
                let _ = self.send(SignalMessage::Offer { sdp }).await;
                self.status(&format!("presenting in room {}", self.room))
                    .await;
            }
            Err(e) => {
                self.status(&format!("offer generation failed: {e}")).await;
                peer.close().await;
                self.started = false;
            }
        }
    }

    async fn start_viewer(&mut self) {
        self.status("joining room").await;
        let _ = self
            .send(SignalMessage::Join {
                room: self.room.clone(),
            })
            .await;
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        match self.role {
            Role::Presenter => self.handle_presenter_signal(msg).await,
            Role::Viewer => self.handle_viewer_signal(msg).await,
        }
    }

    async fn handle_presenter_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Answer { sdp } => {
                let Some(peer) = self.peer.as_mut() else {
                    debug!("answer before peer session, ignoring");
                    return;
                };
                match peer.apply_remote_answer(sdp).await {
                    Ok(true) => {
                        self.status("viewer connected").await;
                        let _ = self.events.send(SessionEvent::NegotiationComplete).await;
                    }
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "failed to apply answer"),
                }
            }

            SignalMessage::Ice { candidate } => self.apply_candidate(candidate).await,

            SignalMessage::NeedOffer => {
                // a late viewer asks for the description: retransmit the
                // committed offer verbatim, or mint the first one
                let Some(peer) = self.peer.as_mut() else {
                    debug!("need-offer before peer session, ignoring");
                    return;
                };
                match peer.create_offer().await {
                    Ok(sdp) => {
                        let _ = self.send(SignalMessage::Offer { sdp }).await;
                    }
                    Err(e) => warn!(error = %e, "offer retransmission failed"),
                }
            }

            SignalMessage::Error { reason } if reason == PRESENTER_EXISTS => {
                // the room already has a live presenter: release quietly
                self.status("another presenter is already active").await;
                self.teardown("presenter conflict").await;
                self.started = false;
            }
            SignalMessage::Error { reason } => {
                self.status(&format!("relay error: {reason}")).await;
            }

            SignalMessage::Joined => debug!("join acknowledged"),

            SignalMessage::EndPresentation | SignalMessage::PresenterLeft => {
                // echo of our own teardown, nothing to change locally
                debug!("presentation end echo ignored");
            }

            SignalMessage::Offer { .. } | SignalMessage::Join { .. } => {
                debug!("unexpected message for presenter role, ignoring");
            }
        }
    }

    async fn handle_viewer_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Joined => {
                self.status("joined, waiting for a presenter").await;
                self.arm_retry();
            }

            SignalMessage::Offer { sdp } => self.handle_remote_offer(sdp).await,

            SignalMessage::Ice { candidate } => self.apply_candidate(candidate).await,

            SignalMessage::EndPresentation | SignalMessage::PresenterLeft => {
                self.handle_presenter_gone().await;
            }

            SignalMessage::Error { reason } => {
                self.status(&format!("relay error: {reason}")).await;
            }

            SignalMessage::Answer { .. } | SignalMessage::NeedOffer | SignalMessage::Join { .. } => {
                debug!("unexpected message for viewer role, ignoring");
            }
        }
    }

    async fn handle_remote_offer(&mut self, sdp: String) {
        if self.peer.is_none() {
            self.peer = match PeerSession::new(&self.config, self.peer_tx.clone()).await {
                Ok(peer) => Some(peer),
                Err(e) => {
                    self.status(&format!("peer connection failed: {e}")).await;
                    return;
                }
            };
        }
        let Some(peer) = self.peer.as_mut() else {
            return;
        };

        match peer.accept_remote_offer(sdp).await {
            Ok(answer) => {
                // the remote description is committed: the request loop has
                // done its job
                self.stop_retry();
                if let Some(sdp) = answer {
                    let _ = self.send(SignalMessage::Answer { sdp }).await;
                    self.status("connected, receiving broadcast").await;
                    let _ = self.events.send(SessionEvent::NegotiationComplete).await;
                }
            }
            Err(e) => warn!(error = %e, "failed to apply remote offer"),
        }
    }

    async fn handle_presenter_gone(&mut self) {
        info!(room = %self.room, "presenter left the room");
        self.teardown("presenter left").await;
        let _ = self.events.send(SessionEvent::RemoteCleared).await;
        self.status("awaiting new presenter").await;
        self.arm_retry();
    }

    async fn handle_end(&mut self) {
        if self.started && self.role == Role::Presenter {
            let _ = self.send(SignalMessage::EndPresentation).await;
        }
        self.teardown("ended by user").await;
        if self.started {
            self.status("presentation ended").await;
        }
        self.started = false;
    }

    async fn handle_peer_event(&mut self, evt: PeerEvent) {
        match evt {
            PeerEvent::LocalCandidate(candidate) => {
                if let Some(peer) = self.peer.as_mut() {
                    peer.note_local_candidate(&candidate);
                }
                let _ = self.send(SignalMessage::Ice { candidate }).await;
            }
            PeerEvent::RemoteTrack(track) => {
                let _ = self.events.send(SessionEvent::RemoteTrack(track)).await;
            }
            PeerEvent::SignalingChange(state) => debug!(?state, "transport signaling state"),
            PeerEvent::ConnectionChange(state) => {
                debug!(?state, "peer connection state");
                if state == RTCPeerConnectionState::Failed {
                    self.status("peer connection failed").await;
                }
            }
        }
    }

    async fn apply_candidate(&mut self, candidate: String) {
        match self.peer.as_mut() {
            Some(peer) => peer.apply_remote_candidate(candidate).await,
            // a candidate racing ahead of the first offer has nothing to
            // attach to yet
            None => debug!("remote candidate before peer session, dropped"),
        }
    }

    fn arm_retry(&mut self) {
        // never two timers for one room
        self.stop_retry();
        self.retry = Some(NeedOfferRetry::arm(
            self.signaling.clone(),
            self.config.need_offer_interval,
        ));
    }

    fn stop_retry(&mut self) {
        if let Some(retry) = self.retry.take() {
            retry.stop();
        }
    }

    /// Release everything held for the current attempt. Every step is
    /// guarded; running this again when nothing is live is a no-op.
    async fn teardown(&mut self, reason: &str) {
        debug!(%reason, "tearing down peer session");
        self.stop_retry();
        if let Some(mut peer) = self.peer.take() {
            peer.close().await;
        }
    }

    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError> {
        if let Err(e) = self.signaling.send(msg).await {
            warn!(error = %e, "signaling send failed");
            return Err(e);
        }
        Ok(())
    }

    async fn status(&self, text: &str) {
        info!(room = %self.room, "{text}");
        let _ = self.events.send(SessionEvent::Status(text.to_string())).await;
    }
}

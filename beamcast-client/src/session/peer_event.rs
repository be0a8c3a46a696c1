use std::sync::Arc;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::track::track_remote::TrackRemote;

/// Events surfaced by a `PeerSession`'s connection callbacks. Consumed
/// only by the owning `RoomSession` loop, so no two handlers for one
/// session ever run concurrently.
pub enum PeerEvent {
    /// A local ICE candidate (serialized init JSON) is ready to go out
    /// through signaling.
    LocalCandidate(String),
    /// The remote side attached a media track.
    RemoteTrack(Arc<TrackRemote>),
    SignalingChange(RTCSignalingState),
    ConnectionChange(RTCPeerConnectionState),
}

/// Explicit offer/answer progress for one peer connection. Every guard in
/// the session logic branches on this enum, never on the transport
/// library's own state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
}

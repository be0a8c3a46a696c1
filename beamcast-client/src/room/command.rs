/// Caller-issued commands for a running `RoomSession`.
#[derive(Debug)]
pub enum SessionCommand {
    /// Begin the role flow: join the room and, for a presenter, capture
    /// the screen and transmit the offer.
    Start,
    /// Presenter-initiated end of the broadcast. Also resets the session
    /// so the role can be started again.
    End,
}

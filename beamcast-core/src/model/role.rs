/// Which side of the broadcast a session attempt plays. Chosen once per
/// attempt and immutable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Presenter,
    Viewer,
}

/// Lifecycle of one connection.
///
/// `Disconnected → Connecting` on connect, `Connecting → Connected` once the
/// handshake produced a valid version, any state `→ Disconnected` on
/// error, explicit disconnect or a fatal frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

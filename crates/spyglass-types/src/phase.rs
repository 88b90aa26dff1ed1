use serde::{Deserialize, Serialize};

/// The state of a protocol connection.
///
/// A connection advances monotonically through these and never returns to an
/// earlier phase within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConnectionPhase {
    Handshake,
    Status,
    Login,
    Play,
}

impl ConnectionPhase {
    pub fn from_handshake_next(next: i32) -> Option<Self> {
        match next {
            1 => Some(ConnectionPhase::Status),
            2 => Some(ConnectionPhase::Login),
            _ => None,
        }
    }

    /// Stable discriminant, used to park the phase in an atomic cell.
    pub fn index(self) -> u8 {
        match self {
            ConnectionPhase::Handshake => 0,
            ConnectionPhase::Status => 1,
            ConnectionPhase::Login => 2,
            ConnectionPhase::Play => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ConnectionPhase::Handshake),
            1 => Some(ConnectionPhase::Status),
            2 => Some(ConnectionPhase::Login),
            3 => Some(ConnectionPhase::Play),
            _ => None,
        }
    }
}

/// Which way a packet travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Client to server.
    Inbound,
    /// Server to client.
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

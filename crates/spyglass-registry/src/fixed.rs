use spyglass_types::{ConnectionPhase, Direction};

use crate::PacketKind;

/// Id assignment for the Handshake, Status and Login phases is a flat
/// enumeration with literal ids, identical across every protocol revision.
pub(crate) fn resolve(
    direction: Direction,
    phase: ConnectionPhase,
    id: i32,
) -> Option<PacketKind> {
    match (phase, direction) {
        (ConnectionPhase::Handshake, Direction::Inbound) => match id {
            0x00 => Some(PacketKind::Handshake),
            0xFE => Some(PacketKind::LegacyServerListPing),
            _ => None,
        },
        (ConnectionPhase::Handshake, Direction::Outbound) => None,
        (ConnectionPhase::Status, Direction::Inbound) => match id {
            0x00 => Some(PacketKind::StatusRequest),
            0x01 => Some(PacketKind::StatusPing),
            _ => None,
        },
        (ConnectionPhase::Status, Direction::Outbound) => match id {
            0x00 => Some(PacketKind::StatusResponse),
            0x01 => Some(PacketKind::StatusPong),
            _ => None,
        },
        (ConnectionPhase::Login, Direction::Inbound) => match id {
            0x00 => Some(PacketKind::LoginStart),
            0x01 => Some(PacketKind::EncryptionResponse),
            0x02 => Some(PacketKind::LoginPluginResponse),
            _ => None,
        },
        (ConnectionPhase::Login, Direction::Outbound) => match id {
            0x00 => Some(PacketKind::LoginDisconnect),
            0x01 => Some(PacketKind::EncryptionRequest),
            0x02 => Some(PacketKind::LoginSuccess),
            0x03 => Some(PacketKind::SetCompression),
            0x04 => Some(PacketKind::LoginPluginRequest),
            _ => None,
        },
        (ConnectionPhase::Play, _) => None,
    }
}

pub(crate) fn id_of(
    direction: Direction,
    phase: ConnectionPhase,
    kind: PacketKind,
) -> Option<i32> {
    let id = match (phase, direction, kind) {
        (ConnectionPhase::Handshake, Direction::Inbound, PacketKind::Handshake) => 0x00,
        (ConnectionPhase::Handshake, Direction::Inbound, PacketKind::LegacyServerListPing) => 0xFE,
        (ConnectionPhase::Status, Direction::Inbound, PacketKind::StatusRequest) => 0x00,
        (ConnectionPhase::Status, Direction::Inbound, PacketKind::StatusPing) => 0x01,
        (ConnectionPhase::Status, Direction::Outbound, PacketKind::StatusResponse) => 0x00,
        (ConnectionPhase::Status, Direction::Outbound, PacketKind::StatusPong) => 0x01,
        (ConnectionPhase::Login, Direction::Inbound, PacketKind::LoginStart) => 0x00,
        (ConnectionPhase::Login, Direction::Inbound, PacketKind::EncryptionResponse) => 0x01,
        (ConnectionPhase::Login, Direction::Inbound, PacketKind::LoginPluginResponse) => 0x02,
        (ConnectionPhase::Login, Direction::Outbound, PacketKind::LoginDisconnect) => 0x00,
        (ConnectionPhase::Login, Direction::Outbound, PacketKind::EncryptionRequest) => 0x01,
        (ConnectionPhase::Login, Direction::Outbound, PacketKind::LoginSuccess) => 0x02,
        (ConnectionPhase::Login, Direction::Outbound, PacketKind::SetCompression) => 0x03,
        (ConnectionPhase::Login, Direction::Outbound, PacketKind::LoginPluginRequest) => 0x04,
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tables_are_bijective() {
        let phases = [
            ConnectionPhase::Handshake,
            ConnectionPhase::Status,
            ConnectionPhase::Login,
        ];
        for phase in phases {
            for direction in [Direction::Inbound, Direction::Outbound] {
                for id in 0..0x100 {
                    if let Some(kind) = resolve(direction, phase, id) {
                        assert_eq!(
                            id_of(direction, phase, kind),
                            Some(id),
                            "{direction} {phase:?} id {id:#x}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_legacy_ping() {
        assert_eq!(
            resolve(Direction::Inbound, ConnectionPhase::Handshake, 0xFE),
            Some(PacketKind::LegacyServerListPing)
        );
    }

    #[test]
    fn test_no_clientbound_handshake_packets() {
        assert_eq!(
            resolve(Direction::Outbound, ConnectionPhase::Handshake, 0x00),
            None
        );
    }
}

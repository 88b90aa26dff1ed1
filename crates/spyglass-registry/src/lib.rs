pub mod fixed;
pub mod kind;
pub mod play;

pub use kind::PacketKind;

use std::sync::{Arc, OnceLock};

use spyglass_types::{ConnectionPhase, Direction, ProtocolVersion};
use thiserror::Error;

use play::PlayTables;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(ProtocolVersion),
}

/// Bidirectional lookup between numeric wire ids and packet kinds, scoped per
/// (direction, phase, version).
///
/// Handshake/Status/Login ids are fixed for all versions. Play ids renumber
/// across revisions and come from the version-ranged declarations in
/// [`play`]; their tables are built on first use and immutable afterwards, so
/// lookups from many connections share them without synchronization.
pub struct PacketRegistry {
    inbound_play: PlayTables,
    outbound_play: PlayTables,
}

impl PacketRegistry {
    /// The registry for the vanilla protocol declarations shipped with this
    /// crate. Shared process-wide; tables build on first use.
    pub fn vanilla() -> Arc<PacketRegistry> {
        static VANILLA: OnceLock<Arc<PacketRegistry>> = OnceLock::new();
        VANILLA
            .get_or_init(|| {
                Arc::new(PacketRegistry::with_play_declarations(
                    play::SERVERBOUND_RANGES,
                    play::CLIENTBOUND_RANGES,
                ))
            })
            .clone()
    }

    /// Build a registry from explicit Play-phase declarations, one ordered
    /// (range floor, kinds-in-id-order) list per direction. Declarations must
    /// be ascending by version and must not repeat a kind within a list.
    pub fn with_play_declarations(
        inbound: &[(ProtocolVersion, &'static [PacketKind])],
        outbound: &[(ProtocolVersion, &'static [PacketKind])],
    ) -> Self {
        Self {
            inbound_play: PlayTables::new(inbound),
            outbound_play: PlayTables::new(outbound),
        }
    }

    /// Map a numeric wire id to its packet kind. `Ok(None)` means the id is
    /// not declared for this scope; callers decide whether that is fatal.
    pub fn resolve(
        &self,
        direction: Direction,
        phase: ConnectionPhase,
        version: ProtocolVersion,
        id: i32,
    ) -> Result<Option<PacketKind>, RegistryError> {
        match phase {
            ConnectionPhase::Play => {
                Ok(self.play_tables(direction).table_for(version)?.resolve(id))
            }
            _ => Ok(fixed::resolve(direction, phase, id)),
        }
    }

    /// Inverse of [`resolve`](Self::resolve).
    pub fn id_of(
        &self,
        direction: Direction,
        phase: ConnectionPhase,
        version: ProtocolVersion,
        kind: PacketKind,
    ) -> Result<Option<i32>, RegistryError> {
        match phase {
            ConnectionPhase::Play => {
                Ok(self.play_tables(direction).table_for(version)?.id_of(kind))
            }
            _ => Ok(fixed::id_of(direction, phase, kind)),
        }
    }

    fn play_tables(&self, direction: Direction) -> &PlayTables {
        match direction {
            Direction::Inbound => &self.inbound_play,
            Direction::Outbound => &self.outbound_play,
        }
    }
}

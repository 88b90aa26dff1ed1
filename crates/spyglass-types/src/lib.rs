pub mod phase;
pub mod version;

pub use phase::{ConnectionPhase, Direction};
pub use version::ProtocolVersion;

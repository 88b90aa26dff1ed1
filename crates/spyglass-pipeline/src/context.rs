use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use std::sync::Arc;

use spyglass_types::{ConnectionPhase, ProtocolVersion};
use tracing::warn;

use crate::pipeline::Pipeline;

/// Connection state shared between the inbound and outbound processing
/// paths: the negotiated protocol version and the current phase. Both
/// directions read it while only the handshake/login flow writes it.
#[derive(Debug)]
pub struct ConnState {
    version: AtomicI32,
    phase: AtomicU8,
}

impl Default for ConnState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnState {
    pub fn new() -> Self {
        Self {
            version: AtomicI32::new(-1),
            phase: AtomicU8::new(ConnectionPhase::Handshake.index()),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        ProtocolVersion(self.version.load(Ordering::Acquire))
    }

    pub fn set_version(&self, version: ProtocolVersion) {
        self.version.store(version.epoch(), Ordering::Release);
    }

    pub fn phase(&self) -> ConnectionPhase {
        let index = self.phase.load(Ordering::Acquire);
        ConnectionPhase::from_index(index).unwrap_or(ConnectionPhase::Handshake)
    }

    /// Advance the phase. Progression is monotonic; an attempt to move
    /// backwards is ignored.
    pub fn advance_phase(&self, to: ConnectionPhase) -> bool {
        let previous = self.phase.fetch_max(to.index(), Ordering::AcqRel);
        if previous > to.index() {
            warn!(
                "Ignoring phase regression {:?} -> {:?}",
                ConnectionPhase::from_index(previous),
                to
            );
            return false;
        }
        true
    }
}

/// Engine lifecycle on one connection. `TornDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Uninstalled,
    Installed,
    TornDown,
}

/// Per-connection state: the shared version/phase cells, the stage pipeline,
/// and where the interceptor is in its lifecycle.
///
/// Dropping a context without uninstalling is the shutdown path; the
/// pipeline dies with the connection and nothing needs restoring.
pub struct ConnectionContext {
    state: Arc<ConnState>,
    pipeline: Pipeline,
    install: InstallState,
}

impl ConnectionContext {
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_state(pipeline, Arc::new(ConnState::new()))
    }

    /// Build a context over existing shared cells, so the two directions of
    /// one connection observe the same version/phase.
    pub fn with_state(pipeline: Pipeline, state: Arc<ConnState>) -> Self {
        Self {
            state,
            pipeline,
            install: InstallState::Uninstalled,
        }
    }

    pub fn state(&self) -> Arc<ConnState> {
        self.state.clone()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn install_state(&self) -> InstallState {
        self.install
    }

    pub(crate) fn mark_installed(&mut self) {
        self.install = InstallState::Installed;
    }

    pub(crate) fn mark_torn_down(&mut self) {
        self.install = InstallState::TornDown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_is_monotonic() {
        let state = ConnState::new();
        assert_eq!(state.phase(), ConnectionPhase::Handshake);
        assert!(state.advance_phase(ConnectionPhase::Login));
        assert!(!state.advance_phase(ConnectionPhase::Status));
        assert_eq!(state.phase(), ConnectionPhase::Login);
        assert!(state.advance_phase(ConnectionPhase::Play));
        assert_eq!(state.phase(), ConnectionPhase::Play);
    }

    #[test]
    fn test_version_shared_between_directions() {
        let state = Arc::new(ConnState::new());
        let inbound = ConnectionContext::with_state(Pipeline::new(), state.clone());
        let outbound = ConnectionContext::with_state(Pipeline::new(), state.clone());
        state.set_version(ProtocolVersion::V1_16_4);
        assert_eq!(inbound.state().version(), ProtocolVersion::V1_16_4);
        assert_eq!(outbound.state().version(), ProtocolVersion::V1_16_4);
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use spyglass_codec::{read_var_int, write_var_int, WireCursor};
use spyglass_registry::PacketRegistry;
use spyglass_types::Direction;
use tracing::{debug, trace};

use crate::context::{ConnState, ConnectionContext, InstallState};
use crate::observer::{DispatchOutcome, ObserverSet, PacketObserver, PacketRecord, Priority};
use crate::pipeline::StageContext;
use crate::stage::{PipelineStage, StageFault, StageValue};
use crate::EngineError;

/// Name contract for the stage performing the raw framed-bytes ⇄
/// native-packet conversion; the interceptor wraps whatever is registered
/// under it.
pub const TERMINAL_STAGE: &str = "packet-codec";

/// Installs interception onto connection pipelines and owns the observers
/// every installed connection dispatches to.
pub struct Interceptor {
    registry: Arc<PacketRegistry>,
    observers: Arc<Mutex<ObserverSet>>,
}

impl Interceptor {
    pub fn new(registry: Arc<PacketRegistry>) -> Self {
        Self {
            registry,
            observers: Arc::new(Mutex::new(ObserverSet::new())),
        }
    }

    pub fn register_observer(
        &self,
        priority: Priority,
        observer: Box<dyn PacketObserver>,
    ) -> u64 {
        self.observers_guard().register(priority, observer)
    }

    pub fn remove_observer(&self, id: u64) -> bool {
        self.observers_guard().remove(id)
    }

    /// Wrap the connection's terminal stage. Happens once, when the
    /// connection is first observed.
    pub fn install(&self, ctx: &mut ConnectionContext) -> Result<(), EngineError> {
        match ctx.install_state() {
            InstallState::Installed => return Err(EngineError::AlreadyInstalled),
            InstallState::TornDown => return Err(EngineError::TornDown),
            InstallState::Uninstalled => {}
        }
        let stage = InterceptStage {
            delegate: TERMINAL_STAGE.to_string(),
            registry: self.registry.clone(),
            state: ctx.state(),
            observers: self.observers.clone(),
        };
        ctx.pipeline_mut()
            .wrap(TERMINAL_STAGE, Box::new(stage))
            .map_err(|_| EngineError::TerminalStageMissing(TERMINAL_STAGE.to_string()))?;
        ctx.mark_installed();
        debug!("Interceptor installed over `{}`", TERMINAL_STAGE);
        Ok(())
    }

    /// Detach from the connection, restoring the pipeline to its
    /// pre-install shape. The stage put back is whichever one is currently
    /// wrapped, so a mid-session renegotiation survives the detach. The
    /// context is torn down afterwards and cannot be reinstalled.
    pub fn uninstall(&self, ctx: &mut ConnectionContext) -> Result<(), EngineError> {
        match ctx.install_state() {
            InstallState::Uninstalled => return Err(EngineError::NotInstalled),
            InstallState::TornDown => return Err(EngineError::TornDown),
            InstallState::Installed => {}
        }
        ctx.pipeline_mut()
            .unwrap(TERMINAL_STAGE)
            .ok_or_else(|| EngineError::TerminalStageMissing(TERMINAL_STAGE.to_string()))?;
        ctx.mark_torn_down();
        debug!("Interceptor uninstalled, pipeline restored");
        Ok(())
    }

    fn observers_guard(&self) -> MutexGuard<'_, ObserverSet> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The stage the interceptor installs in the terminal slot. It resolves each
/// raw frame's identity, runs the observers, then delegates to the wrapped
/// terminal stage looked up by name at call time.
struct InterceptStage {
    delegate: String,
    registry: Arc<PacketRegistry>,
    state: Arc<ConnState>,
    observers: Arc<Mutex<ObserverSet>>,
}

impl InterceptStage {
    /// Resolve and observe one raw frame. Returns the frame to forward
    /// (original, or rebuilt around a mutated payload), or `None` when an
    /// observer cancelled the message.
    ///
    /// Mutations are staged on a copy of the payload; a cancelled message
    /// leaves nothing behind.
    fn inspect(
        &mut self,
        direction: Direction,
        mut frame: WireCursor,
    ) -> Result<Option<WireCursor>, StageFault> {
        let phase = self.state.phase();
        let version = self.state.version();
        frame.rewind();
        let id = read_var_int(&mut frame)?;
        let kind = match self.registry.resolve(direction, phase, version, id)? {
            Some(kind) => kind,
            None => {
                // Unknown ids must not break connectivity; forward opaque.
                trace!(
                    "Passing through unmapped {} id=0x{:02X} in {:?}",
                    direction,
                    id,
                    phase
                );
                frame.rewind();
                return Ok(Some(frame));
            }
        };
        let mut record = PacketRecord {
            kind,
            direction,
            phase,
            version,
            id,
            payload: WireCursor::from_slice(frame.unread()),
        };
        let outcome = {
            let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
            observers.dispatch(&mut record)
        };
        match outcome {
            DispatchOutcome::Cancelled => {
                trace!("{} {:?} cancelled by observer", direction, kind);
                Ok(None)
            }
            DispatchOutcome::Forward { mutated: false } => {
                frame.rewind();
                Ok(Some(frame))
            }
            DispatchOutcome::Forward { mutated: true } => {
                let payload = record.payload.as_slice();
                let mut rebuilt = WireCursor::with_capacity(payload.len() + 5);
                write_var_int(&mut rebuilt, id);
                rebuilt.put_slice(payload);
                Ok(Some(rebuilt))
            }
        }
    }

    /// Hand `input` to the currently wrapped stage. The stage is resolved
    /// from the pipeline at call time, so a foreign layer that renegotiated
    /// its stage object since install is still the one delegated to. Faults
    /// other than cancellation are shown to the wrapped stage's own fault
    /// hook and then rethrown verbatim.
    fn delegate(
        &mut self,
        ctx: &mut StageContext<'_>,
        input: StageValue,
        inbound: bool,
    ) -> Result<Vec<StageValue>, StageFault> {
        let Some(mut stage) = ctx.take_wrapped(&self.delegate) else {
            return Err(StageFault::foreign(format!(
                "wrapped stage `{}` is missing",
                self.delegate
            )));
        };
        let result = if inbound {
            stage.decode(ctx, input)
        } else {
            stage.encode(ctx, input)
        };
        if let Err(fault) = &result {
            if !matches!(fault, StageFault::Cancelled) {
                stage.on_fault(fault);
            }
        }
        ctx.restore_wrapped(&self.delegate, stage);
        result
    }
}

impl PipelineStage for InterceptStage {
    fn decode(
        &mut self,
        ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        let frame = match input {
            StageValue::Raw(frame) => frame,
            // An upstream stage already converted this one; nothing to read.
            packet @ StageValue::Packet(_) => return Ok(vec![packet]),
        };
        let Some(frame) = self.inspect(Direction::Inbound, frame)? else {
            return Ok(Vec::new());
        };
        match self.delegate(ctx, StageValue::Raw(frame), true) {
            Err(StageFault::Cancelled) => Ok(Vec::new()),
            other => other,
        }
    }

    fn encode(
        &mut self,
        ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        let produced = match input {
            packet @ StageValue::Packet(_) => {
                match self.delegate(ctx, packet, false) {
                    Err(StageFault::Cancelled) => return Ok(Vec::new()),
                    other => other?,
                }
            }
            // Already serialized by a foreign layer; inspect it directly.
            raw @ StageValue::Raw(_) => vec![raw],
        };
        let mut forwarded = Vec::with_capacity(produced.len());
        for value in produced {
            match value {
                StageValue::Raw(frame) => {
                    if let Some(frame) = self.inspect(Direction::Outbound, frame)? {
                        forwarded.push(StageValue::Raw(frame));
                    }
                }
                other => forwarded.push(other),
            }
        }
        Ok(forwarded)
    }
}

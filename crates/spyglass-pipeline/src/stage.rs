use spyglass_codec::{CodecError, WireCursor};
use spyglass_registry::RegistryError;
use thiserror::Error;

use crate::pipeline::StageContext;

/// The host's structured packet representation at the terminal-stage
/// boundary: the wire id plus the still-encoded body.
#[derive(Debug)]
pub struct NativePacket {
    pub id: i32,
    pub body: WireCursor,
}

/// A value flowing through the pipeline: either still raw framed bytes, or
/// already converted to the host's structured representation.
#[derive(Debug)]
pub enum StageValue {
    Raw(WireCursor),
    Packet(NativePacket),
}

/// A fault raised by a pipeline stage.
///
/// Faults from foreign stages travel through the engine untouched so their
/// own taxonomy stays intact; `Cancelled` is a stage's request to drop the
/// current message rather than an error.
#[derive(Debug, Error)]
pub enum StageFault {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("message cancelled by stage")]
    Cancelled,
    #[error(transparent)]
    Foreign(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StageFault {
    pub fn foreign(message: impl Into<String>) -> Self {
        StageFault::Foreign(message.into().into())
    }
}

/// One link in a connection's ordered processing chain.
///
/// Decode carries inbound values (wire towards host), encode carries
/// outbound ones. A stage may emit zero, one or several values per input;
/// emission order is the order downstream stages observe.
pub trait PipelineStage: Send {
    fn decode(
        &mut self,
        _ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        Ok(vec![input])
    }

    fn encode(
        &mut self,
        _ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        Ok(vec![input])
    }

    /// Called with faults raised while this stage was being delegated to, so
    /// a wrapped stage still sees its own failures.
    fn on_fault(&mut self, _fault: &StageFault) {}
}

/// Reference terminal stage: the raw framed-bytes ⇄ native-packet
/// conversion. Hosts with their own packet representation supply their own
/// stage under the terminal name instead.
pub struct PacketCodecStage;

impl PipelineStage for PacketCodecStage {
    fn decode(
        &mut self,
        _ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        let mut frame = match input {
            StageValue::Raw(frame) => frame,
            other => return Ok(vec![other]),
        };
        frame.rewind();
        let id = spyglass_codec::read_var_int(&mut frame)?;
        let body = WireCursor::from_slice(frame.unread());
        Ok(vec![StageValue::Packet(NativePacket { id, body })])
    }

    fn encode(
        &mut self,
        _ctx: &mut StageContext<'_>,
        input: StageValue,
    ) -> Result<Vec<StageValue>, StageFault> {
        let packet = match input {
            StageValue::Packet(packet) => packet,
            other => return Ok(vec![other]),
        };
        let mut frame = WireCursor::with_capacity(packet.body.len() + 5);
        spyglass_codec::write_var_int(&mut frame, packet.id);
        frame.put_slice(packet.body.as_slice());
        Ok(vec![StageValue::Raw(frame)])
    }
}

use std::sync::Arc;

use spyglass_codec::{read_string, read_u16, read_var_int, write_var_int, WireCursor};
use spyglass_pipeline::{
    ConnState, ConnectionContext, Interceptor, PacketObserver, PacketRecord, Pipeline,
    PipelineStage, Priority, StageFault, StageValue, Verdict, TERMINAL_STAGE,
};
use spyglass_registry::{PacketKind, PacketRegistry};
use spyglass_types::{ConnectionPhase, Direction, ProtocolVersion};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::config::ProxyConfig;
use crate::frame::{Compression, FrameReader, FrameWriter};

/// The relay's terminal stage. Framed bytes already are its native
/// representation, so the conversion is the identity.
struct RelayTerminal;

impl PipelineStage for RelayTerminal {}

/// Watches the handshake/login flow to keep the shared connection state (and
/// the frame layer's compression threshold) in step with the traffic.
struct PhaseTracker {
    state: Arc<ConnState>,
    compression: Arc<Compression>,
}

impl PacketObserver for PhaseTracker {
    fn on_packet(&mut self, record: &PacketRecord) -> Verdict {
        match (record.direction, record.kind) {
            (Direction::Inbound, PacketKind::Handshake) => {
                let mut payload = WireCursor::from_slice(record.payload.as_slice());
                match parse_handshake(&mut payload) {
                    Ok((version, next_state)) => {
                        self.state.set_version(version);
                        match ConnectionPhase::from_handshake_next(next_state) {
                            Some(phase) => {
                                self.state.advance_phase(phase);
                                info!("Handshake: {} -> {:?}", version, phase);
                            }
                            None => warn!("Handshake with unknown next state {next_state}"),
                        }
                    }
                    Err(e) => warn!("Malformed handshake payload: {e}"),
                }
            }
            (Direction::Outbound, PacketKind::SetCompression) => {
                let mut payload = WireCursor::from_slice(record.payload.as_slice());
                match read_var_int(&mut payload) {
                    Ok(threshold) if threshold >= 0 => {
                        debug!("Backend enabled compression (threshold {threshold})");
                        self.compression.stage(threshold);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Malformed set-compression payload: {e}"),
                }
            }
            (Direction::Outbound, PacketKind::LoginSuccess) => {
                self.state.advance_phase(ConnectionPhase::Play);
                debug!("Login success, entering play phase");
            }
            _ => {}
        }
        Verdict::Continue
    }
}

fn parse_handshake(payload: &mut WireCursor) -> spyglass_codec::CodecResult<(ProtocolVersion, i32)> {
    let version = read_var_int(payload)?;
    let _address = read_string(payload, 255)?;
    let _port = read_u16(payload)?;
    let next_state = read_var_int(payload)?;
    Ok((ProtocolVersion(version), next_state))
}

struct PacketLogger;

impl PacketObserver for PacketLogger {
    fn on_packet(&mut self, record: &PacketRecord) -> Verdict {
        trace!(
            "{} {:?} id=0x{:02X} len={}",
            record.direction,
            record.kind,
            record.id,
            record.payload.len()
        );
        Verdict::Continue
    }
}

pub async fn handle_connection(
    client: TcpStream,
    config: Arc<ProxyConfig>,
    shutdown: watch::Receiver<bool>,
) {
    let peer = client
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());
    match run_relay(client, &config, shutdown).await {
        Ok(()) => debug!("Connection {} closed", peer),
        Err(e) => debug!("Connection {} ended: {}", peer, e),
    }
}

async fn run_relay(
    client: TcpStream,
    config: &ProxyConfig,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let backend = TcpStream::connect((config.backend.as_str(), config.backend_port)).await?;
    let (client_read, client_write) = client.into_split();
    let (backend_read, backend_write) = backend.into_split();

    let compression = Arc::new(Compression::new());
    let state = Arc::new(ConnState::new());

    let mut ctx_in = direction_context(state.clone());
    let mut ctx_out = direction_context(state.clone());

    let interceptor = Interceptor::new(PacketRegistry::vanilla());
    interceptor.register_observer(
        Priority::Monitor,
        Box::new(PhaseTracker {
            state: state.clone(),
            compression: compression.clone(),
        }),
    );
    if config.log_packets {
        interceptor.register_observer(Priority::Normal, Box::new(PacketLogger));
    }
    interceptor.install(&mut ctx_in)?;
    interceptor.install(&mut ctx_out)?;

    let mut client_reader = FrameReader::new(client_read, compression.clone());
    let mut backend_writer = FrameWriter::new(backend_write, compression.clone());
    let mut backend_reader = FrameReader::new(backend_read, compression.clone());
    let mut client_writer = FrameWriter::new(client_write, compression.clone());

    let result = tokio::select! {
        r = relay_inbound(&mut ctx_in, &mut client_reader, &mut backend_writer) => r,
        r = relay_outbound(&mut ctx_out, &mut backend_reader, &mut client_writer, &compression) => r,
        _ = shutdown.changed() => {
            // Whole process going down; the pipelines die with it.
            return Ok(());
        }
    };

    // Individual disconnect: unwind the pipelines back to their
    // pre-interception shape before the contexts go away.
    let _ = interceptor.uninstall(&mut ctx_in);
    let _ = interceptor.uninstall(&mut ctx_out);
    result
}

fn direction_context(state: Arc<ConnState>) -> ConnectionContext {
    let mut pipeline = Pipeline::new();
    pipeline
        .append(TERMINAL_STAGE, Box::new(RelayTerminal))
        .expect("fresh pipeline has no duplicate names");
    ConnectionContext::with_state(pipeline, state)
}

/// Client to backend. One frame in, zero or more frames out, in order.
async fn relay_inbound(
    ctx: &mut ConnectionContext,
    reader: &mut FrameReader,
    writer: &mut FrameWriter,
) -> anyhow::Result<()> {
    while let Some(frame) = reader.read_frame().await? {
        let outputs = match ctx.pipeline_mut().run_decode(StageValue::Raw(frame)) {
            Ok(outputs) => outputs,
            Err(fault) => {
                handle_fault(fault)?;
                continue;
            }
        };
        for value in outputs {
            writer.write_frame(value_bytes(value).as_slice()).await?;
        }
    }
    Ok(())
}

/// Backend to client; mirrors [`relay_inbound`]. A staged compression
/// threshold takes effect only after the frame announcing it went out
/// uncompressed.
async fn relay_outbound(
    ctx: &mut ConnectionContext,
    reader: &mut FrameReader,
    writer: &mut FrameWriter,
    compression: &Compression,
) -> anyhow::Result<()> {
    while let Some(frame) = reader.read_frame().await? {
        let outputs = match ctx.pipeline_mut().run_encode(StageValue::Raw(frame)) {
            Ok(outputs) => outputs,
            Err(fault) => {
                handle_fault(fault)?;
                continue;
            }
        };
        for value in outputs {
            writer.write_frame(value_bytes(value).as_slice()).await?;
        }
        compression.apply_pending();
    }
    Ok(())
}

/// A fault is isolated to the message that raised it: a codec fault drops
/// the frame and the relay keeps going, while registry faults (wrong or
/// unsupported protocol version) and foreign faults make the connection
/// unrecoverable.
fn handle_fault(fault: StageFault) -> anyhow::Result<()> {
    match fault {
        StageFault::Codec(e) => {
            warn!("Dropping undecodable frame: {e}");
            Ok(())
        }
        fatal => Err(fatal.into()),
    }
}

fn value_bytes(value: StageValue) -> WireCursor {
    match value {
        StageValue::Raw(cur) => cur,
        StageValue::Packet(packet) => {
            let mut cur = WireCursor::with_capacity(packet.body.len() + 5);
            write_var_int(&mut cur, packet.id);
            cur.put_slice(packet.body.as_slice());
            cur
        }
    }
}

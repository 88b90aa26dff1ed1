pub mod context;
pub mod intercept;
pub mod observer;
pub mod pipeline;
pub mod stage;

pub use context::{ConnState, ConnectionContext, InstallState};
pub use intercept::{Interceptor, TERMINAL_STAGE};
pub use observer::{FnObserver, ObserverSet, PacketObserver, PacketRecord, Priority, Verdict};
pub use pipeline::{Pipeline, PipelineError, StageContext};
pub use stage::{NativePacket, PacketCodecStage, PipelineStage, StageFault, StageValue};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no stage named `{0}` to wrap")]
    TerminalStageMissing(String),
    #[error("interceptor already installed on this connection")]
    AlreadyInstalled,
    #[error("interceptor is not installed")]
    NotInstalled,
    #[error("connection context is torn down")]
    TornDown,
}

pub mod cursor;
pub mod primitives;

pub use cursor::WireCursor;
pub use primitives::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("buffer underflow: needed {needed} more bytes, {remaining} remain")]
    BufferUnderflow { needed: usize, remaining: usize },
    #[error("VarInt wider than 5 bytes")]
    MalformedVarInt,
    #[error("string too long: {length} > {max}")]
    StringTooLong { length: usize, max: usize },
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),
}

pub type CodecResult<T> = Result<T, CodecError>;

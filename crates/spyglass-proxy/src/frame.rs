use std::io::{Read as _, Write as _};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use anyhow::bail;
use bytes::{Buf, BytesMut};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression as ZlibLevel;
use spyglass_codec::{read_var_int, var_int_len, write_var_int, CodecError, WireCursor};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Shared compression state for one relayed connection.
///
/// The threshold announced by the backend is staged first and only applied
/// after the announcing frame itself has been forwarded uncompressed; from
/// then on all four endpoints of the relay frame with compression.
pub struct Compression {
    active: AtomicI32,
    pending: AtomicI32,
}

const UNSET: i32 = i32::MIN;

impl Default for Compression {
    fn default() -> Self {
        Self::new()
    }
}

impl Compression {
    pub fn new() -> Self {
        Self {
            active: AtomicI32::new(UNSET),
            pending: AtomicI32::new(UNSET),
        }
    }

    pub fn stage(&self, threshold: i32) {
        self.pending.store(threshold, Ordering::Release);
    }

    pub fn apply_pending(&self) {
        let staged = self.pending.swap(UNSET, Ordering::AcqRel);
        if staged != UNSET {
            self.active.store(staged, Ordering::Release);
        }
    }

    pub fn threshold(&self) -> Option<i32> {
        match self.active.load(Ordering::Acquire) {
            UNSET => None,
            t => Some(t),
        }
    }
}

/// Read half of the length-prefixed (and, once negotiated, zlib-compressed)
/// frame layer. Yields whole frames: packet id plus body, outer framing
/// stripped.
pub struct FrameReader {
    stream: OwnedReadHalf,
    buf: BytesMut,
    compression: Arc<Compression>,
}

impl FrameReader {
    pub fn new(stream: OwnedReadHalf, compression: Arc<Compression>) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(4096),
            compression,
        }
    }

    /// Next frame, or `None` on clean end of stream.
    pub async fn read_frame(&mut self) -> anyhow::Result<Option<WireCursor>> {
        loop {
            if let Some(frame) = self.try_parse()? {
                return Ok(Some(frame));
            }
            let mut tmp = [0u8; 4096];
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                bail!("connection closed mid-frame ({} bytes pending)", self.buf.len());
            }
            self.buf.extend_from_slice(&tmp[..n]);
        }
    }

    fn try_parse(&mut self) -> anyhow::Result<Option<WireCursor>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let mut peek = WireCursor::from_slice(&self.buf);
        let length = match read_var_int(&mut peek) {
            Ok(len) => len as usize,
            Err(CodecError::BufferUnderflow { .. }) => return Ok(None),
            Err(e) => bail!("bad frame length prefix: {e}"),
        };
        let header = peek.read_pos();
        if peek.remaining() < length {
            return Ok(None);
        }

        self.buf.advance(header);
        let mut payload = self.buf.split_to(length);

        if self.compression.threshold().is_some() {
            let mut cur = WireCursor::from_slice(&payload);
            let data_length = read_var_int(&mut cur)? as usize;
            payload.advance(cur.read_pos());
            if data_length > 0 {
                let mut decompressed = vec![0u8; data_length];
                let mut decoder = ZlibDecoder::new(&payload[..]);
                decoder.read_exact(&mut decompressed)?;
                payload = BytesMut::from(&decompressed[..]);
            }
        }

        Ok(Some(WireCursor::from_bytes(payload)))
    }
}

/// Write half of the frame layer.
pub struct FrameWriter {
    stream: OwnedWriteHalf,
    compression: Arc<Compression>,
}

impl FrameWriter {
    pub fn new(stream: OwnedWriteHalf, compression: Arc<Compression>) -> Self {
        Self { stream, compression }
    }

    pub async fn write_frame(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        let frame = build_frame(payload, self.compression.threshold())?;
        self.stream.write_all(frame.as_slice()).await?;
        Ok(())
    }
}

fn build_frame(payload: &[u8], threshold: Option<i32>) -> anyhow::Result<WireCursor> {
    let mut frame = WireCursor::with_capacity(payload.len() + 10);

    if let Some(threshold) = threshold {
        let uncompressed_len = payload.len() as i32;
        if uncompressed_len >= threshold {
            let mut encoder = ZlibEncoder::new(Vec::new(), ZlibLevel::default());
            encoder.write_all(payload)?;
            let compressed = encoder.finish()?;

            let total = var_int_len(uncompressed_len) + compressed.len();
            write_var_int(&mut frame, total as i32);
            write_var_int(&mut frame, uncompressed_len);
            frame.put_slice(&compressed);
        } else {
            write_var_int(&mut frame, (payload.len() + 1) as i32);
            write_var_int(&mut frame, 0);
            frame.put_slice(payload);
        }
    } else {
        write_var_int(&mut frame, payload.len() as i32);
        frame.put_slice(payload);
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_back(frame: &WireCursor, threshold: Option<i32>) -> Vec<u8> {
        let mut cur = WireCursor::from_slice(frame.as_slice());
        let length = read_var_int(&mut cur).unwrap() as usize;
        assert_eq!(cur.remaining(), length);
        if threshold.is_some() {
            let data_length = read_var_int(&mut cur).unwrap() as usize;
            if data_length > 0 {
                let mut decompressed = vec![0u8; data_length];
                let mut decoder = ZlibDecoder::new(cur.unread());
                decoder.read_exact(&mut decompressed).unwrap();
                return decompressed;
            }
        }
        cur.unread().to_vec()
    }

    #[test]
    fn test_uncompressed_frame_roundtrip() {
        let payload = vec![0x10, 1, 2, 3];
        let frame = build_frame(&payload, None).unwrap();
        assert_eq!(parse_back(&frame, None), payload);
    }

    #[test]
    fn test_below_threshold_frame_has_zero_marker() {
        let payload = vec![0x10, 1, 2, 3];
        let frame = build_frame(&payload, Some(256)).unwrap();
        // Length prefix, then data-length 0, then the raw payload.
        assert_eq!(frame.as_slice()[1], 0);
        assert_eq!(parse_back(&frame, Some(256)), payload);
    }

    #[test]
    fn test_compressed_frame_roundtrip() {
        let payload = vec![7u8; 2048];
        let frame = build_frame(&payload, Some(256)).unwrap();
        assert!(frame.len() < payload.len());
        assert_eq!(parse_back(&frame, Some(256)), payload);
    }

    #[test]
    fn test_compression_staging() {
        let compression = Compression::new();
        assert_eq!(compression.threshold(), None);
        compression.stage(256);
        assert_eq!(compression.threshold(), None);
        compression.apply_pending();
        assert_eq!(compression.threshold(), Some(256));
        // A second apply with nothing staged changes nothing.
        compression.apply_pending();
        assert_eq!(compression.threshold(), Some(256));
    }
}

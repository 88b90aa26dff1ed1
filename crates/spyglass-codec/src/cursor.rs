use bytes::{BufMut, BytesMut};

use crate::{CodecError, CodecResult};

/// A resizable byte sequence with independent read and write offsets.
///
/// Reads advance a reader index without consuming the underlying bytes, so a
/// frame can be inspected and still forwarded byte-identical. Writes append.
/// A cursor is owned by exactly one in-flight decode or encode operation.
#[derive(Debug, Clone, Default)]
pub struct WireCursor {
    buf: BytesMut,
    read: usize,
}

impl WireCursor {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            read: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            read: 0,
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
            read: 0,
        }
    }

    pub fn from_bytes(buf: BytesMut) -> Self {
        Self { buf, read: 0 }
    }

    /// Total written length, independent of the reader index.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.read
    }

    pub fn read_pos(&self) -> usize {
        self.read
    }

    /// Reposition the reader index. `pos` must not exceed the written length.
    pub fn set_read_pos(&mut self, pos: usize) {
        assert!(pos <= self.buf.len(), "read position beyond written length");
        self.read = pos;
    }

    pub fn rewind(&mut self) {
        self.read = 0;
    }

    /// All written bytes, from offset zero.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// The not-yet-read tail.
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.read..]
    }

    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    fn check(&self, needed: usize) -> CodecResult<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::BufferUnderflow { needed, remaining });
        }
        Ok(())
    }

    pub fn advance(&mut self, n: usize) -> CodecResult<()> {
        self.check(n)?;
        self.read += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.check(1)?;
        let byte = self.buf[self.read];
        self.read += 1;
        Ok(byte)
    }

    pub fn read_slice(&mut self, n: usize) -> CodecResult<&[u8]> {
        self.check(n)?;
        let start = self.read;
        self.read += n;
        Ok(&self.buf[start..start + n])
    }

    pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.read..self.read + N]);
        self.read += N;
        Ok(out)
    }

    pub fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }
}

impl From<&[u8]> for WireCursor {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_does_not_consume() {
        let mut cur = WireCursor::from_slice(&[1, 2, 3]);
        assert_eq!(cur.read_u8().unwrap(), 1);
        assert_eq!(cur.remaining(), 2);
        assert_eq!(cur.as_slice(), &[1, 2, 3]);
        assert_eq!(cur.unread(), &[2, 3]);
    }

    #[test]
    fn test_write_while_reading() {
        let mut cur = WireCursor::from_slice(&[10, 20]);
        cur.read_u8().unwrap();
        cur.put_u8(30);
        assert_eq!(cur.as_slice(), &[10, 20, 30]);
        assert_eq!(cur.unread(), &[20, 30]);
    }

    #[test]
    fn test_underflow() {
        let mut cur = WireCursor::from_slice(&[1]);
        cur.read_u8().unwrap();
        assert!(matches!(
            cur.read_u8(),
            Err(CodecError::BufferUnderflow {
                needed: 1,
                remaining: 0
            })
        ));
        assert!(matches!(
            cur.read_slice(4),
            Err(CodecError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn test_rewind() {
        let mut cur = WireCursor::from_slice(&[7, 8]);
        cur.advance(2).unwrap();
        assert_eq!(cur.remaining(), 0);
        cur.rewind();
        assert_eq!(cur.read_u8().unwrap(), 7);
    }
}

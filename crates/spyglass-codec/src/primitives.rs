use uuid::Uuid;

use crate::{CodecError, CodecResult, WireCursor};

/// Read a VarInt: 7 payload bits per byte, high bit set means more follow.
/// At most 5 bytes; a 5th byte that still carries the continuation bit is
/// malformed.
pub fn read_var_int(cur: &mut WireCursor) -> CodecResult<i32> {
    let mut result: i32 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = cur.read_u8()?;
        result |= ((byte & 0x7F) as i32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 32 {
            return Err(CodecError::MalformedVarInt);
        }
    }
}

/// Write a VarInt. Encoding is canonical: always the minimal byte count.
pub fn write_var_int(cur: &mut WireCursor, mut value: i32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        cur.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Byte length of a VarInt without encoding it.
pub fn var_int_len(value: i32) -> usize {
    let mut val = value as u32;
    let mut len = 0;
    loop {
        len += 1;
        val >>= 7;
        if val == 0 {
            break;
        }
    }
    len
}

/// Read a VarLong (up to 10 bytes).
pub fn read_var_long(cur: &mut WireCursor) -> CodecResult<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = cur.read_u8()?;
        result |= ((byte & 0x7F) as i64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::MalformedVarInt);
        }
    }
}

pub fn write_var_long(cur: &mut WireCursor, mut value: i64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u64) >> 7) as i64;
        if value != 0 {
            byte |= 0x80;
        }
        cur.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Read a VarInt-length-prefixed UTF-8 string.
///
/// The declared byte length may not exceed `max_chars * 4` (worst-case UTF-8
/// expansion) and the decoded character count may not exceed `max_chars`.
pub fn read_string(cur: &mut WireCursor, max_chars: usize) -> CodecResult<String> {
    let declared = read_var_int(cur)?;
    if declared < 0 {
        return Err(CodecError::NegativeLength(declared));
    }
    let length = declared as usize;
    if length > max_chars * 4 {
        return Err(CodecError::StringTooLong {
            length,
            max: max_chars,
        });
    }
    let bytes = cur.read_slice(length)?;
    let s = String::from_utf8_lossy(bytes).into_owned();
    if s.chars().count() > max_chars {
        return Err(CodecError::StringTooLong {
            length: s.chars().count(),
            max: max_chars,
        });
    }
    Ok(s)
}

/// Write a VarInt-length-prefixed UTF-8 string. Fails when the encoded byte
/// length exceeds `max_chars`.
pub fn write_string(cur: &mut WireCursor, s: &str, max_chars: usize) -> CodecResult<()> {
    if s.len() > max_chars {
        return Err(CodecError::StringTooLong {
            length: s.len(),
            max: max_chars,
        });
    }
    write_var_int(cur, s.len() as i32);
    cur.put_slice(s.as_bytes());
    Ok(())
}

pub fn read_bool(cur: &mut WireCursor) -> CodecResult<bool> {
    Ok(cur.read_u8()? != 0)
}

pub fn write_bool(cur: &mut WireCursor, value: bool) {
    cur.put_u8(value as u8);
}

pub fn read_i8(cur: &mut WireCursor) -> CodecResult<i8> {
    Ok(cur.read_u8()? as i8)
}

pub fn write_i8(cur: &mut WireCursor, value: i8) {
    cur.put_u8(value as u8);
}

pub fn read_u16(cur: &mut WireCursor) -> CodecResult<u16> {
    Ok(u16::from_be_bytes(cur.read_array()?))
}

pub fn write_u16(cur: &mut WireCursor, value: u16) {
    cur.put_slice(&value.to_be_bytes());
}

pub fn read_i16(cur: &mut WireCursor) -> CodecResult<i16> {
    Ok(i16::from_be_bytes(cur.read_array()?))
}

pub fn write_i16(cur: &mut WireCursor, value: i16) {
    cur.put_slice(&value.to_be_bytes());
}

pub fn read_i32(cur: &mut WireCursor) -> CodecResult<i32> {
    Ok(i32::from_be_bytes(cur.read_array()?))
}

pub fn write_i32(cur: &mut WireCursor, value: i32) {
    cur.put_slice(&value.to_be_bytes());
}

pub fn read_i64(cur: &mut WireCursor) -> CodecResult<i64> {
    Ok(i64::from_be_bytes(cur.read_array()?))
}

pub fn write_i64(cur: &mut WireCursor, value: i64) {
    cur.put_slice(&value.to_be_bytes());
}

pub fn read_f32(cur: &mut WireCursor) -> CodecResult<f32> {
    Ok(f32::from_be_bytes(cur.read_array()?))
}

pub fn write_f32(cur: &mut WireCursor, value: f32) {
    cur.put_slice(&value.to_be_bytes());
}

pub fn read_f64(cur: &mut WireCursor) -> CodecResult<f64> {
    Ok(f64::from_be_bytes(cur.read_array()?))
}

pub fn write_f64(cur: &mut WireCursor, value: f64) {
    cur.put_slice(&value.to_be_bytes());
}

/// Read exactly `len` raw bytes. No implicit length framing.
pub fn read_bytes(cur: &mut WireCursor, len: usize) -> CodecResult<Vec<u8>> {
    Ok(cur.read_slice(len)?.to_vec())
}

pub fn write_bytes(cur: &mut WireCursor, data: &[u8]) {
    cur.put_slice(data);
}

/// Read a 128-bit unique id: two big-endian 64-bit halves, high then low.
pub fn read_uuid(cur: &mut WireCursor) -> CodecResult<Uuid> {
    let high = read_i64(cur)?;
    let low = read_i64(cur)?;
    Ok(Uuid::from_u64_pair(high as u64, low as u64))
}

pub fn write_uuid(cur: &mut WireCursor, uuid: &Uuid) {
    let (high, low) = uuid.as_u64_pair();
    write_i64(cur, high as i64);
    write_i64(cur, low as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_int_roundtrip() {
        let test_cases = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (i32::MAX, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (i32::MIN, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut cur = WireCursor::new();
            write_var_int(&mut cur, value);
            assert_eq!(cur.as_slice(), &expected_bytes[..], "write_var_int({value})");
            assert_eq!(var_int_len(value), expected_bytes.len());

            let mut cur = WireCursor::from_slice(&expected_bytes);
            assert_eq!(read_var_int(&mut cur).unwrap(), value, "read_var_int({value})");
            assert_eq!(cur.remaining(), 0);
        }
    }

    #[test]
    fn test_var_int_rejects_sixth_continuation_byte() {
        let mut cur = WireCursor::from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert!(matches!(
            read_var_int(&mut cur),
            Err(CodecError::MalformedVarInt)
        ));
    }

    #[test]
    fn test_var_int_underflow() {
        let mut cur = WireCursor::from_slice(&[0x80]);
        assert!(matches!(
            read_var_int(&mut cur),
            Err(CodecError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn test_var_long_roundtrip() {
        for value in [0i64, 1, -1, i64::MAX, i64::MIN, 1 << 40] {
            let mut cur = WireCursor::new();
            write_var_long(&mut cur, value);
            let mut cur = WireCursor::from_bytes(cur.into_bytes());
            assert_eq!(read_var_long(&mut cur).unwrap(), value);
        }
    }

    #[test]
    fn test_string_roundtrip() {
        let test_str = "Hello, spyglass! \u{1F50D}";
        let mut cur = WireCursor::new();
        write_string(&mut cur, test_str, 32767).unwrap();
        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert_eq!(read_string(&mut cur, 32767).unwrap(), test_str);
    }

    #[test]
    fn test_string_declared_length_too_long() {
        let max_chars = 16usize;
        let mut cur = WireCursor::new();
        write_var_int(&mut cur, (max_chars * 4 + 1) as i32);
        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert!(matches!(
            read_string(&mut cur, max_chars),
            Err(CodecError::StringTooLong { .. })
        ));
    }

    #[test]
    fn test_string_negative_length() {
        let mut cur = WireCursor::new();
        write_var_int(&mut cur, -1);
        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert!(matches!(
            read_string(&mut cur, 16),
            Err(CodecError::NegativeLength(-1))
        ));
    }

    #[test]
    fn test_string_encode_too_long() {
        let mut cur = WireCursor::new();
        assert!(matches!(
            write_string(&mut cur, "abcdef", 5),
            Err(CodecError::StringTooLong { length: 6, max: 5 })
        ));
    }

    #[test]
    fn test_fixed_width_roundtrip() {
        let mut cur = WireCursor::new();
        write_i8(&mut cur, -5);
        write_u16(&mut cur, 25565);
        write_i16(&mut cur, -1234);
        write_i32(&mut cur, -123456789);
        write_i64(&mut cur, i64::MIN + 1);
        write_f32(&mut cur, 1.5);
        write_f64(&mut cur, -2.25);
        write_bool(&mut cur, true);
        write_bool(&mut cur, false);

        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert_eq!(read_i8(&mut cur).unwrap(), -5);
        assert_eq!(read_u16(&mut cur).unwrap(), 25565);
        assert_eq!(read_i16(&mut cur).unwrap(), -1234);
        assert_eq!(read_i32(&mut cur).unwrap(), -123456789);
        assert_eq!(read_i64(&mut cur).unwrap(), i64::MIN + 1);
        assert_eq!(read_f32(&mut cur).unwrap(), 1.5);
        assert_eq!(read_f64(&mut cur).unwrap(), -2.25);
        assert!(read_bool(&mut cur).unwrap());
        assert!(!read_bool(&mut cur).unwrap());
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_uuid_big_endian_halves() {
        let uuid = Uuid::from_u64_pair(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210);
        let mut cur = WireCursor::new();
        write_uuid(&mut cur, &uuid);
        assert_eq!(
            cur.as_slice(),
            &[
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76,
                0x54, 0x32, 0x10
            ]
        );
        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert_eq!(read_uuid(&mut cur).unwrap(), uuid);
    }

    #[test]
    fn test_raw_bytes_no_framing() {
        let mut cur = WireCursor::new();
        write_bytes(&mut cur, &[9, 8, 7]);
        assert_eq!(cur.len(), 3);
        let mut cur = WireCursor::from_bytes(cur.into_bytes());
        assert_eq!(read_bytes(&mut cur, 3).unwrap(), vec![9, 8, 7]);
        assert!(matches!(
            read_bytes(&mut cur, 1),
            Err(CodecError::BufferUnderflow { .. })
        ));
    }
}

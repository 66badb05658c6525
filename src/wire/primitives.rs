//! Bounds-checked readers and the matching writers for the scalar encodings
//! used inside payloads.
//!
//! Readers take the payload and a cursor into it. On success the cursor is
//! advanced past the value; on failure it is left where it was and the
//! caller is expected to discard the partially decoded object.

use crate::error::{Result, WireError};

/// Reads exactly `N` bytes.
pub fn read_array<const N: usize>(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<[u8; N]> {
    let end = c.checked_add(N).ok_or_else(|| WireError::eof(ctx))?;
    let bytes = p.get(*c..end).ok_or_else(|| WireError::eof(ctx))?;

    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    *c = end;
    Ok(out)
}

pub fn read_u16_be(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<u16> {
    Ok(u16::from_be_bytes(read_array(p, c, ctx)?))
}

pub fn read_u32(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(p, c, ctx)?))
}

pub fn read_u64(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array(p, c, ctx)?))
}

pub fn read_i64(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<i64> {
    Ok(i64::from_le_bytes(read_array(p, c, ctx)?))
}

/// Reads a CompactSize count.
///
/// ```text
/// < 0xFD  value itself
/// 0xFD    u16 LE follows
/// 0xFE    u32 LE follows
/// 0xFF    u64 LE follows
/// ```
pub fn read_varint(p: &[u8], c: &mut usize, ctx: &'static str) -> Result<u64> {
    let mut cursor = *c;
    let [first] = read_array::<1>(p, &mut cursor, ctx)?;

    let value = match first {
        0xFD => u16::from_le_bytes(read_array(p, &mut cursor, ctx)?) as u64,
        0xFE => u32::from_le_bytes(read_array(p, &mut cursor, ctx)?) as u64,
        0xFF => u64::from_le_bytes(read_array(p, &mut cursor, ctx)?),
        n => n as u64,
    };

    *c = cursor;
    Ok(value)
}

/// Reads a length-prefixed byte string, keeping at most `max` bytes.
///
/// Bytes past `max` are skipped but must still be present in the buffer.
/// The content is returned as-is: peers put arbitrary bytes in free-form
/// strings, and they have to survive a decode/encode pass untouched.
pub fn read_bounded_bytes(p: &[u8], c: &mut usize, max: usize, ctx: &'static str) -> Result<Vec<u8>> {
    let mut cursor = *c;
    let len = read_varint(p, &mut cursor, ctx)?;
    let len = usize::try_from(len).map_err(|_| WireError::malformed(ctx, "length overflows usize"))?;

    let end = cursor.checked_add(len).ok_or_else(|| WireError::eof(ctx))?;
    let bytes = p.get(cursor..end).ok_or_else(|| WireError::eof(ctx))?;
    let kept = &bytes[..len.min(max)];

    *c = end;
    Ok(kept.to_vec())
}

pub fn write_varint(value: u64, out: &mut Vec<u8>) {
    match value {
        0..=0xFC => out.push(value as u8),
        0xFD..=0xFFFF => {
            out.push(0xFD);
            out.extend(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            out.push(0xFE);
            out.extend(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xFF);
            out.extend(&value.to_le_bytes());
        }
    }
}

/// Writes at most `max` bytes behind a CompactSize length, mirroring what
/// the reader keeps.
pub fn write_bounded_bytes(bytes: &[u8], max: usize, out: &mut Vec<u8>) {
    let bytes = &bytes[..bytes.len().min(max)];

    write_varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

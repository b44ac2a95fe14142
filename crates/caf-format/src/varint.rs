//! Base-128 variable-length integer codec used by the packet table.
//!
//! Values are split into 7-bit groups and emitted most-significant
//! group first; every byte except the last has its high bit set as a
//! continuation flag. Zero encodes as a single `0x00` byte.
//!
//! The decoder stops after at most [`MAX_VARINT_BYTES`] bytes even if
//! the continuation bit is still set. That cap does not follow from
//! the encoding itself, but existing readers of the format apply it,
//! so it is kept for round-trip compatibility with files in the wild.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use crate::error::{CafError, Result};

/// Maximum number of bytes consumed when decoding a single varint.
pub const MAX_VARINT_BYTES: usize = 8;

/// Encode `value` as a base-128 varint.
pub fn write_varint<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    // 7 bits per byte: a u64 needs at most 10 groups.
    let mut groups = [0u8; 10];
    let mut len = 0;
    let mut cur = value;
    loop {
        groups[len] = (cur & 0x7F) as u8;
        len += 1;
        cur >>= 7;
        if cur == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let mut byte = groups[i];
        if i > 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
    }
    Ok(())
}

/// Decode a base-128 varint from the stream.
///
/// Stops when a byte with a clear continuation bit is read, or after
/// [`MAX_VARINT_BYTES`] bytes. Hitting the cap is a successful
/// (capped) decode, not an error; any further bytes are left in the
/// stream. Fails with [`CafError::Truncated`] if the stream ends
/// before a terminating byte or the cap is reached.
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    for _ in 0..MAX_VARINT_BYTES {
        let byte = reader
            .read_u8()
            .map_err(|e| CafError::from_io(e, "packet size varint"))?;
        result = (result << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(result)
}

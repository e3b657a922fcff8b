//! Compact integer encoding and decoding.
//!
//! Packages store most indices as a signed integer occupying 1 to 5 bytes:
//!
//! | Byte | Bits                                                                 |
//! |------|----------------------------------------------------------------------|
//! | 0    | `7`: sign, `6`: continue, `0..=5`: magnitude bits 0-5                |
//! | 1..3 | `7`: continue, `0..=6`: next 7 magnitude bits (offsets 6, 13, 20)    |
//! | 4    | `0..=4`: magnitude bits 27-31, always the last byte                  |

use std::io::{self, Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};
use byteorder::ReadBytesExt;

/// Longest possible encoding in bytes
pub const MAX_LEN: usize = 5;

/// Decodes a compact integer, returning the value and the number of bytes consumed.
///
/// Bytes are consumed strictly in order, the reader is never peeked.
pub fn decode<R: Read>(reader: &mut R) -> io::Result<(i32, usize)> {
    let first = reader.read_u8()?;
    let negative = first & 0x80 != 0;
    let mut magnitude = u32::from(first & 0x3F);
    let mut consumed = 1;

    if first & 0x40 != 0 {
        for shift in [6, 13, 20] {
            let byte = reader.read_u8()?;
            consumed += 1;
            magnitude |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok((apply_sign(magnitude, negative), consumed));
            }
        }

        let last = reader.read_u8()?;
        consumed += 1;
        magnitude |= u32::from(last & 0x1F) << 27;
    }

    Ok((apply_sign(magnitude, negative), consumed))
}

fn apply_sign(magnitude: u32, negative: bool) -> i32 {
    // Magnitudes above i32::MAX wrap
    let value = magnitude as i32;
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Encodes `value` using the shortest form.
///
/// The magnitude has 32 bits available, so every `i32` including `i32::MIN` is representable.
pub fn encode(value: i32) -> Vec<u8> {
    let mut magnitude = value.unsigned_abs();
    let mut out = Vec::with_capacity(MAX_LEN);

    let mut first = (magnitude & 0x3F) as u8;
    if value < 0 {
        first |= 0x80;
    }
    magnitude >>= 6;
    if magnitude == 0 {
        out.push(first);
        return out;
    }
    out.push(first | 0x40);

    for _ in 0..3 {
        let byte = (magnitude & 0x7F) as u8;
        magnitude >>= 7;
        if magnitude == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }

    out.push((magnitude & 0x1F) as u8);
    out
}

/// A compact integer as a [`binrw`] field type
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CompactIndex(pub i32);

impl From<CompactIndex> for i32 {
    fn from(value: CompactIndex) -> Self {
        value.0
    }
}

impl From<i32> for CompactIndex {
    fn from(value: i32) -> Self {
        CompactIndex(value)
    }
}

impl BinRead for CompactIndex {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let (value, _) = decode(reader)?;
        Ok(CompactIndex(value))
    }
}

impl BinWrite for CompactIndex {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&encode(self.0))?;
        Ok(())
    }
}

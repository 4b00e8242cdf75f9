//! Information and structures for `Yaz0` streams.
//!
//! A `Yaz0` stream is a sixteen byte header followed by groups of tokens.
//!
//! ## Header
//! The key data can be extracted into a [`Yaz0Header`] by using [`yaz0_info()`].
//!
//! | Byte Num | Description |
//! | :------: | ----------- |
//! | 0..4     | magic bytes ("Yaz0") |
//! | 4..8     | size in big endian bytes of decompressed data |
//! | 8..12    | big endian data alignment hint (zero in older files) |
//! | 12..16   | reserved, always zero |
//!
//! ## Token Groups
//! Each group starts with a control byte. Its bits are read from the most significant
//! to the least significant, and each bit describes one token:
//! * `1` is a literal: copy the next byte of the stream to the output.
//! * `0` is a match: copy bytes that were already decompressed.
//!
//! Matches are stored in two or three bytes. The low nibble of the first byte and
//! the second byte are the twelve bit distance minus one. If the high nibble of the
//! first byte is not zero, the match length is that nibble plus two. Otherwise, a
//! third byte follows, and the length is that byte plus `0x12`.
//! ```text
//! 2 byte form: LLLL DDDD  DDDDDDDD            length = L + 2    (3..=0x11)
//! 3 byte form: 0000 DDDD  DDDDDDDD  LLLLLLLL  length = L + 0x12 (0x12..=0x111)
//! ```
//! Match bytes are copied one at a time, so a match can be longer than its distance
//! and repeat the bytes it has just written.
//!
//! ## An Example
//! The ascii string "ABCABCABCABC" is three literals followed by a match
//! with a distance of three and a length of nine.
//! ```text
//! 59617A30 <- "Yaz0"
//! 0000000C <- original size of 12 bytes
//! 00000000 <- no alignment
//! 00000000
//!
//! 1110 0000 <- control byte: three literals, then a match
//! 41 42 43  <- 'A' 'B' 'C'
//! ┌ length - 2 (7, length 9)
//! | ┌ distance - 1 (2, distance 3)
//! 7 002
//! ```
//! [`yaz0_info()`]: crate::yaz0_info

use crate::errors::Yaz0Error;
use bitstream_io::{BitReader, BitWriter, BE};
use smallvec::{smallvec, SmallVec};
use std::io::{self, Read, Write};

/// Magic bytes at the start of every stream
pub const MAGIC: &[u8; 4] = b"Yaz0";
/// Size in bytes of the stream header
pub const HEADER_SIZE: usize = 16;
/// Furthest distance a match can look back, as limited by the twelve bit distance field
pub const WINDOW_SIZE: usize = 0x1000;
/// Shortest match written by the encoder
pub const MIN_MATCH: usize = 3;
/// Longest match that fits in the two byte form
pub const MAX_SHORT_MATCH: usize = 0xF + 2;
/// Longest match that fits in the three byte form
pub const MAX_MATCH: usize = 0xFF + 0x12;

/// The information stored at the start of a `Yaz0` stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yaz0Header {
    /// size of decompressed data
    pub size: u32,
    /// data alignment hint used by newer titles
    pub alignment: u32,
}

impl Yaz0Header {
    /// Read the header from a bitstream, checking the magic before anything else
    pub(crate) fn from_bitreader<R: Read>(reader: &mut BitReader<R, BE>) -> Result<Self, Yaz0Error> {
        let mut magic = [0u8; 4];
        let mut rest = [0u8; HEADER_SIZE - 4];

        reader.read_bytes(&mut magic).map_err(header_err)?;
        if &magic != MAGIC {
            return Err(Yaz0Error::InvalidHeader(magic));
        }
        reader.read_bytes(&mut rest).map_err(header_err)?;

        let size = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
        let alignment = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]);

        Ok(Self { size, alignment })
    }
    /// Write out `self` to the big endian `BitWriter` to match the Yaz0 format
    pub(crate) fn write<W: Write>(&self, wtr: &mut BitWriter<W, BE>) -> Result<(), Yaz0Error> {
        wtr.write_bytes(MAGIC)?; // 0..4
        wtr.write(32, self.size)?; // 4..8
        wtr.write(32, self.alignment)?; // 8..12
        wtr.write(32, 0u32)?; // 12..16

        Ok(())
    }
}

fn header_err(e: io::Error) -> Yaz0Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Yaz0Error::TruncatedHeader,
        _ => e.into(),
    }
}

/// One unit of a `Yaz0` stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A single uncompressed byte
    Literal(u8),
    /// Copy `length` bytes starting `distance` bytes back from the end of the output.
    /// `distance` is in `1..=WINDOW_SIZE`.
    Match { distance: usize, length: usize },
}

impl Token {
    /// total number of decompressed bytes this token produces
    pub fn size(&self) -> usize {
        match self {
            Self::Literal(..) => 1,
            Self::Match { length, .. } => *length,
        }
    }

    /// Read one token body; the kind comes from the group's control byte
    pub(crate) fn read<R: Read>(rdr: &mut BitReader<R, BE>, literal: bool) -> io::Result<Self> {
        if literal {
            return Ok(Self::Literal(rdr.read(8)?));
        }

        let b1: u8 = rdr.read(8)?;
        let b2: u8 = rdr.read(8)?;
        let distance = ((((b1 & 0xF) as usize) << 8) | b2 as usize) + 1;
        let length = match b1 >> 4 {
            0 => rdr.read::<u8>(8)? as usize + 0x12,
            nibble => nibble as usize + 2,
        };

        Ok(Self::Match { distance, length })
    }

    /// Serialize the token body. Matches must already be clamped to `MIN_MATCH..=MAX_MATCH`.
    pub(crate) fn encode(&self) -> SmallVec<[u8; 3]> {
        match *self {
            Self::Literal(byte) => smallvec![byte],
            Self::Match { distance, length } => {
                debug_assert!((1..=WINDOW_SIZE).contains(&distance));
                debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&length));

                let dist = distance - 1;
                let hi = (dist >> 8) as u8;
                let lo = (dist & 0xFF) as u8;

                if length > MAX_SHORT_MATCH {
                    smallvec![hi, lo, (length - 0x12) as u8]
                } else {
                    smallvec![(((length - 2) as u8) << 4) | hi, lo]
                }
            }
        }
    }
}

/// Decoder side cursor over the bits of the current control byte
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ControlByte {
    bits: u8,
    valid: u8,
}

impl ControlByte {
    /// Is the next token a literal? Reads a new control byte once the last is used up.
    pub(crate) fn next_is_literal<R: Read>(&mut self, rdr: &mut BitReader<R, BE>) -> io::Result<bool> {
        if self.valid == 0 {
            self.bits = rdr.read(8)?;
            self.valid = 8;
        }

        let literal = self.bits & 0x80 != 0;
        self.bits <<= 1;
        self.valid -= 1;

        Ok(literal)
    }
}

use crate::{errors::Yaz0Error, format::Token};
use bitstream_io::{BigEndian, BitWriter};
use smallvec::SmallVec;
use std::io::Write;

const GROUP_TOKENS: u8 = 8;
// eight matches in the three byte form
const MAX_GROUP_PAYLOAD: usize = 8 * 3;

/// Collects up to eight tokens, then writes their control byte followed by the token bodies
pub(super) struct GroupPacker<W: Write> {
    out: BitWriter<W, BigEndian>,
    control: u8,
    count: u8,
    payload: SmallVec<[u8; MAX_GROUP_PAYLOAD]>,
    /// bytes written to `out` so far
    written: usize,
}

impl<W: Write> GroupPacker<W> {
    pub(super) fn new(out: BitWriter<W, BigEndian>) -> Self {
        Self {
            out,
            control: 0,
            count: 0,
            payload: SmallVec::new(),
            written: 0,
        }
    }

    pub(super) fn push(&mut self, token: Token) -> Result<(), Yaz0Error> {
        if let Token::Literal(..) = token {
            self.control |= 0x80 >> self.count;
        }
        self.payload.extend_from_slice(&token.encode());
        self.count += 1;

        if self.count == GROUP_TOKENS {
            self.flush()?;
        }

        Ok(())
    }

    /// Write out any partial group and return the number of bytes written for all groups
    pub(super) fn finish(mut self) -> Result<usize, Yaz0Error> {
        self.flush()?;
        Ok(self.written)
    }

    fn flush(&mut self) -> Result<(), Yaz0Error> {
        if self.count == 0 {
            return Ok(());
        }

        self.out.write(8, self.control)?;
        self.out.write_bytes(&self.payload)?;
        self.written += 1 + self.payload.len();

        self.control = 0;
        self.count = 0;
        self.payload.clear();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(tokens: &[Token]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut packer = GroupPacker::new(BitWriter::endian(&mut buf, BigEndian));
        for &token in tokens {
            packer.push(token).unwrap();
        }
        let written = packer.finish().unwrap();
        assert_eq!(written, buf.len());

        buf
    }

    #[test]
    fn partial_group() {
        let tokens = [
            Token::Literal(b'A'),
            Token::Match {
                distance: 1,
                length: 7,
            },
        ];
        assert_eq!(pack(&tokens), [0x80, 0x41, 0x50, 0x00]);
    }

    #[test]
    fn flushes_every_eight_tokens() {
        let tokens: Vec<Token> = (0..9).map(Token::Literal).collect();
        assert_eq!(pack(&tokens), [0xFF, 0, 1, 2, 3, 4, 5, 6, 7, 0x80, 8]);
    }

    #[test]
    fn match_forms() {
        let tokens = [
            Token::Match {
                distance: 0x1000,
                length: 0x111,
            },
            Token::Literal(b'z'),
            Token::Match {
                distance: 0x123,
                length: 0x11,
            },
            Token::Match {
                distance: 2,
                length: 0x12,
            },
        ];
        assert_eq!(
            pack(&tokens),
            [0x40, 0x0F, 0xFF, 0xFF, b'z', 0xF1, 0x22, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn nothing_to_pack() {
        assert!(pack(&[]).is_empty());
    }
}

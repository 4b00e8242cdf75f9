use crate::{
    errors::Yaz0Error,
    format::{Token, Yaz0Header, HEADER_SIZE, MAX_MATCH, MIN_MATCH},
};
use bitstream_io::{BigEndian, BitWriter};
use std::{
    convert::TryFrom,
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Write},
    path::Path,
};

mod lzss;
mod packer;

use self::{lzss::MatchSelector, packer::GroupPacker};

type LogWtr<'a> = &'a mut dyn Write;

/// Specify the encoding settings, such as header alignment, logging, input, and output
///
/// To create a new `EncoderBuilder`, use [`for_reader()`], [`for_file()`], or [`for_bytes()`].
/// Then, change any of the encoding settings with `EncoderBuilder`'s helper methods.
/// Finally, encode the input data with [`encode_to_writer()`], [`encode_to_file()`], or [`encode_to_vec()`].
/// ```
/// # use yaz0::EncoderBuilder;
/// let input = b"ABBACABBCADFEGABA";
/// let compressed = EncoderBuilder::for_bytes(input)
///     .alignment(0x80)
///     .with_logging(&mut ::std::io::stdout())
///     .encode_to_vec();
/// ```
///
/// The match search is the same brute force search with one step of lookahead
/// that Nintendo's encoder uses, so the output should match files from retail games.
/// The default settings are:
/// * Alignment of `0`
/// * No logging
///
/// [`for_reader()`]: EncoderBuilder::for_reader
/// [`for_file()`]: EncoderBuilder::for_file
/// [`for_bytes()`]: EncoderBuilder::for_bytes
/// [`encode_to_writer()`]: EncoderBuilder::encode_to_writer
/// [`encode_to_file()`]: EncoderBuilder::encode_to_file
/// [`encode_to_vec()`]: EncoderBuilder::encode_to_vec
pub struct EncoderBuilder<'a, R> {
    rdr: R,
    alignment: u32,
    log: Option<LogWtr<'a>>,
}

impl<'a, R: Read> EncoderBuilder<'a, R> {
    /// Create a new `EncoderBuilder` for the data in `rdr`.
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            rdr,
            alignment: 0,
            log: None,
        }
    }

    /// Set the data alignment hint stored in the header.
    /// Older games expect zero here; it does not change the compressed data.
    #[inline]
    pub fn alignment(&mut self, alignment: u32) -> &mut Self {
        self.alignment = alignment;
        self
    }

    /// Write debugging and diagnotic information to `log` while the input is
    /// being encoded.
    #[inline]
    pub fn with_logging<L: Write>(&mut self, log: &'a mut L) -> &mut Self {
        let log = Some(log as &'a mut dyn Write);
        self.log = log;
        self
    }

    /// Start the encoding and write the compressed data out to `wtr`
    #[inline]
    pub fn encode_to_writer<W: Write>(&mut self, wtr: W) -> Result<(), Yaz0Error> {
        do_encode(self, wtr)
    }

    /// Start the encoding and write the compressed data out to the newly created
    /// `File` `f`
    #[inline]
    pub fn encode_to_file<P: AsRef<Path>>(&mut self, f: P) -> Result<(), Yaz0Error> {
        let mut wtr = BufWriter::new(File::create(f)?);
        self.encode_to_writer(&mut wtr)?;
        wtr.flush().map_err(Into::into)
    }

    /// Start the encoding and return the compressed data in a `Vec<u8>`.
    #[inline]
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>, Yaz0Error> {
        let data = Vec::new();
        let mut csr = Cursor::new(data);
        self.encode_to_writer(&mut csr).map(|_| csr.into_inner())
    }
}

impl<'a> EncoderBuilder<'a, BufReader<File>> {
    /// Create a new `EncoderBuilder` for the file at `p`.
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, Yaz0Error> {
        let rdr = BufReader::new(File::open(p)?);
        Ok(Self::for_reader(rdr))
    }
}

impl<'a> EncoderBuilder<'a, Cursor<&'a [u8]>> {
    /// Create a new `EncoderBuilder` for the data the `bytes` slice.
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr)
    }
}

/// Compress data into a `Yaz0` `Vec<u8>`
///
/// This is a convenience function to encode a `Read`er without having to
/// import and set up an [`EncoderBuilder`].
pub fn encode<R: Read>(rdr: R) -> Result<Vec<u8>, Yaz0Error> {
    EncoderBuilder::for_reader(rdr).encode_to_vec()
}

fn do_encode<R: Read, W: Write>(
    opts: &mut EncoderBuilder<'_, R>,
    wtr: W,
) -> Result<(), Yaz0Error> {
    let EncoderBuilder {
        rdr,
        alignment,
        log,
    } = opts;

    let mut input = Vec::new();
    rdr.read_to_end(&mut input)?;

    let header = Yaz0Header {
        size: header_size(input.len())?,
        alignment: *alignment,
    };

    if let Some(wtr) = log.as_mut() {
        writeln!(wtr, "# Header\n{:?}", &header)?;
    }

    let mut out = BitWriter::endian(wtr, BigEndian);
    header.write(&mut out)?;

    let mut packer = GroupPacker::new(out);
    let mut selector = MatchSelector::default();
    let mut literals = 0;
    let mut matches = 0;
    let mut pos = 0;

    while pos < input.len() {
        let found = selector.select(&input, pos);

        let token = if found.length < MIN_MATCH {
            literals += 1;
            Token::Literal(input[pos])
        } else {
            matches += 1;
            // anything past the longest encodable match is searched again from the new position
            Token::Match {
                distance: pos - found.pos,
                length: found.length.min(MAX_MATCH),
            }
        };

        if let Some(wtr) = log.as_mut() {
            match token {
                Token::Literal(byte) => writeln!(wtr, "{:04x} - Literal: {:02x}", pos, byte)?,
                Token::Match { distance, length } => writeln!(
                    wtr,
                    "{:04x} - Match: length {} distance {} | start: {:04x}",
                    pos, length, distance, found.pos
                )?,
            }
            if selector.is_pending() {
                writeln!(wtr, "\tdeferring for a longer match at {:04x}", pos + 1)?;
            }
        }

        packer.push(token)?;
        pos += token.size();
    }

    let body = packer.finish()?;

    if let Some(wtr) = log.as_mut() {
        writeln!(
            wtr,
            "# Summary\n{} literals | {} matches | {} -> {} bytes",
            literals,
            matches,
            input.len(),
            HEADER_SIZE + body
        )?;
    }

    Ok(())
}

/// The decompressed size has to fit in the header's 32 bit field
fn header_size(len: usize) -> Result<u32, Yaz0Error> {
    u32::try_from(len).map_err(|_| Yaz0Error::InputTooLarge(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_limit() {
        assert_eq!(header_size(0).unwrap(), 0);
        assert_eq!(header_size(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_input() {
        let len = u32::MAX as usize + 1;
        match header_size(len) {
            Err(Yaz0Error::InputTooLarge(n)) => assert_eq!(n, len),
            other => panic!("expected InputTooLarge, got {:?}", other),
        }
    }
}

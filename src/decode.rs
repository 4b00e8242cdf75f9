use crate::errors::Yaz0Error;
use crate::format::{ControlByte, Token, Yaz0Header};
use bitstream_io::{BigEndian, BitReader};
use std::{
    fs::File,
    io::{self, BufReader, Cursor, Read, Write},
    path::Path,
};

type LogWtr<'a> = &'a mut dyn Write;

/// Cap on the output reserved before any tokens are read
const MAX_PREALLOC: usize = 1 << 20;

/// Specify the decoding settings, such as logging, input, and output.
///
/// To create a new `Decoder`, use [`for_reader()`], [`for_bytes()`], or
/// [`for_file()`]. Then, change any of the decoder settings.
/// Finally, decode the input data with [`decode()`].
/// ```
/// # use yaz0::{EncoderBuilder, Decoder};
/// let original = b"ABBACABBACD";
/// let compressed = EncoderBuilder::for_bytes(original)
///     .encode_to_vec()
///     .unwrap();
/// let decompressed = Decoder::for_bytes(&compressed)
///     .decode()
///     .unwrap();
/// assert_eq!(&original[..], decompressed);
/// ```
/// You can use a `Decoder` to get the [`Yaz0Header`] with [`header()`],
/// or the raw [`Token`]s with [`tokens()`]:
/// ```
/// # use yaz0::{EncoderBuilder, Decoder};
/// # let original = b"ABBACABBACD";
/// # let compressed = EncoderBuilder::for_bytes(original).encode_to_vec().unwrap();
/// let mut decoder = Decoder::for_bytes(&compressed);
/// let size = decoder.header().unwrap().size as usize;
/// assert_eq!(size, original.len());
///
/// let tokens = decoder.tokens().unwrap();
/// assert_eq!(tokens.iter().map(|t| t.size()).sum::<usize>(), size);
/// ```
/// [`for_reader()`]: Decoder::for_reader
/// [`for_bytes()`]: Decoder::for_bytes
/// [`for_file()`]: Decoder::for_file
/// [`decode()`]: Decoder::decode
/// [`header()`]: Decoder::header
/// [`tokens()`]: Decoder::tokens
pub struct Decoder<'a, R: Read> {
    src: BitReader<R, BigEndian>,
    log: Option<LogWtr<'a>>,
    header: Option<Yaz0Header>,
}

impl<'a, R: Read> Decoder<'a, R> {
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            src: BitReader::endian(rdr, BigEndian),
            log: None,
            header: None,
        }
    }

    /// Write each decoded token to `wtr` while decoding
    #[inline]
    pub fn with_logging<W: Write>(&mut self, wtr: &'a mut W) -> &mut Self {
        self.log = Some(wtr as LogWtr);
        self
    }

    #[inline]
    pub fn header(&mut self) -> Result<Yaz0Header, Yaz0Error> {
        self.get_header()
    }

    /// Parse the token stream without building the decompressed output.
    ///
    /// Like [`decode()`](Decoder::decode), this consumes the data from the reader.
    pub fn tokens(&mut self) -> Result<Vec<Token>, Yaz0Error> {
        let header = self.get_header()?;
        let expected = header.size as usize;
        let mut control = ControlByte::default();
        let mut tokens = Vec::new();
        let mut produced = 0;

        while produced < expected {
            let token = next_token(&mut self.src, &mut control, produced, expected)?;
            produced += token.size();
            tokens.push(token);
        }

        Ok(tokens)
    }

    #[inline]
    pub fn decode(&mut self) -> Result<Vec<u8>, Yaz0Error> {
        do_decode(self)
    }

    fn get_header(&mut self) -> Result<Yaz0Header, Yaz0Error> {
        match self.header {
            Some(header) => Ok(header),
            None => {
                let header = Yaz0Header::from_bitreader(&mut self.src)?;
                self.header = Some(header);
                Ok(header)
            }
        }
    }
}

impl<'a> Decoder<'a, Cursor<&'a [u8]>> {
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr)
    }
}

impl<'a> Decoder<'a, BufReader<File>> {
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, Yaz0Error> {
        File::open(p)
            .map(BufReader::new)
            .map(Self::for_reader)
            .map_err(Into::into)
    }
}

/// Decompress `Yaz0` data into a `Vec<u8>`
///
/// This is a convenience function to decode a `Read`er without
/// having to import and set up a [`Decoder`]
pub fn decode<R: Read>(rdr: R) -> Result<Vec<u8>, Yaz0Error> {
    Decoder::for_reader(rdr).decode()
}

/// Extract the [`Yaz0Header`] from `Yaz0` data
///
/// This is a convenience function to check a stream without having
/// to set up a [`Decoder`]
pub fn yaz0_info<R: Read>(rdr: R) -> Result<Yaz0Header, Yaz0Error> {
    Decoder::for_reader(rdr).header()
}

fn do_decode<R: Read>(opt: &mut Decoder<R>) -> Result<Vec<u8>, Yaz0Error> {
    let header = opt.get_header()?;
    let Decoder { src, log, .. } = opt;

    if let Some(wtr) = log.as_mut() {
        writeln!(wtr, "# Header\n{:?}", &header)?;
    }

    let output_size = header.size as usize;
    let mut output: Vec<u8> = Vec::with_capacity(output_size.min(MAX_PREALLOC));
    let mut control = ControlByte::default();

    while output.len() < output_size {
        let position = output.len();

        match next_token(src, &mut control, position, output_size)? {
            Token::Literal(byte) => {
                output.push(byte);

                if let Some(wtr) = log.as_mut() {
                    writeln!(wtr, "{:04x} - Literal: {:02x}", position, byte)?;
                }
            }
            Token::Match { distance, length } => {
                if distance > position {
                    return Err(Yaz0Error::BadLookBack { distance, position });
                }
                if position + length > output_size {
                    return Err(Yaz0Error::Overrun {
                        position,
                        length,
                        expected: output_size,
                    });
                }

                let start = position - distance;
                // byte by byte, as the source can overlap what this match writes
                for i in start..start + length {
                    let byte = output[i];
                    output.push(byte);
                }

                if let Some(wtr) = log.as_mut() {
                    writeln!(
                        wtr,
                        "{:04x} - Match: length {} distance {} | start: {:04x}",
                        position, length, distance, start
                    )?;
                }
            }
        }
    }

    Ok(output)
}

/// Read the next token, reporting a short stream as truncated
fn next_token<R: Read>(
    src: &mut BitReader<R, BigEndian>,
    control: &mut ControlByte,
    produced: usize,
    expected: usize,
) -> Result<Token, Yaz0Error> {
    control
        .next_is_literal(src)
        .and_then(|literal| Token::read(src, literal))
        .map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => Yaz0Error::Truncated { produced, expected },
            _ => e.into(),
        })
}

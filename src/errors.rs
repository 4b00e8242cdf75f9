use std::io;
use thiserror::Error;

/// Possible errors that arise from attempting to convert a Yaz0 stream into its
/// decompressed data, or vise-versa.
#[derive(Error, Debug)]
pub enum Yaz0Error {
    #[error("Not a Yaz0 stream: found magic {0:02x?}")]
    InvalidHeader([u8; 4]),

    #[error("Stream ended before the 16 byte Yaz0 header was complete")]
    TruncatedHeader,

    #[error("Stream ended after {produced} of {expected} decompressed bytes")]
    Truncated { produced: usize, expected: usize },

    #[error("Match at {position:#06x} looks back {distance} bytes, before the start of output")]
    BadLookBack { distance: usize, position: usize },

    #[error("Match of {length} bytes at {position:#06x} overruns the {expected} byte output")]
    Overrun {
        position: usize,
        length: usize,
        expected: usize,
    },

    #[error("Input of {0} bytes is too large for a Yaz0 header")]
    InputTooLarge(usize),

    #[error("{0}")]
    Io(#[from] io::Error),
}

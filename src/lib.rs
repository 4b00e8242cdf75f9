//! Compress and decompress Nintendo's `Yaz0` data.
//!
//! ```
//! let original = b"sam I am I am sam";
//! let compressed = yaz0::encode(&original[..]).unwrap();
//! let decompressed = yaz0::decode(&compressed[..]).unwrap();
//! assert_eq!(&original[..], &decompressed[..]);
//! ```

mod decode;
mod encode;
mod errors;
pub mod format;

pub use decode::{decode, yaz0_info, Decoder};
pub use encode::{encode, EncoderBuilder};
pub use errors::Yaz0Error;

//! Text processing utilities.
//!
//! The [`utf8`] module provides a single-code-point UTF-8 codec: decode one
//! code point from the front of a byte slice, or encode one code point to
//! its minimal 1-4 byte form. This is the incremental codec the Markov model
//! needs to walk a byte stream one character at a time, rather than a
//! whole-buffer validator.
//!
//! ```
//! use tetragram::text::utf8::{decode_one, encode_one};
//!
//! let (cp, n) = decode_one("日".as_bytes()).unwrap();
//! assert_eq!(n, 3);
//! assert_eq!(encode_one(cp).unwrap().as_bytes(), "日".as_bytes());
//! ```

pub mod utf8;

pub use utf8::{decode_one, encode_one, sequence_length, EncodedChar, Utf8DecodeError};

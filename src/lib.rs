//! Lossless text compression with canonical Huffman codes.
//!
//! The encoder counts byte frequencies, builds a Huffman tree, normalizes it
//! into canonical form, and writes a compact binary file: a (symbol, code
//! length) header followed by the bit-packed payload, terminated by an
//! explicit end-of-stream code. The decoder reconstructs an identical
//! canonical tree from the header alone and walks the payload back to the
//! original bytes.

pub mod canonical;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod freq;
pub mod tree;

/// End-of-stream pseudo-symbol. Always present in every frequency and code
/// table; its code terminates the payload during decode.
pub const EOS: u8 = 0;

pub use decoder::{decode_bytes, decode_file};
pub use encoder::{EncodeReport, encode_bytes, encode_file, encode_file_with_report};
pub use error::HuffError;
pub use tree::{HuffmanTree, Node, dot_graph};

//! Binary reader: parses the canonical header, regenerates the code table
//! and tree, and walks the payload bit by bit.

use std::fs;
use std::path::Path;

use log::{debug, info, trace};

use crate::EOS;
use crate::canonical::{CodeEntry, assign_codes, rebuild_tree};
use crate::encoder::write_atomically;
use crate::error::HuffError;
use crate::tree::{HuffmanTree, Node};

/// Reads the count byte and the (symbol, length) pairs. Code values are not
/// on disk; the caller regenerates them with the canonical assignment.
fn read_header(bytes: &[u8]) -> Result<(Vec<CodeEntry>, usize), HuffError> {
    let &count = bytes.first().ok_or(HuffError::MalformedHeader("empty file"))?;
    if count == 0 {
        return Err(HuffError::MalformedHeader("symbol count is zero"));
    }

    let header_len = 1 + count as usize * 2;
    if bytes.len() < header_len {
        return Err(HuffError::MalformedHeader("truncated symbol table"));
    }

    let mut entries = Vec::with_capacity(count as usize);
    let mut seen = [false; 256];
    for pair in bytes[1..header_len].chunks_exact(2) {
        let (symbol, len) = (pair[0], pair[1]);
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(HuffError::MalformedHeader("duplicate symbol"));
        }
        if len == 0 || len > crate::canonical::MAX_CODE_BITS {
            return Err(HuffError::MalformedHeader("invalid code length"));
        }
        entries.push(CodeEntry { symbol, code: 0, len });
    }
    if !seen[EOS as usize] {
        return Err(HuffError::MalformedHeader("missing end-of-stream symbol"));
    }

    debug!("Header parsed: {} code entries", entries.len());
    Ok((entries, header_len))
}

/// Walks the canonical tree over the payload bits, MSB-first. Each leaf
/// emits its symbol and resets the walk to the root; the EOS leaf stops the
/// decode, leaving any padding bits unexamined.
fn decode_payload(payload: &[u8], root: &Node) -> Result<Vec<u8>, HuffError> {
    // A bare-leaf root means the only symbol is EOS: the original input was
    // empty and the payload is all padding.
    if root.is_leaf() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut curr = root;
    for byte in payload {
        for i in (0..8).rev() {
            let bit = (byte >> i) & 1;
            curr = match curr {
                Node::Internal { left, right, .. } => {
                    if bit == 0 { &**left } else { &**right }
                }
                // Unreachable: leaves reset the walk below.
                Node::Leaf { .. } => curr,
            };
            if let Node::Leaf { symbol, .. } = curr {
                if *symbol == EOS {
                    trace!("EOS matched after {} decoded bytes", out.len());
                    return Ok(out);
                }
                out.push(*symbol);
                curr = root;
            }
        }
    }

    Err(HuffError::CorruptPayload)
}

/// Decompresses wire-format `bytes`. Returns the original data and the
/// canonical tree rebuilt from the header.
pub fn decode_bytes(bytes: &[u8]) -> Result<(Vec<u8>, HuffmanTree), HuffError> {
    let (mut entries, header_len) = read_header(bytes)?;
    assign_codes(&mut entries)?;
    let tree = rebuild_tree(&entries)?;
    let data = decode_payload(&bytes[header_len..], &tree)?;
    Ok((data, tree))
}

/// Decodes the file at `source` into `target` and returns the rebuilt
/// canonical tree. Output placement is atomic, as in the encoder.
pub fn decode_file(source: &Path, target: &Path) -> Result<HuffmanTree, HuffError> {
    info!("Decoding {} -> {}", source.display(), target.display());
    let bytes = fs::read(source)?;
    let (data, tree) = decode_bytes(&bytes)?;
    write_atomically(target, &data)?;
    info!(
        "Decoded {} input bytes into {} output bytes",
        bytes.len(),
        data.len()
    );
    Ok(tree)
}

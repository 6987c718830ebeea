//! Binary writer: canonical header plus the MSB-first bit-packed payload.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::EOS;
use crate::canonical::{
    CodeEntry, CodeTable, assign_codes, build_code_table, extract_lengths, rebuild_tree,
};
use crate::error::HuffError;
use crate::freq::{count_frequencies, entropy};
use crate::tree::{HuffmanTree, build_tree};

/// Header: one count byte, then (symbol, code length) pairs in canonical
/// order. Code values are recomputed by the reader, never stored.
fn encode_header(entries: &[CodeEntry]) -> Result<Vec<u8>, HuffError> {
    if entries.len() > u8::MAX as usize {
        return Err(HuffError::CapacityExceeded(
            "more than 255 distinct symbols",
        ));
    }

    let mut bytes = Vec::with_capacity(1 + entries.len() * 2);
    bytes.push(entries.len() as u8);
    for entry in entries {
        bytes.push(entry.symbol);
        bytes.push(entry.len);
    }

    debug!("Header generated: {} bytes", bytes.len());
    Ok(bytes)
}

/// Packs each input symbol's code, then the EOS code, MSB-first into bytes.
/// The final partial byte is zero-padded on the right.
fn encode_payload(data: &[u8], table: &CodeTable) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut acc = 0u8;
    let mut nbits = 0u8;

    let mut push_code = |entry: &CodeEntry, bytes: &mut Vec<u8>| {
        for i in (0..entry.len).rev() {
            acc = (acc << 1) | ((entry.code >> i) & 1);
            nbits += 1;
            if nbits == 8 {
                bytes.push(acc);
                acc = 0;
                nbits = 0;
            }
        }
    };

    for b in data {
        // Every input byte has an entry: the table was built from this
        // input's own frequency counts.
        push_code(&table[b], &mut bytes);
    }
    push_code(&table[&EOS], &mut bytes);

    if nbits > 0 {
        bytes.push(acc << (8 - nbits));
    }

    debug!("Payload packed: {} bytes", bytes.len());
    bytes
}

/// Everything a caller might want to know about one encode run: both trees
/// for visualization and the sizes/entropy for the CLI summary, all computed
/// from the frequency table the encoder already built.
pub struct EncodeReport {
    pub canonical_tree: HuffmanTree,
    pub raw_tree: HuffmanTree,
    pub input_len: u64,
    pub output_len: u64,
    pub entropy: f64,
}

fn encode_to_memory(data: &[u8]) -> Result<(Vec<u8>, EncodeReport), HuffError> {
    let freq = count_frequencies(data);
    let raw_tree = build_tree(&freq)?;

    let mut entries = extract_lengths(&raw_tree)?;
    assign_codes(&mut entries)?;
    let canonical_tree = rebuild_tree(&entries)?;
    let table = build_code_table(&entries);

    let mut out = encode_header(&entries)?;
    out.extend_from_slice(&encode_payload(data, &table));

    let report = EncodeReport {
        canonical_tree,
        raw_tree,
        input_len: data.len() as u64,
        output_len: out.len() as u64,
        entropy: entropy(&freq),
    };
    Ok((out, report))
}

/// Compresses `data` into the wire format. Returns the serialized bytes and
/// the canonical tree (the tree is only of interest to visualization).
pub fn encode_bytes(data: &[u8]) -> Result<(Vec<u8>, HuffmanTree), HuffError> {
    let (bytes, report) = encode_to_memory(data)?;
    Ok((bytes, report.canonical_tree))
}

/// Encodes the file at `source` into `target` and returns the canonical
/// tree. The output goes to a temporary file next to `target` and is renamed
/// into place on success, so a failed run leaves no plausible half-written
/// output behind.
pub fn encode_file(source: &Path, target: &Path) -> Result<HuffmanTree, HuffError> {
    let report = encode_file_with_report(source, target)?;
    Ok(report.canonical_tree)
}

/// As [`encode_file`], returning the full [`EncodeReport`].
pub fn encode_file_with_report(
    source: &Path,
    target: &Path,
) -> Result<EncodeReport, HuffError> {
    info!("Encoding {} -> {}", source.display(), target.display());
    let data = fs::read(source)?;
    let (bytes, report) = encode_to_memory(&data)?;
    write_atomically(target, &bytes)?;
    info!(
        "Encoded {} input bytes into {} output bytes",
        report.input_len, report.output_len
    );
    Ok(report)
}

pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), HuffError> {
    let dir = target.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    tmp.write_all(bytes)?;
    tmp.persist(target).map_err(|e| HuffError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aab_produces_expected_header_and_payload() {
        let (bytes, _) = encode_bytes(b"aab").unwrap();
        // header: 3 entries; EOS:2 bits, b:2 bits, a:1 bit
        assert_eq!(&bytes[..7], &[3, 0, 2, b'b', 2, b'a', 1]);
        // payload: a a b EOS = 1 1 01 00, left-aligned -> 1101_0000
        assert_eq!(&bytes[7..], &[0b1101_0000]);
    }

    #[test]
    fn empty_input_still_writes_eos() {
        let (bytes, tree) = encode_bytes(b"").unwrap();
        assert_eq!(bytes, vec![1, 0, 1, 0b0000_0000]);
        assert!(tree.is_leaf());
    }

    #[test]
    fn encoding_is_deterministic() {
        let data = b"canonical codes must not leak merge order";
        let (first, _) = encode_bytes(data).unwrap();
        let (second, _) = encode_bytes(data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn too_many_symbols_is_a_capacity_error() {
        // 255 distinct input bytes plus EOS = 256 entries
        let data: Vec<u8> = (1..=255u8).collect();
        assert!(matches!(
            encode_bytes(&data),
            Err(HuffError::CapacityExceeded(_))
        ));
    }
}

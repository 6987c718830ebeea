//! Canonical Huffman code assignment and tree reconstruction.
//!
//! The raw tree out of [`crate::tree::build_tree`] has correct code lengths
//! but arbitrary code values (merge order of equal-frequency nodes leaks into
//! the shape). Canonicalization keeps the lengths, re-derives the values in a
//! fixed order, and rebuilds an equivalent tree from them. The decoder runs
//! the exact same assignment on the (symbol, length) pairs it reads back, so
//! code values are never stored on disk.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::trace;

use crate::error::HuffError;
use crate::tree::Node;

/// Longest representable code, dictated by the one-byte code-value and
/// length fields of the wire format.
pub const MAX_CODE_BITS: u8 = 8;

/// A symbol with its canonical code value and length in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbol: u8,
    pub code: u8,
    pub len: u8,
}

impl Ord for CodeEntry {
    /// Canonical ordering: descending code length, then ascending symbol.
    /// Sorting a `Vec<CodeEntry>` puts it in header order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .len
            .cmp(&self.len)
            .then_with(|| self.symbol.cmp(&other.symbol))
    }
}

impl PartialOrd for CodeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub type CodeTable = HashMap<u8, CodeEntry>;

/// Walks the tree and records one entry per leaf with its depth as the code
/// length. Code values are left at zero until [`assign_codes`] runs.
///
/// A bare-leaf root (single-symbol table) gets a 1-bit code, never a
/// zero-length one. Depths beyond [`MAX_CODE_BITS`] are a hard capacity
/// error, not something to truncate.
pub fn extract_lengths(root: &Node) -> Result<Vec<CodeEntry>, HuffError> {
    let mut entries = Vec::new();
    let mut stack: Vec<(&Node, u8)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        match node {
            Node::Leaf { symbol, .. } => {
                if depth > MAX_CODE_BITS {
                    return Err(HuffError::CapacityExceeded(
                        "canonical code length exceeds 8 bits",
                    ));
                }
                entries.push(CodeEntry {
                    symbol: *symbol,
                    code: 0,
                    len: depth.max(1),
                });
            }
            Node::Internal { left, right, .. } => {
                if depth == MAX_CODE_BITS {
                    return Err(HuffError::CapacityExceeded(
                        "canonical code length exceeds 8 bits",
                    ));
                }
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    Ok(entries)
}

/// Sorts the entries into canonical order and assigns code values: the
/// longest code gets 0, codes at the same length count up by one, and a
/// transition to a shorter length right-shifts the incremented value by the
/// length difference.
pub fn assign_codes(entries: &mut [CodeEntry]) -> Result<(), HuffError> {
    if entries.is_empty() {
        return Err(HuffError::EmptyInput);
    }

    entries.sort_unstable();

    let mut code: u16 = 0;
    let mut len = entries[0].len;
    entries[0].code = 0;

    for entry in entries.iter_mut().skip(1) {
        code += 1;
        if entry.len < len {
            code >>= len - entry.len;
            len = entry.len;
        }
        if len == 0 || code >> len != 0 {
            return Err(HuffError::MalformedHeader(
                "code lengths do not form a prefix-free code",
            ));
        }
        entry.code = code as u8;
        trace!(
            "Assigned code {:0width$b} to symbol {:#04x}",
            code,
            entry.symbol,
            width = len as usize
        );
    }

    Ok(())
}

/// Rebuilds an executable tree from canonical entries by walking each code's
/// bits MSB-first from the root, creating internal nodes on demand and
/// placing the leaf at the end of the path. Both the encoder and the decoder
/// obtain their canonical tree only through this routine.
///
/// Rebuilt nodes carry no frequencies. A single-entry list produces a
/// bare-leaf root.
pub fn rebuild_tree(entries: &[CodeEntry]) -> Result<Node, HuffError> {
    match entries {
        [] => Err(HuffError::EmptyInput),
        [only] => Ok(Node::Leaf {
            symbol: only.symbol,
            freq: 0,
        }),
        _ => {
            let mut root = PartialNode::default();
            for entry in entries {
                root.insert(entry)?;
            }
            root.freeze()
        }
    }
}

/// Builds the symbol-to-code lookup used by the encoder.
pub fn build_code_table(entries: &[CodeEntry]) -> CodeTable {
    entries.iter().map(|&e| (e.symbol, e)).collect()
}

/// Tree under construction: children appear one at a time, so both are
/// optional until [`PartialNode::freeze`] checks the final shape.
#[derive(Default)]
struct PartialNode {
    symbol: Option<u8>,
    left: Option<Box<PartialNode>>,
    right: Option<Box<PartialNode>>,
}

impl PartialNode {
    fn insert(&mut self, entry: &CodeEntry) -> Result<(), HuffError> {
        let mut curr = self;
        for i in (0..entry.len).rev() {
            if curr.symbol.is_some() {
                return Err(HuffError::MalformedHeader(
                    "code path passes through a leaf",
                ));
            }
            let bit = (entry.code >> i) & 1;
            let child = if bit == 0 {
                &mut curr.left
            } else {
                &mut curr.right
            };
            curr = child.get_or_insert_with(Box::default);
        }
        if curr.symbol.is_some() || curr.left.is_some() || curr.right.is_some() {
            return Err(HuffError::MalformedHeader("conflicting code assignment"));
        }
        curr.symbol = Some(entry.symbol);
        Ok(())
    }

    fn freeze(self) -> Result<Node, HuffError> {
        match (self.symbol, self.left, self.right) {
            (Some(symbol), None, None) => Ok(Node::Leaf { symbol, freq: 0 }),
            (None, Some(left), Some(right)) => Ok(Node::Internal {
                freq: 0,
                left: Box::new(left.freeze()?),
                right: Box::new(right.freeze()?),
            }),
            _ => Err(HuffError::MalformedHeader(
                "code lengths do not describe a complete tree",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freq::count_frequencies;
    use crate::tree::build_tree;

    fn entries_for(data: &[u8]) -> Vec<CodeEntry> {
        let freq = count_frequencies(data);
        let tree = build_tree(&freq).unwrap();
        let mut entries = extract_lengths(&tree).unwrap();
        assign_codes(&mut entries).unwrap();
        entries
    }

    #[test]
    fn aab_gets_expected_lengths() {
        let entries = entries_for(b"aab");
        // canonical order: the two 2-bit codes first (EOS before b), then a
        assert_eq!(entries.len(), 3);
        assert_eq!((entries[0].symbol, entries[0].len), (0, 2));
        assert_eq!((entries[1].symbol, entries[1].len), (b'b', 2));
        assert_eq!((entries[2].symbol, entries[2].len), (b'a', 1));
        assert_eq!(entries[0].code, 0b00);
        assert_eq!(entries[1].code, 0b01);
        assert_eq!(entries[2].code, 0b1);
    }

    #[test]
    fn single_entry_gets_one_bit_code() {
        let entries = entries_for(b"");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].len, 1);
        assert_eq!(entries[0].code, 0);
    }

    #[test]
    fn codes_are_prefix_free() {
        let entries = entries_for(b"the quick brown fox jumps over the lazy dog");
        for a in &entries {
            for b in &entries {
                if a.symbol == b.symbol {
                    continue;
                }
                let (short, long) = if a.len <= b.len { (a, b) } else { (b, a) };
                let prefix = long.code >> (long.len - short.len);
                assert_ne!(
                    prefix, short.code,
                    "code of {:#04x} prefixes code of {:#04x}",
                    short.symbol, long.symbol
                );
            }
        }
    }

    #[test]
    fn canonical_order_is_sorted_order() {
        let entries = entries_for(b"mississippi river");
        for pair in entries.windows(2) {
            assert!(pair[0].len >= pair[1].len);
            if pair[0].len == pair[1].len {
                assert!(pair[0].symbol < pair[1].symbol);
            }
        }
    }

    #[test]
    fn deep_tree_exceeds_capacity() {
        // Doubling weights degenerate into a chain: every merge so far
        // weighs no more than the next leaf, so EOS ends up at depth 9.
        let mut freq = count_frequencies(b"");
        for symbol in 1..=9u8 {
            freq.insert(symbol, 1u64 << symbol);
        }
        let tree = build_tree(&freq).unwrap();
        assert!(matches!(
            extract_lengths(&tree),
            Err(HuffError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn multistep_length_transition_stays_prefix_free() {
        // Lengths {3,3,3,3,1}: the transition from 3-bit to 1-bit codes
        // must shift by the full length difference, or the short code
        // would collide with a longer code's prefix.
        let entries = entries_for(b"abcdddd");
        let lens: Vec<u8> = entries.iter().map(|e| e.len).collect();
        assert_eq!(lens, [3, 3, 3, 3, 1]);
        assert_eq!(entries[4].code, 0b1);
        // the rebuilt tree is complete, so the entries decode unambiguously
        rebuild_tree(&entries).unwrap();
    }

    #[test]
    fn rebuild_round_trips_the_entries() {
        let entries = entries_for(b"abracadabra");
        let tree = rebuild_tree(&entries).unwrap();
        let mut rebuilt = extract_lengths(&tree).unwrap();
        assign_codes(&mut rebuilt).unwrap();
        assert_eq!(entries, rebuilt);
    }

    #[test]
    fn forged_lengths_are_rejected() {
        // Three 1-bit codes cannot coexist in a binary tree.
        let mut entries = vec![
            CodeEntry { symbol: 0, code: 0, len: 1 },
            CodeEntry { symbol: 1, code: 0, len: 1 },
            CodeEntry { symbol: 2, code: 0, len: 1 },
        ];
        assert!(matches!(
            assign_codes(&mut entries),
            Err(HuffError::MalformedHeader(_))
        ));
    }

    #[test]
    fn incomplete_code_fails_rebuild() {
        // A lone 2-bit code leaves dangling half-nodes.
        let entries = vec![
            CodeEntry { symbol: 0, code: 0, len: 2 },
            CodeEntry { symbol: 1, code: 1, len: 2 },
        ];
        assert!(matches!(
            rebuild_tree(&entries),
            Err(HuffError::MalformedHeader(_))
        ));
    }
}

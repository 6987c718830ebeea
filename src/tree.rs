//! Huffman tree construction over a min-heap of frequency-weighted nodes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;

use crate::EOS;
use crate::error::HuffError;
use crate::freq::FreqTable;

#[derive(Debug, Eq, PartialEq)]
pub enum Node {
    Leaf {
        symbol: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

pub type HuffmanTree = Node;

#[derive(Eq, PartialEq)]
struct HeapNode {
    freq: u64,
    // Insertion sequence number. Ties on frequency resolve in insertion
    // order, so merge order is reproducible run to run.
    seq: u64,
    node: Box<Node>,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for Min-Heap behavior in BinaryHeap (which is max-heap by default)
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds the Huffman tree by repeatedly merging the two lowest-frequency
/// nodes. A table with a single entry yields a bare leaf root.
pub fn build_tree(frequencies: &FreqTable) -> Result<HuffmanTree, HuffError> {
    debug!(
        "Building Huffman tree from {} unique symbols",
        frequencies.len()
    );

    // Seed leaves in ascending symbol order so the heap contents do not
    // depend on HashMap iteration order.
    let mut leaves: Vec<(u8, u64)> = frequencies.iter().map(|(&s, &f)| (s, f)).collect();
    leaves.sort_unstable();

    let mut heap = BinaryHeap::with_capacity(leaves.len());
    let mut seq = 0u64;
    for (symbol, freq) in leaves {
        heap.push(HeapNode {
            freq,
            seq,
            node: Box::new(Node::Leaf { symbol, freq }),
        });
        seq += 1;
    }

    while heap.len() > 1 {
        let left = heap.pop().expect("heap has at least two nodes");
        let right = heap.pop().expect("heap has at least two nodes");

        let freq = left.freq + right.freq;
        heap.push(HeapNode {
            freq,
            seq,
            node: Box::new(Node::Internal {
                freq,
                left: left.node,
                right: right.node,
            }),
        });
        seq += 1;
    }

    heap.pop().map(|n| *n.node).ok_or(HuffError::EmptyInput)
}

/// Renders the tree as a Graphviz digraph, edges labeled "0" for left and
/// "1" for right. Nodes get sequential ids so identical labels (for one,
/// rebuilt canonical trees carry no frequencies) stay distinct. Purely for
/// visualization tooling.
pub fn dot_graph(root: &Node) -> String {
    let mut s = String::from("digraph{\n");
    let mut next_id = 0usize;
    dot_expand(root, &mut s, &mut next_id);
    s.push('}');
    s
}

fn dot_expand(curr: &Node, out: &mut String, next_id: &mut usize) -> usize {
    let id = *next_id;
    *next_id += 1;
    out.push_str(&format!("n{id} [ label=\"{}\" ];\n", node_label(curr)));
    if let Node::Internal { left, right, .. } = curr {
        let left_id = dot_expand(left, out, next_id);
        out.push_str(&format!("n{id} -> n{left_id} [ label=\"0\" ];\n"));
        let right_id = dot_expand(right, out, next_id);
        out.push_str(&format!("n{id} -> n{right_id} [ label=\"1\" ];\n"));
    }
    id
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Internal { freq, .. } => format!("{freq}"),
        Node::Leaf { symbol, freq } => {
            let name = match *symbol {
                EOS => "EOF".to_string(),
                b'\r' => "Carriage Return".to_string(),
                b'"' => "DblQuote".to_string(),
                b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
                b => format!("{b:#04x}"),
            };
            if *freq == 0 {
                name
            } else {
                format!("{name}:{freq}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freq::count_frequencies;

    #[test]
    fn empty_table_is_an_error() {
        let freq = FreqTable::new();
        assert!(matches!(build_tree(&freq), Err(HuffError::EmptyInput)));
    }

    #[test]
    fn single_entry_yields_leaf_root() {
        let mut freq = FreqTable::new();
        freq.insert(EOS, 1);
        let tree = build_tree(&freq).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.symbol(), Some(EOS));
    }

    #[test]
    fn root_frequency_is_total_count() {
        let freq = count_frequencies(b"aab");
        let tree = build_tree(&freq).unwrap();
        // a:2, b:1, EOS:1 -> total 4
        assert_eq!(tree.freq(), 4);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn aab_merges_equal_singletons_first() {
        let freq = count_frequencies(b"aab");
        let tree = build_tree(&freq).unwrap();
        // b and EOS (freq 1 each) merge into a freq-2 node, which then
        // merges with a (freq 2) at the root.
        let Node::Internal { left, right, .. } = &tree else {
            panic!("root must be internal");
        };
        let (leaf_side, pair_side) = if left.is_leaf() {
            (left, right)
        } else {
            (right, left)
        };
        assert_eq!(leaf_side.symbol(), Some(b'a'));
        assert_eq!(pair_side.freq(), 2);
        assert!(!pair_side.is_leaf());
    }

    #[test]
    fn dot_graph_labels_edges_and_eof() {
        let freq = count_frequencies(b"aab");
        let tree = build_tree(&freq).unwrap();
        let dot = dot_graph(&tree);
        assert!(dot.starts_with("digraph{"));
        assert!(dot.ends_with('}'));
        assert!(dot.contains("label=\"0\""));
        assert!(dot.contains("label=\"1\""));
        assert!(dot.contains("EOF"));
    }
}

//! Construction of Huffman code lengths from symbol frequencies.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{Error, Result, EOF, MAX_CODE_LEN};

/// Node of the Huffman tree, stored in an arena; children are arena indices.
struct Node {
    weight: u64,
    children: Option<[usize; 2]>,
    symbol: u32
}

/// Fails if the end-of-input slot of an alphabet of `len` symbols would coincide with [`EOF`].
fn check_alphabet_len(len: usize) -> Result<()> {
    if len >= EOF as usize { Err(Error::AlphabetTooLarge { len }) } else { Ok(()) }
}

/// Returns the code length of each of `counts.len() + 1` symbols, where the last one is
/// the end-of-input symbol, which is always coded (with weight 0). Symbols with zero count get length 0.
///
/// The algorithm runs in *O(n log n)* time, where *n* is the number of occurring symbols.
pub(crate) fn code_lengths(counts: &[u32]) -> Result<Box<[u32]>> {
    check_alphabet_len(counts.len())?;
    let eof = counts.len() as u32;
    let mut arena: Vec<Node> = Vec::new();
    // (weight, insertion order, arena index); insertion order breaks ties deterministically
    let mut queue = BinaryHeap::new();
    for (symbol, &count) in counts.iter().enumerate() {
        if count != 0 {
            queue.push(Reverse((count as u64, arena.len(), arena.len())));
            arena.push(Node { weight: count as u64, children: None, symbol: symbol as u32 });
        }
    }
    if arena.is_empty() { return Err(Error::EmptyAlphabet); }
    queue.push(Reverse((0, arena.len(), arena.len())));
    arena.push(Node { weight: 0, children: None, symbol: eof });

    while let (Some(Reverse((_, _, first))), Some(Reverse((_, _, second)))) = (queue.pop(), queue.pop()) {
        let weight = arena[first].weight + arena[second].weight;
        queue.push(Reverse((weight, arena.len(), arena.len())));
        arena.push(Node { weight, children: Some([second, first]), symbol: 0 });
    }
    // the loop above pops the root alone and stops; the root is the last node added
    let root = arena.len() - 1;

    let mut lengths = vec![0u32; counts.len() + 1].into_boxed_slice();
    let mut max_len = 0;
    let mut stack = vec![(root, 0u32)];
    while let Some((index, depth)) = stack.pop() {
        match arena[index].children {
            Some([left, right]) => {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
            None => {
                lengths[arena[index].symbol as usize] = depth;
                max_len = max_len.max(depth);
            }
        }
    }
    if max_len > MAX_CODE_LEN { return Err(Error::CodeTooLong { len: max_len }); }
    tracing::trace!(leaves = (arena.len() + 1) / 2, max_len, "built Huffman tree");
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_symbol() {
        assert_eq!(code_lengths(&[5]).unwrap().as_ref(), [1, 1]);
    }

    #[test]
    fn skips_absent_symbols() {
        assert_eq!(code_lengths(&[0, 3, 0]).unwrap().as_ref(), [0, 1, 0, 1]);
    }

    #[test]
    fn three_symbols() {
        // weights: a=100, b=50, c=10, eof=0
        //     /\
        //    /\ a
        //   /\ b
        // eof c
        assert_eq!(code_lengths(&[100, 50, 10]).unwrap().as_ref(), [1, 2, 3, 3]);
    }

    #[test]
    fn balanced() {
        assert_eq!(code_lengths(&[1, 1, 1]).unwrap().as_ref(), [2, 2, 2, 2]);
    }

    #[test]
    fn alphabet_too_large() {
        assert!(check_alphabet_len(EOF as usize - 1).is_ok());
        assert!(matches!(check_alphabet_len(EOF as usize), Err(Error::AlphabetTooLarge { len }) if len == EOF as usize));
        assert_eq!(Error::AlphabetTooLarge { len: 5 }.to_string(), "huff: alphabet of 5 symbols is too large");
    }

    #[test]
    fn empty_alphabet() {
        assert!(matches!(code_lengths(&[]), Err(Error::EmptyAlphabet)));
        assert!(matches!(code_lengths(&[0, 0]), Err(Error::EmptyAlphabet)));
    }

    #[test]
    fn kraft_equality() {
        let lengths = code_lengths(&[7, 1, 3, 3, 20, 1, 1, 50, 2]).unwrap();
        let kraft: f64 = lengths.iter().filter(|l| **l != 0).map(|l| 0.5f64.powi(*l as i32)).sum();
        assert_eq!(kraft, 1.0);
    }
}

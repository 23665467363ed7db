//! Tools to count frequencies of symbols.

use std::borrow::Borrow;
use fsum::FSum;

/// Returns the numbers of occurrences of symbols exposed by `iter`, indexed by symbol value.
/// The result is just long enough to contain the largest symbol.
pub fn count_symbols<Iter>(iter: Iter) -> Vec<u32>
    where Iter: IntoIterator, Iter::Item: Borrow<u32>
{
    let mut counts = Vec::new();
    for symbol in iter {
        let symbol = *symbol.borrow() as usize;
        if symbol >= counts.len() { counts.resize(symbol + 1, 0); }
        counts[symbol] += 1;
    }
    counts
}

/// Returns the Shannon entropy (in bits per symbol) of the distribution given by `counts`.
pub fn entropy(counts: &[u32]) -> f64 {
    let sum = counts.iter().map(|c| *c as u64).sum::<u64>() as f64;
    - FSum::with_all(counts.iter().filter(|c| **c != 0)
        .map(|c| { let p = *c as f64 / sum; p * p.log2() })).value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count() {
        assert_eq!(count_symbols([3u32, 1, 3, 3]), [0, 1, 0, 3]);
        assert_eq!(count_symbols(&[0u32]), [1]);
        assert!(count_symbols(Vec::<u32>::new()).is_empty());
    }

    #[test]
    fn entropy_of_uniform() {
        assert_eq!(entropy(&[5, 5, 5, 5]), 2.0);
        assert_eq!(entropy(&[0, 7, 0]), 0.0);
    }
}

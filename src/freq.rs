//! Frequency analysis over the input bytes.

use std::collections::HashMap;

use log::debug;

use crate::EOS;

pub type FreqTable = HashMap<u8, u64>;

/// Counts the occurrences of each distinct byte value and injects one
/// synthetic occurrence of the [`EOS`] pseudo-symbol, so the EOS entry is
/// always present with a count of at least 1.
pub fn count_frequencies(data: &[u8]) -> FreqTable {
    let mut freq = FreqTable::new();
    for &b in data {
        *freq.entry(b).or_insert(0) += 1;
    }
    *freq.entry(EOS).or_insert(0) += 1;

    debug!("Frequency table built: {} unique symbols", freq.len());
    freq
}

/// Shannon entropy estimate in bits per symbol, used for the CLI ratio
/// report.
pub fn entropy(freq: &FreqTable) -> f64 {
    let total: u64 = freq.values().sum();
    let total_f = total as f64;

    freq.values()
        .map(|&count| {
            let p = count as f64 / total_f;
            -p * p.log2()
        })
        .sum()
}

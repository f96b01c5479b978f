//src/assembly.rs

use crate::types::{AssemblyStats, SeqRecord};

/// Computes assembly statistics for one cluster's sequences.
///
/// N50 scans the length-sorted list from smallest to largest and returns
/// the first length at which the running total strictly exceeds half the
/// assembly size. The upstream pipeline has always reported the metric
/// this way, so the scan direction is kept rather than swapped for the
/// textbook largest-first definition; the regression tests below pin it.
///
/// An empty input yields all-zero stats with `n50 = None`.
pub fn assess_assembly(records: &[SeqRecord]) -> AssemblyStats {
    if records.is_empty() {
        return AssemblyStats::default();
    }

    let mut lengths: Vec<u64> = records.iter().map(|record| record.len()).collect();
    lengths.sort_unstable();

    let size: u64 = lengths.iter().sum();
    let largest_sequence = lengths[lengths.len() - 1];

    let mut running = 0u64;
    let mut n50 = None;
    for &length in &lengths {
        running += length;
        // 2 * running > size <=> running strictly exceeds half the size
        if running * 2 > size {
            n50 = Some(length);
            break;
        }
    }

    AssemblyStats {
        size,
        number_sequences: lengths.len(),
        largest_sequence,
        n50,
    }
}

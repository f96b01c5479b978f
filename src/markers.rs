//src/markers.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Marker id -> copy count.
pub type MarkerCounts = AHashMap<String, u32>;

/// Per-contig marker-gene copy counts, built once from the marker table
/// and immutable afterwards.
#[derive(Debug, Default)]
pub struct MarkerProfile {
    contigs: AHashMap<String, MarkerCounts>,
    empty: MarkerCounts,
}

impl MarkerProfile {
    /// Copy counts for one contig. A contig absent from the marker table
    /// has an implicitly empty profile, never an error.
    pub fn marker_counts(&self, contig: &str) -> &MarkerCounts {
        self.contigs.get(contig).unwrap_or(&self.empty)
    }

    pub fn contains(&self, contig: &str) -> bool {
        self.contigs.contains_key(contig)
    }

    /// Number of contigs with at least one marker hit.
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

/// Parses a marker table in the format:
/// ```text
/// contig<TAB>single_copy_PFAMs
/// k141_1<TAB>PF00411,PF01000
/// ```
/// The header row is discarded. Every occurrence of a marker id increments
/// that contig's copy count, and repeated rows for the same contig
/// accumulate into one profile.
pub fn read_marker_table<P: AsRef<Path>>(path: P) -> io::Result<MarkerProfile> {
    let file = File::open(path)?;
    parse_marker_table(BufReader::new(file))
}

fn parse_marker_table<R: BufRead>(reader: R) -> io::Result<MarkerProfile> {
    let mut contigs: AHashMap<String, MarkerCounts> = AHashMap::new();

    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if i == 0 {
            continue; // header
        }

        let parts: Vec<&str> = line.split('\t').collect();

        // Skip malformed lines
        if parts.len() < 2 {
            continue;
        }

        let contig = parts[0].trim();
        if contig.is_empty() {
            continue;
        }

        let counts = contigs.entry(contig.to_string()).or_default();
        for marker in parts[1].split(',') {
            let marker = marker.trim();
            if marker.is_empty() {
                continue;
            }
            *counts.entry(marker.to_string()).or_insert(0) += 1;
        }
    }

    Ok(MarkerProfile {
        contigs,
        empty: MarkerCounts::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn profile_from(text: &str) -> MarkerProfile {
        parse_marker_table(Cursor::new(text)).expect("parse failed")
    }

    #[test]
    fn repeated_markers_in_one_row_are_counted_per_occurrence() {
        let profile = profile_from("contig\tsingle_copy_PFAMs\nX\tPF1,PF1,PF2\n");
        let counts = profile.marker_counts("X");
        assert_eq!(counts.get("PF1"), Some(&2));
        assert_eq!(counts.get("PF2"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn rows_for_the_same_contig_accumulate() {
        let profile = profile_from("contig\tpfams\nA\tPF1\nA\tPF1,PF3\n");
        let counts = profile.marker_counts("A");
        assert_eq!(counts.get("PF1"), Some(&2));
        assert_eq!(counts.get("PF3"), Some(&1));
    }

    #[test]
    fn absent_contig_has_empty_profile() {
        let profile = profile_from("contig\tpfams\nA\tPF1\n");
        assert!(!profile.contains("B"));
        assert!(profile.marker_counts("B").is_empty());
    }

    #[test]
    fn header_row_is_discarded_and_short_rows_skipped() {
        let profile = profile_from("contig\tpfams\nonly_one_field\nA\tPF9\n");
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.marker_counts("A").get("PF9"), Some(&1));
    }
}

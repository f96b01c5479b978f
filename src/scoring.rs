//src/scoring.rs

use std::str::FromStr;

use crate::error::BinqcError;
use crate::markers::MarkerCounts;

/// Single-copy marker families expected in a complete bacterial genome.
pub const BACTERIA_EXPECTED_MARKERS: u32 = 139;
/// Single-copy marker families expected in a complete archaeal genome.
pub const ARCHAEA_EXPECTED_MARKERS: u32 = 162;

/// Kingdom whose single-copy marker set the scores are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kingdom {
    Bacteria,
    Archaea,
}

impl Kingdom {
    pub fn expected_markers(self) -> u32 {
        match self {
            Kingdom::Bacteria => BACTERIA_EXPECTED_MARKERS,
            Kingdom::Archaea => ARCHAEA_EXPECTED_MARKERS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kingdom::Bacteria => "bacteria",
            Kingdom::Archaea => "archaea",
        }
    }
}

impl FromStr for Kingdom {
    type Err = BinqcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bacteria" => Ok(Kingdom::Bacteria),
            "archaea" => Ok(Kingdom::Archaea),
            other => Err(BinqcError::Config(format!(
                "unsupported kingdom '{}', expected bacteria or archaea",
                other
            ))),
        }
    }
}

/// Marker-derived quality scores for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerScore {
    /// Distinct marker families seen at least once.
    pub markers_found: u32,
    /// Marker families seen exactly once.
    pub unique_markers: u32,
    /// Found / expected, as a percentage. Deliberately not clamped: a value
    /// above 100 means the bin carries more distinct markers than one
    /// genome should, which usually signals contamination.
    pub completeness: f64,
    /// Unique / found, as a percentage. `None` when no markers were found.
    pub purity: Option<f64>,
}

/// Scores one cluster's aggregated marker counts against the kingdom's
/// expected single-copy set.
pub fn score_cluster(marker_totals: &MarkerCounts, kingdom: Kingdom) -> MarkerScore {
    let markers_found = marker_totals.len() as u32;
    let unique_markers = marker_totals.values().filter(|&&count| count == 1).count() as u32;

    let completeness =
        f64::from(markers_found) / f64::from(kingdom.expected_markers()) * 100.0;
    let purity = if markers_found == 0 {
        None
    } else {
        Some(f64::from(unique_markers) / f64::from(markers_found) * 100.0)
    };

    MarkerScore {
        markers_found,
        unique_markers,
        completeness,
        purity,
    }
}

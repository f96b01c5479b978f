//src/cluster_table.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::BinqcError;
use crate::markers::{MarkerCounts, MarkerProfile};
use crate::types::{ClusterLabel, UNCLAIMED_LABEL};

/// Name of the column that identifies the contig in the cluster table.
pub const CONTIG_COLUMN: &str = "contig";

/// Cluster label -> aggregated marker copy counts across the cluster's contigs.
pub type ClusterMarkerTotals = AHashMap<ClusterLabel, MarkerCounts>;

/// Per-contig cluster labels, in table order, plus the first-seen order of
/// the cluster labels themselves. Built once and immutable afterwards.
#[derive(Debug, Default)]
pub struct ClusterAssignment {
    contigs: Vec<String>,
    labels: AHashMap<String, ClusterLabel>,
    cluster_order: Vec<ClusterLabel>,
}

impl ClusterAssignment {
    pub fn label(&self, contig: &str) -> Option<&ClusterLabel> {
        self.labels.get(contig)
    }

    /// Assigned contigs in table order. A contig listed twice keeps its
    /// first position but its last label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClusterLabel)> {
        self.contigs
            .iter()
            .map(|contig| (contig.as_str(), &self.labels[contig.as_str()]))
    }

    /// Every cluster label the table mentioned, in first-seen order.
    pub fn clusters(&self) -> &[ClusterLabel] {
        &self.cluster_order
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    fn insert(&mut self, contig: &str, label: ClusterLabel) {
        if !self.cluster_order.contains(&label) {
            self.cluster_order.push(label.clone());
        }
        if let Some(existing) = self.labels.get_mut(contig) {
            *existing = label;
        } else {
            self.contigs.push(contig.to_string());
            self.labels.insert(contig.to_string(), label);
        }
    }
}

/// Reads the cluster table and validates its header.
///
/// Exactly one column must match `cluster_column` and exactly one must be
/// named `contig`; anything else is a schema error. Rows whose contig field
/// is the literal string `contig` (a duplicated header inside the data) are
/// still recorded so the partitioner can route them, but the marker
/// aggregator skips them.
pub fn read_cluster_table<P: AsRef<Path>>(
    path: P,
    cluster_column: &str,
) -> Result<ClusterAssignment, BinqcError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_cluster_table(
        BufReader::new(file),
        cluster_column,
        &path.display().to_string(),
    )
}

fn parse_cluster_table<R: BufRead>(
    reader: R,
    cluster_column: &str,
    table_name: &str,
) -> Result<ClusterAssignment, BinqcError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(BinqcError::Schema(format!(
                "could not find column {} in cluster table {}",
                cluster_column, table_name
            )))
        }
    };

    let mut cluster_index = None;
    let mut contig_index = None;
    let mut cluster_column_found = 0;
    let mut contig_column_found = 0;
    for (i, heading) in header.split('\t').enumerate() {
        if heading == cluster_column {
            cluster_index = Some(i);
            cluster_column_found += 1;
        }
        if heading == CONTIG_COLUMN {
            contig_index = Some(i);
            contig_column_found += 1;
        }
    }

    let cluster_index = match cluster_index {
        Some(i) => i,
        None => {
            return Err(BinqcError::Schema(format!(
                "could not find column {} in cluster table {}",
                cluster_column, table_name
            )))
        }
    };
    if cluster_column_found > 1 {
        return Err(BinqcError::Schema(format!(
            "multiple columns called {} found in {}",
            cluster_column, table_name
        )));
    }
    let contig_index = match contig_index {
        Some(i) => i,
        None => {
            return Err(BinqcError::Schema(format!(
                "could not find contig column in {}",
                table_name
            )))
        }
    };
    if contig_column_found > 1 {
        return Err(BinqcError::Schema(format!(
            "multiple contig columns found in {}",
            table_name
        )));
    }

    let mut assignment = ClusterAssignment::default();
    for line_result in lines {
        let line = line_result?;
        let fields: Vec<&str> = line.split('\t').collect();

        // Skip rows too short to carry both columns
        if fields.len() <= cluster_index || fields.len() <= contig_index {
            continue;
        }

        let contig = fields[contig_index].trim();
        let cluster = fields[cluster_index].trim();
        if contig.is_empty() || cluster.is_empty() {
            continue;
        }
        if cluster == UNCLAIMED_LABEL {
            return Err(BinqcError::Schema(format!(
                "cluster label {} is reserved, found in {}",
                UNCLAIMED_LABEL, table_name
            )));
        }

        assignment.insert(contig, ClusterLabel::Cluster(cluster.to_string()));
    }

    Ok(assignment)
}

/// Folds per-contig marker counts into per-cluster totals. Pure, no I/O.
///
/// Every cluster seen in the assignment gets an entry even when none of its
/// contigs carry markers, so downstream lookups never miss. A contig absent
/// from the marker table contributes nothing; contigs literally named
/// `contig` are duplicated-header guards and are excluded.
pub fn aggregate_markers(
    assignment: &ClusterAssignment,
    profile: &MarkerProfile,
) -> ClusterMarkerTotals {
    let mut totals: ClusterMarkerTotals = AHashMap::new();

    for label in assignment.clusters() {
        totals.entry(label.clone()).or_default();
    }

    for (contig, label) in assignment.iter() {
        if contig == CONTIG_COLUMN {
            continue;
        }
        let counts = totals.entry(label.clone()).or_default();
        for (marker, copies) in profile.marker_counts(contig) {
            *counts.entry(marker.clone()).or_insert(0) += copies;
        }
    }

    totals
}

// src/lib.rs
pub mod assembly;
pub mod cluster_table;
pub mod error;
pub mod fasta;
pub mod markers;
pub mod scoring;
pub mod types;

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use log::info;

use crate::assembly::assess_assembly;
use crate::cluster_table::{aggregate_markers, read_cluster_table, ClusterMarkerTotals};
use crate::error::BinqcError;
use crate::fasta::{partition_sequences, render_fasta, ClusterSequenceSet};
use crate::markers::{read_marker_table, MarkerCounts};
use crate::scoring::{score_cluster, Kingdom};
use crate::types::ClusterSummaryRow;

/// Header of the summary table.
pub const SUMMARY_HEADER: &str =
    "cluster\tsize\tlongest_contig\tn50\tnumber_contigs\tcompleteness\tpurity";

/// Everything one assessment run produces. Output text is generated on
/// demand, so library callers can skip the filesystem entirely.
#[derive(Debug)]
pub struct AssessmentResults {
    /// One structured row per output cluster, in bucket order.
    pub summary_rows: Vec<ClusterSummaryRow>,

    /// The partitioned assembly (disjoint buckets, stream order kept).
    pub cluster_sequences: ClusterSequenceSet,

    /// Aggregated marker copy counts per assigned cluster.
    pub marker_totals: ClusterMarkerTotals,
}

impl AssessmentResults {
    /// Generate the summary table text on demand.
    pub fn summary_table_text(&self) -> String {
        let mut output = String::new();
        output.push_str(SUMMARY_HEADER);
        output.push('\n');
        for row in &self.summary_rows {
            let n50 = row
                .n50
                .map(|v| v.to_string())
                .unwrap_or_else(|| "NA".to_string());
            let purity = row
                .purity
                .map(|v| v.to_string())
                .unwrap_or_else(|| "NA".to_string());
            writeln!(
                output,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.cluster,
                row.size,
                row.largest_sequence,
                n50,
                row.number_sequences,
                row.completeness,
                purity
            )
            .unwrap();
        }
        output
    }

    /// Generate one bucket's FASTA text on demand.
    pub fn cluster_fasta_text(&self, label: &types::ClusterLabel) -> Option<String> {
        self.cluster_sequences.get(label).map(render_fasta)
    }

    /// Writes the summary table plus one FASTA file per bucket (the
    /// `unclaimed` bucket included) into `output_dir`, creating the
    /// directory if needed. Called only after a fully successful
    /// assessment, so a failing run leaves no partial output behind.
    pub fn write_outputs<P: AsRef<Path>>(&self, output_dir: P) -> Result<(), BinqcError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        fs::write(output_dir.join("summary_table"), self.summary_table_text())?;

        for (label, records) in self.cluster_sequences.iter() {
            let file_name = format!("cluster_{}.fasta", label);
            fs::write(output_dir.join(file_name), render_fasta(records))?;
        }
        Ok(())
    }
}

/// Unified entry point: reads both input tables, folds marker counts into
/// per-cluster totals, splits the assembly into per-cluster buckets, and
/// scores every bucket against the kingdom's expected marker set.
///
/// Nothing is written to disk here; render or persist the results
/// afterwards via [`AssessmentResults`].
pub fn assess_clusters(
    cluster_table_path: &Path,
    cluster_column: &str,
    marker_table_path: &Path,
    fasta_path: &Path,
    kingdom: Kingdom,
) -> Result<AssessmentResults, BinqcError> {
    // 1. Parse the two input tables. They are independent reads, so they
    //    may run in parallel.
    info!(
        "Reading cluster table {} and marker table {}",
        cluster_table_path.display(),
        marker_table_path.display()
    );
    let (assignment, profile) = rayon::join(
        || read_cluster_table(cluster_table_path, cluster_column),
        || read_marker_table(marker_table_path),
    );
    let assignment = assignment?;
    let profile = profile?;
    info!(
        "{} assigned contig(s) across {} cluster(s), marker hits for {} contig(s)",
        assignment.len(),
        assignment.clusters().len(),
        profile.len()
    );

    // 2. Fold marker counts into per-cluster totals
    let marker_totals = aggregate_markers(&assignment, &profile);

    // 3. Split the assembly into cluster buckets, one streaming pass
    let cluster_sequences = partition_sequences(fasta_path, &assignment)?;
    info!(
        "Partitioned assembly into {} bucket(s)",
        cluster_sequences.len()
    );

    // 4. Score each bucket. A bucket without table rows (the unclaimed
    //    one) scores against empty marker totals.
    let empty = MarkerCounts::new();
    let mut summary_rows = Vec::new();
    for (label, records) in cluster_sequences.iter() {
        let stats = assess_assembly(records);
        let totals = marker_totals.get(label).unwrap_or(&empty);
        let score = score_cluster(totals, kingdom);
        summary_rows.push(ClusterSummaryRow {
            cluster: label.clone(),
            size: stats.size,
            largest_sequence: stats.largest_sequence,
            n50: stats.n50,
            number_sequences: stats.number_sequences,
            completeness: score.completeness,
            purity: score.purity,
        });
    }

    Ok(AssessmentResults {
        summary_rows,
        cluster_sequences,
        marker_totals,
    })
}

//src/fasta.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::cluster_table::ClusterAssignment;
use crate::types::{ClusterLabel, SeqRecord};

/// Column width used when writing sequence lines.
const FASTA_LINE_WIDTH: usize = 60;

/// Per-cluster sequence buckets, in first-seen bucket order. The buckets
/// are a disjoint partition of the input assembly; within one bucket the
/// records keep their stream order.
#[derive(Debug, Default)]
pub struct ClusterSequenceSet {
    order: Vec<ClusterLabel>,
    buckets: AHashMap<ClusterLabel, Vec<SeqRecord>>,
}

impl ClusterSequenceSet {
    fn push(&mut self, label: ClusterLabel, record: SeqRecord) {
        let bucket = self.buckets.entry(label.clone()).or_insert_with(|| {
            self.order.push(label);
            Vec::new()
        });
        bucket.push(record);
    }

    pub fn get(&self, label: &ClusterLabel) -> Option<&[SeqRecord]> {
        self.buckets.get(label).map(|records| records.as_slice())
    }

    /// Buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClusterLabel, &[SeqRecord])> {
        self.order
            .iter()
            .map(|label| (label, self.buckets[label].as_slice()))
    }

    /// Number of buckets, not of sequences.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let f = File::open(&path)?;

    // If the file ends with ".gz", wrap it in a MultiGzDecoder
    let is_gz = path
        .as_ref()
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    Ok(if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    })
}

/// Minimal streaming FASTA reader that also supports .gz. Multi-line
/// sequences are concatenated; the record id is the header up to the first
/// whitespace, matching the contig ids the tables use.
fn stream_fasta<P, F>(path: P, mut sink: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnMut(SeqRecord),
{
    let reader = open_reader(path)?;

    let mut header: Option<String> = None;
    let mut seq = String::new();

    for line_result in reader.lines() {
        let line = line_result?;
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(done) = header.take() {
                sink(make_record(done, std::mem::take(&mut seq)));
            }
            header = Some(rest.trim_end().to_string());
        } else if header.is_some() {
            seq.push_str(line.trim_end());
        }
        // anything before the first header is ignored
    }
    if let Some(done) = header {
        sink(make_record(done, seq));
    }

    Ok(())
}

fn make_record(header_line: String, seq: String) -> SeqRecord {
    let id = header_line
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    SeqRecord {
        id,
        header_line,
        seq,
    }
}

/// Reads a whole FASTA file into memory.
pub fn read_fasta_records<P: AsRef<Path>>(path: P) -> io::Result<Vec<SeqRecord>> {
    let mut records = Vec::new();
    stream_fasta(path, |record| records.push(record))?;
    Ok(records)
}

/// Streams the assembly once, routing every record to its assigned
/// cluster's bucket or to the reserved `unclaimed` bucket.
pub fn partition_sequences<P: AsRef<Path>>(
    path: P,
    assignment: &ClusterAssignment,
) -> io::Result<ClusterSequenceSet> {
    let mut set = ClusterSequenceSet::default();
    stream_fasta(path, |record| {
        let label = assignment
            .label(&record.id)
            .cloned()
            .unwrap_or(ClusterLabel::Unclaimed);
        set.push(label, record);
    })?;
    Ok(set)
}

/// Renders records as FASTA text, wrapping sequence lines at 60 columns.
pub fn render_fasta(records: &[SeqRecord]) -> String {
    let mut output = String::new();
    for record in records {
        output.push('>');
        output.push_str(&record.header_line);
        output.push('\n');
        for chunk in record.seq.as_bytes().chunks(FASTA_LINE_WIDTH) {
            // sequences are ASCII; chunk boundaries cannot split a char
            output.push_str(std::str::from_utf8(chunk).unwrap_or_default());
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8], suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents).expect("write");
        file
    }

    #[test]
    fn parses_multi_line_records() {
        let file = write_temp(b">c1 length=7\nACGT\nACG\n>c2\nTTTT\n", ".fasta");
        let records = read_fasta_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "c1");
        assert_eq!(records[0].header_line, "c1 length=7");
        assert_eq!(records[0].seq, "ACGTACG");
        assert_eq!(records[1].seq, "TTTT");
    }

    #[test]
    fn gzipped_input_streams_identically() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">c1\nACGT\n>c2\nGG\n").unwrap();
        let gz = encoder.finish().unwrap();
        let file = write_temp(&gz, ".fasta.gz");

        let records = read_fasta_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seq, "ACGT");
        assert_eq!(records[1].seq, "GG");
    }

    #[test]
    fn partitions_into_assigned_and_unclaimed_buckets() {
        use crate::cluster_table::read_cluster_table;

        let table = write_temp(b"contig\tdb.cluster\nc1\t1\nc2\t2\n", ".tab");
        let assignment = read_cluster_table(table.path(), "db.cluster").unwrap();

        let fasta = write_temp(b">c1\nAA\n>c3\nCC\n>c2\nGG\n", ".fasta");
        let set = partition_sequences(fasta.path(), &assignment).unwrap();

        assert_eq!(set.len(), 3);
        let one = set.get(&ClusterLabel::Cluster("1".into())).unwrap();
        assert_eq!(one[0].id, "c1");
        let unclaimed = set.get(&ClusterLabel::Unclaimed).unwrap();
        assert_eq!(unclaimed.len(), 1);
        assert_eq!(unclaimed[0].id, "c3");

        // partition invariant: every input id lands in exactly one bucket
        let total: usize = set.iter().map(|(_, records)| records.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn buckets_preserve_stream_order() {
        use crate::cluster_table::read_cluster_table;

        let table = write_temp(b"contig\tdb.cluster\na\t1\nb\t1\nc\t1\n", ".tab");
        let assignment = read_cluster_table(table.path(), "db.cluster").unwrap();

        let fasta = write_temp(b">b\nAA\n>c\nCC\n>a\nGG\n", ".fasta");
        let set = partition_sequences(fasta.path(), &assignment).unwrap();
        let ids: Vec<&str> = set
            .get(&ClusterLabel::Cluster("1".into()))
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn render_wraps_at_sixty_columns() {
        let records = vec![SeqRecord {
            id: "c1".into(),
            header_line: "c1".into(),
            seq: "A".repeat(130),
        }];
        let text = render_fasta(&records);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ">c1");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
    }
}

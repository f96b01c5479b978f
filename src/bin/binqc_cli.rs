use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;

use binqc_rs::assess_clusters;
use binqc_rs::error::BinqcError;
use binqc_rs::scoring::Kingdom;

/// Assess the completeness and purity of clusters called on a metagenome
/// assembly, and split the assembly into one FASTA file per cluster.
#[derive(Parser, Debug)]
#[command(name = "binqc-rs", version, about)]
struct Args {
    /// Table containing the per-contig cluster assignment
    #[arg(short = 'd', long)]
    dbscantable: PathBuf,

    /// Cluster column name in the cluster table
    #[arg(short, long, default_value = "db.cluster")]
    column: String,

    /// Marker table with per-contig Pfam hits
    #[arg(short, long)]
    markertable: PathBuf,

    /// Contig FASTA file (.gz supported)
    #[arg(short, long)]
    fasta: PathBuf,

    /// Output directory for the summary table and cluster FASTA files
    #[arg(short, long)]
    output: PathBuf,

    /// Kingdom whose marker set to score against (bacteria|archaea)
    #[arg(short, long, default_value = "bacteria")]
    kingdom: String,
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{}}} {{msg}}", color))
            .expect("Invalid spinner template"),
    );
    spinner.set_message(msg.to_string());
    spinner
}

fn fail(err: BinqcError) -> ! {
    eprintln!("Error: {}", err);
    let code = match err {
        BinqcError::Schema(_) | BinqcError::Config(_) => 2,
        BinqcError::Io(_) => 1,
    };
    process::exit(code);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    // Kingdom is validated before any file is touched
    let kingdom: Kingdom = match args.kingdom.parse() {
        Ok(kingdom) => kingdom,
        Err(err) => fail(err),
    };

    // 1. Assess: tables in, scored buckets out
    let pb = spinner("green", "Assessing clusters...");
    let results = match assess_clusters(
        &args.dbscantable,
        &args.column,
        &args.markertable,
        &args.fasta,
        kingdom,
    ) {
        Ok(results) => results,
        Err(err) => {
            pb.finish_and_clear();
            fail(err);
        }
    };
    pb.finish_with_message(format!(
        "Assessed {} cluster bucket(s).",
        results.summary_rows.len()
    ));

    // 2. Write the summary table and per-cluster FASTA files
    let pb = spinner("yellow", "Writing output files...");
    if let Err(err) = results.write_outputs(&args.output) {
        pb.finish_and_clear();
        fail(err);
    }
    pb.finish_with_message(format!(
        "Output files created under {}.",
        args.output.display()
    ));
}

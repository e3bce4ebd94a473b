use clap::Parser;
use flate2::Compression;
use flate2::write::GzEncoder;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use somatic_mutation_summary::mutations::INPUT_COLUMNS;

const BASES: [&str; 4] = ["A", "C", "G", "T"];

/// Write a synthetic gzip-compressed simple somatic mutation file
#[derive(Debug, Parser)]
struct Args {
    /// Output path
    #[arg(default_value = "data/simple_somatic_mutation.synthetic.tsv.gz")]
    path: PathBuf,

    /// Number of data rows
    #[arg(short, long, default_value_t = 1_000_000)]
    rows: usize,

    /// Number of distinct samples
    #[arg(short, long, default_value_t = 200)]
    samples: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Some(dir) = args.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let file = File::create(&args.path)?;
    let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));

    // extra columns are ignored by the loader
    writeln!(writer, "{}\tchromosome", INPUT_COLUMNS.join("\t"))?;

    let mut rng = rand::rng();
    let samples = args.samples.max(1);
    for i in 0..args.rows {
        let mutation = rng.random_range(0..=i / 2 + 1);
        let transcript = rng.random_range(0..4);
        let sample = rng.random_range(0..samples);
        let from = BASES.choose(&mut rng).copied().unwrap_or("A");
        let to = BASES.choose(&mut rng).copied().unwrap_or("T");
        let chromosome = rng.random_range(1..=22);
        writeln!(
            writer,
            "MU{}\tENST{:011}\tSA{}\t{}\t{}\t{}",
            mutation, transcript, sample, from, to, chromosome
        )?;
    }

    writer.into_inner().map_err(|e| e.into_error())?.finish()?;
    println!("Synthetic mutation file generated: {}", args.path.display());
    Ok(())
}

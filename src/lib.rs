//! # somatic_mutation_summary
//!
//! Summaries of an ICGC simple somatic mutation export. The crate:
//!
//! - Loads a gzip-compressed TSV into an in-memory columnar table
//!   (one owned text buffer, columns of byte spans), selecting columns by name
//! - Derives a composite `unique_icgc_mutation_id` (`<mutation id>_<transcript>`)
//! - Counts distinct mutations per allele transition
//! - Finds the samples with the highest and lowest distinct mutation count
//! - Renders both reports as plain-text tables
//!
//! # Example
//!
//! ```rust,no_run
//! use somatic_mutation_summary::{mutations, report};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = Path::new("simple_somatic_mutation.open.BLCA-CN.tsv.gz");
//!
//!     let mut table = mutations::load_mutations(path)?;
//!     let derived = mutations::derive_unique_mutation_ids(&mut table)?;
//!
//!     let patterns = mutations::allele_pattern_counts(&derived)?;
//!     println!("{}", report::render_allele_patterns(&patterns));
//!
//!     let extremes = mutations::sample_extremes(&derived)?;
//!     println!("{}", report::render_sample_extremes(&extremes));
//!
//!     Ok(())
//! }
//! ```

pub mod mutations;
pub mod processor;
pub mod report;

pub use mutations::{
    AllelePatternCount, MutationSummary, SampleCount, SampleExtremes, summarize,
};
pub use processor::{AggregateOp, ProcessorError, mutation_table::MutationTable};

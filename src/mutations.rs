//! Somatic mutation summaries over an ICGC simple somatic mutation export.
//!
//! The pipeline is strictly forward:
//! [`load_mutations`] -> [`derive_unique_mutation_ids`] ->
//! {[`allele_pattern_counts`], [`sample_extremes`]}.

use std::path::Path;
use tracing::debug;

use crate::processor::{AggregateOp, ProcessorError, mutation_table::MutationTable};

pub const MUTATION_ID: &str = "icgc_mutation_id";
pub const TRANSCRIPT: &str = "transcript_affected";
pub const SAMPLE_ID: &str = "icgc_sample_id";
pub const FROM_ALLELE: &str = "mutated_from_allele";
pub const TO_ALLELE: &str = "mutated_to_allele";
pub const UNIQUE_MUTATION_ID: &str = "unique_icgc_mutation_id";

/// Columns read from the input file, in output order
pub const INPUT_COLUMNS: [&str; 5] = [MUTATION_ID, TRANSCRIPT, SAMPLE_ID, FROM_ALLELE, TO_ALLELE];

/// Columns kept after the composite key is derived
pub const DERIVED_COLUMNS: [&str; 4] = [UNIQUE_MUTATION_ID, SAMPLE_ID, FROM_ALLELE, TO_ALLELE];

/// Text a missing cell takes inside a composite key
pub const MISSING_TEXT: &str = "nan";

/// Distinct mutations observed for one allele transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllelePatternCount {
    pub from_allele: String,
    pub to_allele: String,
    pub unique_mutations: usize,
}

/// Distinct mutations observed in one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCount {
    pub sample_id: String,
    pub unique_mutations: usize,
}

/// The samples with the most and the fewest distinct mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleExtremes {
    pub highest: SampleCount,
    pub lowest: SampleCount,
}

impl SampleExtremes {
    pub const HIGHEST_LABEL: &'static str = "Highest";
    pub const LOWEST_LABEL: &'static str = "Lowest";

    /// Rows in display order, with their labels
    pub fn labeled(&self) -> [(&'static str, &SampleCount); 2] {
        [
            (Self::HIGHEST_LABEL, &self.highest),
            (Self::LOWEST_LABEL, &self.lowest),
        ]
    }
}

/// Both reports of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSummary {
    pub allele_patterns: Vec<AllelePatternCount>,
    pub extremes: SampleExtremes,
}

/// Loads the five mutation columns from a gzip-compressed TSV file.
///
/// A missing file prints a one-line diagnostic before the
/// [`ProcessorError::FileNotFound`] is returned to the caller.
pub fn load_mutations(path: &Path) -> Result<MutationTable, ProcessorError> {
    let mut table = MutationTable::new();
    match table.load_tsv_gz(path, &INPUT_COLUMNS) {
        Ok(summary) => {
            debug!(
                rows = summary.rows_processed,
                columns = summary.columns_seen,
                "loaded mutations"
            );
            Ok(table)
        }
        Err(ProcessorError::FileNotFound { path }) => {
            eprintln!("Error: The file {} was not found.", path.display());
            debug!(path = %path.display(), "input file not found");
            Err(ProcessorError::FileNotFound { path })
        }
        Err(e) => Err(e),
    }
}

/// Adds `unique_icgc_mutation_id` (`<mutation id>_<transcript>`) to `table`
/// and returns the four columns the aggregations work on.
///
/// A missing id or transcript is rendered as `nan` in the key.
pub fn derive_unique_mutation_ids(
    table: &mut MutationTable,
) -> Result<MutationTable, ProcessorError> {
    let keys: Vec<String> = table
        .column_values(MUTATION_ID)?
        .zip(table.column_values(TRANSCRIPT)?)
        .map(|(id, transcript)| {
            format!(
                "{}_{}",
                id.unwrap_or(MISSING_TEXT),
                transcript.unwrap_or(MISSING_TEXT)
            )
        })
        .collect();

    table.add_column(UNIQUE_MUTATION_ID, keys)?;
    table.select(&DERIVED_COLUMNS)
}

/// Distinct composite keys per (`mutated_from_allele`, `mutated_to_allele`),
/// ascending by allele pair. Empty input gives an empty vector.
pub fn allele_pattern_counts(
    table: &MutationTable,
) -> Result<Vec<AllelePatternCount>, ProcessorError> {
    let grouped = table.group_by(
        &[FROM_ALLELE, TO_ALLELE],
        UNIQUE_MUTATION_ID,
        AggregateOp::CountDistinct,
    )?;

    Ok(grouped
        .into_iter()
        .filter_map(|(key, count)| {
            let mut key = key.into_iter();
            Some(AllelePatternCount {
                from_allele: key.next()?,
                to_allele: key.next()?,
                unique_mutations: count,
            })
        })
        .collect())
}

/// Distinct composite keys per sample, ascending by sample id
pub fn sample_counts(table: &MutationTable) -> Result<Vec<SampleCount>, ProcessorError> {
    let grouped = table.group_by(&[SAMPLE_ID], UNIQUE_MUTATION_ID, AggregateOp::CountDistinct)?;

    Ok(grouped
        .into_iter()
        .filter_map(|(key, count)| {
            Some(SampleCount {
                sample_id: key.into_iter().next()?,
                unique_mutations: count,
            })
        })
        .collect())
}

/// Picks the samples with the highest and lowest distinct mutation count.
///
/// Ties go to the first sample in ascending sample-id order, independently
/// for the maximum and the minimum.
///
/// # Errors
/// [`ProcessorError::EmptyAggregation`] when there are no samples.
pub fn sample_extremes(table: &MutationTable) -> Result<SampleExtremes, ProcessorError> {
    let counts = sample_counts(table)?;
    extremes_of(counts)
}

fn extremes_of(counts: Vec<SampleCount>) -> Result<SampleExtremes, ProcessorError> {
    let mut iter = counts.into_iter();
    let first = iter.next().ok_or_else(|| ProcessorError::EmptyAggregation {
        column: SAMPLE_ID.to_string(),
    })?;

    let mut highest = first.clone();
    let mut lowest = first;
    for c in iter {
        // strict comparisons keep the first occurrence on ties
        if c.unique_mutations > highest.unique_mutations {
            highest = c.clone();
        }
        if c.unique_mutations < lowest.unique_mutations {
            lowest = c;
        }
    }

    Ok(SampleExtremes { highest, lowest })
}

/// Runs the whole pipeline on one file
pub fn summarize(path: &Path) -> Result<MutationSummary, ProcessorError> {
    let mut table = load_mutations(path)?;
    let derived = derive_unique_mutation_ids(&mut table)?;

    Ok(MutationSummary {
        allele_patterns: allele_pattern_counts(&derived)?,
        extremes: sample_extremes(&derived)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_from(tsv: &str, columns: &[&str]) -> MutationTable {
        let mut table = MutationTable::new();
        table.load_tsv_reader(tsv.as_bytes(), columns).unwrap();
        table
    }

    fn raw(rows: &[[&str; 5]]) -> MutationTable {
        let mut tsv = INPUT_COLUMNS.join("\t");
        tsv.push('\n');
        for row in rows {
            tsv.push_str(&row.join("\t"));
            tsv.push('\n');
        }
        table_from(&tsv, &INPUT_COLUMNS)
    }

    fn derived(rows: &[[&str; 5]]) -> MutationTable {
        derive_unique_mutation_ids(&mut raw(rows)).unwrap()
    }

    fn sample(id: &str, n: usize) -> SampleCount {
        SampleCount {
            sample_id: id.to_string(),
            unique_mutations: n,
        }
    }

    #[test]
    fn test_derive_builds_key_and_drops_sources() {
        let mut input = raw(&[
            ["id1", "trans1", "sample1", "A", "C"],
            ["id2", "trans2", "sample2", "T", "G"],
        ]);
        let out = derive_unique_mutation_ids(&mut input).unwrap();

        assert_eq!(out.headers(), &DERIVED_COLUMNS);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 0).unwrap(), Some("id1_trans1"));
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 1).unwrap(), Some("id2_trans2"));
        assert!(out.get_col(MUTATION_ID).is_err());
        assert!(out.get_col(TRANSCRIPT).is_err());

        // input keeps its source columns and gains the key
        assert!(input.get_col(MUTATION_ID).is_ok());
        assert_eq!(input.cell(UNIQUE_MUTATION_ID, 1).unwrap(), Some("id2_trans2"));
    }

    #[test]
    fn test_derive_keeps_text_and_renders_missing_as_nan() {
        let out = derived(&[["007", "", "s1", "A", "T"], ["", "1.50", "s1", "A", "T"]]);
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 0).unwrap(), Some("007_nan"));
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 1).unwrap(), Some("nan_1.50"));
    }

    #[test]
    fn test_derive_short_row_and_na_transcript() {
        let mut tsv = INPUT_COLUMNS.join("\t");
        tsv.push_str("\nm1\tNA\ts1\tA\tT\nm2\tt2\ts2\tC\n");
        let mut table = table_from(&tsv, &INPUT_COLUMNS);
        let out = derive_unique_mutation_ids(&mut table).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 0).unwrap(), Some("m1_nan"));
        assert_eq!(out.cell(UNIQUE_MUTATION_ID, 1).unwrap(), Some("m2_t2"));
        assert_eq!(out.cell(TO_ALLELE, 1).unwrap(), None);

        // the row without a to-allele drops out of the allele grouping
        let patterns = allele_pattern_counts(&out).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].from_allele, "A");
    }

    #[test]
    fn test_derive_requires_source_columns() {
        let mut table = table_from("icgc_mutation_id\tx\nm1\t1\n", &[]);
        let err = derive_unique_mutation_ids(&mut table).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(ref c) if c == TRANSCRIPT));
    }

    #[test]
    fn test_allele_patterns_count_distinct_keys() {
        let table = table_from(
            "unique_icgc_mutation_id\tmutated_from_allele\tmutated_to_allele\n\
             id1_trans1\tA\tC\nid1_trans1\tA\tC\nid2_trans2\tT\tG\n",
            &[],
        );
        let counts = allele_pattern_counts(&table).unwrap();
        assert_eq!(
            counts,
            vec![
                AllelePatternCount {
                    from_allele: "A".into(),
                    to_allele: "C".into(),
                    unique_mutations: 1,
                },
                AllelePatternCount {
                    from_allele: "T".into(),
                    to_allele: "G".into(),
                    unique_mutations: 1,
                },
            ]
        );
    }

    #[test]
    fn test_allele_patterns_sorted_by_pair() {
        let table = derived(&[
            ["m1", "t", "s", "G", "A"],
            ["m2", "t", "s", "A", "T"],
            ["m3", "t", "s", "A", "G"],
            ["m4", "t", "s", "A", "T"],
        ]);
        let pairs: Vec<(String, String, usize)> = allele_pattern_counts(&table)
            .unwrap()
            .into_iter()
            .map(|c| (c.from_allele, c.to_allele, c.unique_mutations))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".into(), "G".into(), 1),
                ("A".into(), "T".into(), 2),
                ("G".into(), "A".into(), 1),
            ]
        );
    }

    #[test]
    fn test_allele_patterns_empty_input() {
        let table = derived(&[]);
        assert!(allele_pattern_counts(&table).unwrap().is_empty());
    }

    #[test]
    fn test_sample_extremes_two_samples() {
        let table = table_from(
            "unique_icgc_mutation_id\ticgc_sample_id\n\
             id1_trans1\tsample1\nid1_trans2\tsample1\nid2_trans1\tsample2\n",
            &[],
        );
        let extremes = sample_extremes(&table).unwrap();
        assert_eq!(extremes.highest, sample("sample1", 2));
        assert_eq!(extremes.lowest, sample("sample2", 1));
    }

    #[test]
    fn test_sample_extremes_single_sample_is_both() {
        let table = derived(&[["m1", "t1", "s1", "A", "T"]]);
        let extremes = sample_extremes(&table).unwrap();
        assert_eq!(extremes.highest, sample("s1", 1));
        assert_eq!(extremes.lowest, sample("s1", 1));
    }

    #[test]
    fn test_sample_extremes_ties_take_first_sample_id() {
        let counts = vec![
            sample("a", 1),
            sample("b", 3),
            sample("c", 3),
            sample("d", 1),
        ];
        let extremes = extremes_of(counts).unwrap();
        assert_eq!(extremes.highest.sample_id, "b");
        assert_eq!(extremes.lowest.sample_id, "a");
    }

    #[test]
    fn test_sample_extremes_empty_is_error() {
        let table = derived(&[]);
        let err = sample_extremes(&table).unwrap_err();
        assert!(matches!(err, ProcessorError::EmptyAggregation { ref column } if column == SAMPLE_ID));
    }

    #[test]
    fn test_labeled_rows_order() {
        let extremes = SampleExtremes {
            highest: sample("s1", 2),
            lowest: sample("s2", 1),
        };
        let labels: Vec<&str> = extremes.labeled().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Highest", "Lowest"]);
    }
}

//! Plain-text rendering of the two summaries.
//!
//! Every column is as wide as its widest cell, cells are right-aligned and
//! columns are separated by one space. The optional row-label column is
//! left-aligned under a blank header.

use std::io::{self, Write};

use crate::mutations::{
    AllelePatternCount, FROM_ALLELE, MutationSummary, SAMPLE_ID, SampleExtremes, TO_ALLELE,
    UNIQUE_MUTATION_ID,
};

fn render_table(header: &[&str], rows: &[Vec<String>], labels: Option<&[&str]>) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let label_width = labels.map(|ls| ls.iter().map(|l| l.chars().count()).max().unwrap_or(0));

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut parts: Vec<String> = Vec::with_capacity(header.len() + 1);
    if let Some(lw) = label_width {
        parts.push(" ".repeat(lw));
    }
    for (h, w) in header.iter().zip(&widths) {
        parts.push(format!("{:>w$}", h, w = *w));
    }
    lines.push(parts.join(" "));

    for (i, row) in rows.iter().enumerate() {
        parts.clear();
        if let (Some(ls), Some(lw)) = (labels, label_width) {
            let label = ls.get(i).copied().unwrap_or("");
            parts.push(format!("{:<w$}", label, w = lw));
        }
        for (cell, w) in row.iter().zip(&widths) {
            parts.push(format!("{:>w$}", cell, w = *w));
        }
        lines.push(parts.join(" "));
    }

    lines.join("\n")
}

/// Allele-pattern summary without row labels
pub fn render_allele_patterns(counts: &[AllelePatternCount]) -> String {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| {
            vec![
                c.from_allele.clone(),
                c.to_allele.clone(),
                c.unique_mutations.to_string(),
            ]
        })
        .collect();
    render_table(&[FROM_ALLELE, TO_ALLELE, UNIQUE_MUTATION_ID], &rows, None)
}

/// Sample extremes with `Highest` / `Lowest` row labels
pub fn render_sample_extremes(extremes: &SampleExtremes) -> String {
    let labeled = extremes.labeled();
    let labels: Vec<&str> = labeled.iter().map(|(label, _)| *label).collect();
    let rows: Vec<Vec<String>> = labeled
        .iter()
        .map(|(_, s)| vec![s.sample_id.clone(), s.unique_mutations.to_string()])
        .collect();
    render_table(&[SAMPLE_ID, UNIQUE_MUTATION_ID], &rows, Some(labels.as_slice()))
}

/// Writes both reports separated by a blank line
pub fn write_reports<W: Write>(out: &mut W, summary: &MutationSummary) -> io::Result<()> {
    writeln!(out, "{}", render_allele_patterns(&summary.allele_patterns))?;
    writeln!(out)?;
    writeln!(out, "{}", render_sample_extremes(&summary.extremes))?;
    out.flush()
}

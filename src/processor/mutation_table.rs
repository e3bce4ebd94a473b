use flate2::read::MultiGzDecoder;
use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{self, Read},
    path::Path,
};
use tracing::debug;

use crate::processor::{
    AggregateOp, GroupedCounts, LoadSummary, ProcessorError, column::Column,
};

/// In-memory columnar table over tab-separated text
///
/// All cells live in one owned buffer; each column stores byte spans into it,
/// so row `i` of every column belongs to record `i`.
///
/// # Examples
///
/// ```rust
/// # use somatic_mutation_summary::processor::mutation_table::MutationTable;
/// let tsv = "sample\tallele\nS1\tA\nS2\tC\n";
/// let mut table = MutationTable::new();
/// table.load_tsv_reader(tsv.as_bytes(), &["allele"]).unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.cell("allele", 1).unwrap(), Some("C"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MutationTable {
    buffer: String,       // owns every cell's text
    columns: Vec<Column>, // parallel to `headers`
    row_count: usize,
    headers: Vec<String>,
}

impl MutationTable {
    /// Create an empty table
    pub fn new() -> Self {
        MutationTable {
            buffer: String::new(),
            columns: Vec::new(),
            row_count: 0,
            headers: Vec::new(),
        }
    }

    /// Loads a gzip-compressed TSV file, keeping only `columns`
    ///
    /// The file is memory-mapped and fully decompressed before parsing.
    /// Columns are matched by header name; an empty `columns` keeps all of them.
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - the path does not exist ([`ProcessorError::FileNotFound`])
    /// - the file cannot be read or is not valid gzip
    /// - the text is not UTF-8
    /// - a requested column is absent or a line has more fields than the header
    ///
    /// Short lines are padded with missing cells, and the tokens in
    /// [`NA_TOKENS`] are stored as missing.
    pub fn load_tsv_gz(
        &mut self,
        path: &Path,
        columns: &[&str],
    ) -> Result<LoadSummary, ProcessorError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProcessorError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ProcessorError::Io(e),
        })?;
        let mmap = unsafe { Mmap::map(&file)? };

        let mut bytes = Vec::with_capacity(mmap.len() * 4);
        MultiGzDecoder::new(&mmap[..]).read_to_end(&mut bytes)?;
        drop(mmap);

        debug!(path = %path.display(), bytes = bytes.len(), "decompressed input");
        let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        self.load_text(text, columns)
    }

    /// Loads already-decompressed TSV text from any reader
    pub fn load_tsv_reader<R: Read>(
        &mut self,
        mut reader: R,
        columns: &[&str],
    ) -> Result<LoadSummary, ProcessorError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        self.load_text(text, columns)
    }

    fn load_text(&mut self, buffer: String, wanted: &[&str]) -> Result<LoadSummary, ProcessorError> {
        let buf = buffer.as_bytes();
        if buf.is_empty() {
            return Err(ProcessorError::Parse("Missing header line".into()));
        }

        // Parse header
        let header_end = memchr(b'\n', buf).unwrap_or(buf.len());
        let header_line = trim_cr(&buffer[..header_end]);
        let all_headers: Vec<&str> = header_line.split('\t').collect();

        let selected: Vec<(usize, String)> = if wanted.is_empty() {
            all_headers
                .iter()
                .enumerate()
                .map(|(i, h)| (i, h.to_string()))
                .collect()
        } else {
            wanted
                .iter()
                .map(|name| {
                    all_headers
                        .iter()
                        .position(|h| h == name)
                        .map(|i| (i, name.to_string()))
                        .ok_or_else(|| ProcessorError::MissingColumn(name.to_string()))
                })
                .collect::<Result<_, _>>()?
        };

        let num_fields = all_headers.len();
        let data_start = (header_end + 1).min(buf.len());
        let estimated_rows = (buf.len() - data_start) / (header_line.len() + 1) + 1;

        let mut columns: Vec<Column> = selected
            .iter()
            .map(|_| Column::with_capacity(estimated_rows))
            .collect();
        let mut fields: Vec<(usize, usize)> = Vec::with_capacity(num_fields);
        let mut row_count = 0;
        let mut line_no = 1;

        // Iterate lines, including a final line without a newline
        let mut start = data_start;
        let ends = memchr_iter(b'\n', &buf[data_start..])
            .map(|p| p + data_start)
            .chain(std::iter::once(buf.len()));
        for end in ends {
            if start > end {
                break;
            }
            let mut line_end = end;
            if line_end > start && buf[line_end - 1] == b'\r' {
                line_end -= 1;
            }
            let line = &buf[start..line_end];
            let line_start = start;
            start = end + 1;
            line_no += 1;

            if line.is_empty() {
                continue;
            }

            // Split line into fields (absolute offsets)
            fields.clear();
            let mut field_start = 0;
            for tab_pos in memchr_iter(b'\t', line) {
                fields.push((line_start + field_start, line_start + tab_pos));
                field_start = tab_pos + 1;
            }
            fields.push((line_start + field_start, line_start + line.len()));

            if fields.len() > num_fields {
                return Err(ProcessorError::Malformed {
                    line: line_no,
                    expected: num_fields,
                    found: fields.len(),
                });
            }
            // absent trailing fields are missing cells
            let line_end_abs = line_start + line.len();
            fields.resize(num_fields, (line_end_abs, line_end_abs));

            for (col, (src_idx, _)) in columns.iter_mut().zip(&selected) {
                let (s, e) = fields[*src_idx];
                if is_na_token(&buffer[s..e]) {
                    col.push(s, s);
                } else {
                    col.push(s, e);
                }
            }
            row_count += 1;
        }

        debug!(rows = row_count, columns = selected.len(), "parsed table");

        self.buffer = buffer;
        self.columns = columns;
        self.headers = selected.into_iter().map(|(_, name)| name).collect();
        self.row_count = row_count;

        Ok(LoadSummary {
            rows_processed: row_count,
            columns_seen: num_fields,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn get_col(&self, col_name: &str) -> Result<&Column, ProcessorError> {
        let col_pos = self
            .headers
            .iter()
            .position(|cn| cn == col_name)
            .ok_or_else(|| ProcessorError::MissingColumn(col_name.to_string()))?;

        self.columns
            .get(col_pos)
            .ok_or_else(|| ProcessorError::MissingColumn(col_name.to_string()))
    }

    /// Value at `row` of `column`; `Ok(None)` for a missing cell
    pub fn cell(&self, column: &str, row: usize) -> Result<Option<&str>, ProcessorError> {
        Ok(self.get_col(column)?.get(&self.buffer, row))
    }

    /// All values of a column in row order
    pub fn column_values(
        &self,
        column: &str,
    ) -> Result<impl Iterator<Item = Option<&str>> + '_, ProcessorError> {
        let col = self.get_col(column)?;
        Ok((0..self.row_count).map(move |row| col.get(&self.buffer, row)))
    }

    /// Adds (or replaces) a column; an empty string is stored as a missing cell.
    ///
    /// # Errors
    /// [`ProcessorError::Parse`] if the number of values differs from `row_count`.
    pub fn add_column<I, S>(&mut self, name: &str, values: I) -> Result<(), ProcessorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rollback = self.buffer.len();
        let mut col = Column::with_capacity(self.row_count);
        for value in values {
            let start = self.buffer.len();
            self.buffer.push_str(value.as_ref());
            col.push(start, self.buffer.len());
        }

        if col.len() != self.row_count {
            self.buffer.truncate(rollback);
            return Err(ProcessorError::Parse(format!(
                "Column '{}' has {} values, table has {} rows",
                name,
                col.len(),
                self.row_count
            )));
        }

        match self.headers.iter().position(|h| h == name) {
            Some(pos) => self.columns[pos] = col,
            None => {
                self.headers.push(name.to_string());
                self.columns.push(col);
            }
        }
        Ok(())
    }

    /// Projection into a new, compact table with the columns in the given order
    pub fn select(&self, names: &[&str]) -> Result<MutationTable, ProcessorError> {
        let cols = names
            .iter()
            .map(|name| self.get_col(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = MutationTable {
            buffer: String::new(),
            columns: names
                .iter()
                .map(|_| Column::with_capacity(self.row_count))
                .collect(),
            row_count: self.row_count,
            headers: names.iter().map(|n| n.to_string()).collect(),
        };

        for row in 0..self.row_count {
            for (src, dst) in cols.iter().zip(out.columns.iter_mut()) {
                let start = out.buffer.len();
                if let Some(v) = src.get(&self.buffer, row) {
                    out.buffer.push_str(v);
                }
                dst.push(start, out.buffer.len());
            }
        }

        Ok(out)
    }

    /// Groups row indices by the values of `keys`, in ascending key order
    ///
    /// Rows with a missing value in any key column are left out.
    pub fn group_rows(
        &self,
        keys: &[&str],
    ) -> Result<BTreeMap<Vec<&str>, Vec<usize>>, ProcessorError> {
        let key_cols = keys
            .iter()
            .map(|k| self.get_col(k))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups: BTreeMap<Vec<&str>, Vec<usize>> = BTreeMap::new();
        'rows: for row in 0..self.row_count {
            let mut key = Vec::with_capacity(key_cols.len());
            for col in &key_cols {
                match col.get(&self.buffer, row) {
                    Some(v) => key.push(v),
                    None => continue 'rows,
                }
            }
            groups.entry(key).or_default().push(row);
        }

        Ok(groups)
    }

    /// Group-by aggregation of `value_col`, ordered by key
    ///
    /// # Example
    /// ```rust
    /// # use somatic_mutation_summary::processor::{AggregateOp, mutation_table::MutationTable};
    /// let mut table = MutationTable::new();
    /// table.load_tsv_reader("s\tm\nS1\tx\nS1\tx\nS2\ty\n".as_bytes(), &[]).unwrap();
    /// let counts = table.group_by(&["s"], "m", AggregateOp::CountDistinct).unwrap();
    /// assert_eq!(counts[0], (vec!["S1".to_string()], 1));
    /// ```
    pub fn group_by(
        &self,
        keys: &[&str],
        value_col: &str,
        op: AggregateOp,
    ) -> Result<GroupedCounts, ProcessorError> {
        let vcol = self.get_col(value_col)?;
        let groups = self.group_rows(keys)?;

        let mut out = Vec::with_capacity(groups.len());
        for (key, rows) in groups {
            let count = match op {
                AggregateOp::Count => rows.len(),
                AggregateOp::CountDistinct => rows
                    .iter()
                    .filter_map(|&row| vcol.get(&self.buffer, row))
                    .collect::<HashSet<&str>>()
                    .len(),
            };
            out.push((key.into_iter().map(str::to_string).collect(), count));
        }

        Ok(out)
    }
}

/// Field texts read as missing values, besides the empty field
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na_token(field: &str) -> bool {
    NA_TOKENS.contains(&field)
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// A text column: byte spans into the owning table's buffer.
///
/// An empty span is a missing value (empty field, NA token or absent trailing field).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    spans: Vec<(usize, usize)>,
}

impl Column {
    pub fn new() -> Self {
        Column { spans: Vec::new() }
    }

    pub fn with_capacity(rows: usize) -> Self {
        Column {
            spans: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, start: usize, end: usize) {
        self.spans.push((start, end));
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    // Random access
    pub fn span(&self, row: usize) -> Option<(usize, usize)> {
        self.spans.get(row).copied()
    }

    /// Resolves row `row` against `buffer`; `None` when missing or out of range.
    pub fn get<'a>(&self, buffer: &'a str, row: usize) -> Option<&'a str> {
        let (start, end) = self.span(row)?;
        if start == end {
            return None;
        }
        buffer.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_span_is_missing() {
        let buffer = "A\tT";
        let mut col = Column::new();
        col.push(0, 1);
        col.push(2, 2);
        col.push(2, 3);
        assert_eq!(col.len(), 3);
        assert_eq!(col.get(buffer, 0), Some("A"));
        assert_eq!(col.get(buffer, 1), None);
        assert_eq!(col.get(buffer, 2), Some("T"));
        assert_eq!(col.get(buffer, 3), None);
    }
}

/// Variable-length rows stored back to back; row `i` spans
/// `values[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ragged<T> {
    offsets: Vec<usize>,
    values: Vec<T>,
}

impl<T: Copy> Ragged<T> {
    pub(crate) fn new() -> Self {
        Self {
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    /// Appends a row and returns its index.
    pub(crate) fn push_row<I: IntoIterator<Item = T>>(&mut self, row: I) -> usize {
        self.values.extend(row);
        self.offsets.push(self.values.len());
        self.offsets.len() - 2
    }

    pub(crate) fn row(&self, index: usize) -> &[T] {
        &self.values[self.offsets[index]..self.offsets[index + 1]]
    }

    pub(crate) fn row_len(&self, index: usize) -> usize {
        self.offsets[index + 1] - self.offsets[index]
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len() - 1
    }
}

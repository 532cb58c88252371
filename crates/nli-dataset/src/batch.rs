use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::vocab::PAD_ID;

/// Row-major `rows x cols` matrix of ids, padded with [`PAD_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![PAD_ID as i64; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[i64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row * self.cols + col] = value;
    }

    /// Writes `values` at the start of `row`, leaving the rest padded.
    fn fill_row(&mut self, row: usize, values: &[u32]) {
        let start = row * self.cols;
        for (slot, &value) in self.data[start..start + values.len()].iter_mut().zip(values) {
            *slot = value as i64;
        }
    }
}

/// Everything a model needs for one step, with sentences and charseqs
/// deduplicated within the batch.
///
/// Shapes, for `E` essays, `S` distinct sentences and `C` distinct charseqs:
/// - `essay_lens`: `[E]`, `sentence_ids`: `[E x max essay len]` (batch-local ids)
/// - `sentence_lens`: `[S]`; `word_ids`, `tags`, `charseq_ids`: `[S x max sentence len]`
/// - `charseqs`: `[C x max charseq len]`, `charseq_lens`: `[C]`
/// - `levels`, `prompts`, `languages`: `[E]`, languages are `-1` when withheld
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub essay_lens: Vec<i64>,
    pub sentence_ids: Matrix,
    pub sentence_lens: Vec<i64>,
    pub word_ids: Matrix,
    pub tags: Matrix,
    pub charseq_ids: Matrix,
    pub charseqs: Matrix,
    pub charseq_lens: Vec<i64>,
    pub levels: Vec<i64>,
    pub prompts: Vec<i64>,
    pub languages: Vec<i64>,
}

impl Batch {
    pub fn essays(&self) -> usize {
        self.essay_lens.len()
    }
}

/// Compact ids for the global ids referenced by one batch, in first-occurrence order.
#[derive(Default)]
struct BatchRemap {
    local: HashMap<u32, u32>,
    globals: Vec<u32>,
}

impl BatchRemap {
    fn local_id(&mut self, global: u32) -> i64 {
        let next = self.globals.len() as u32;
        let id = *self.local.entry(global).or_insert(next);
        if id == next {
            self.globals.push(global);
        }
        id as i64
    }
}

impl Dataset {
    /// Assembles the essays at `indices`, in that order.
    pub fn batch(&self, indices: &[usize]) -> Result<Batch> {
        if indices.is_empty() {
            return Err(DatasetError::EmptyBatch);
        }
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(DatasetError::EssayOutOfRange { index, len });
        }

        let essay_lens: Vec<usize> = indices.iter().map(|&e| self.essays.row_len(e)).collect();
        let max_essay_len = essay_lens.iter().copied().max().unwrap_or(0);

        let mut sentences = BatchRemap::default();
        let mut sentence_ids = Matrix::zeros(indices.len(), max_essay_len);
        for (row, &essay) in indices.iter().enumerate() {
            for (col, &sentence) in self.essays.row(essay).iter().enumerate() {
                sentence_ids.set(row, col, sentences.local_id(sentence));
            }
        }

        let sentence_lens: Vec<usize> = sentences
            .globals
            .iter()
            .map(|&s| self.words.row_len(s as usize))
            .collect();
        let max_sentence_len = sentence_lens.iter().copied().max().unwrap_or(0);

        let distinct = sentences.globals.len();
        let mut word_ids = Matrix::zeros(distinct, max_sentence_len);
        let mut tags = Matrix::zeros(distinct, max_sentence_len);
        let mut charseq_ids = Matrix::zeros(distinct, max_sentence_len);
        let mut charseqs = BatchRemap::default();
        for (row, &sentence) in sentences.globals.iter().enumerate() {
            let sentence = sentence as usize;
            word_ids.fill_row(row, self.words.row(sentence));
            tags.fill_row(row, self.tags.row(sentence));
            for (col, &charseq) in self.word_charseqs.row(sentence).iter().enumerate() {
                charseq_ids.set(row, col, charseqs.local_id(charseq));
            }
        }

        let charseq_lens: Vec<usize> = charseqs
            .globals
            .iter()
            .map(|&c| self.charseqs.row_len(c as usize))
            .collect();
        let max_charseq_len = charseq_lens.iter().copied().max().unwrap_or(0);
        let mut charseq_matrix = Matrix::zeros(charseqs.globals.len(), max_charseq_len);
        for (row, &charseq) in charseqs.globals.iter().enumerate() {
            charseq_matrix.fill_row(row, self.charseqs.row(charseq as usize));
        }

        debug!(
            "Assembled batch: {} essays, {} sentences, {} charseqs",
            indices.len(),
            distinct,
            charseqs.globals.len()
        );

        Ok(Batch {
            essay_lens: to_i64(&essay_lens),
            sentence_ids,
            sentence_lens: to_i64(&sentence_lens),
            word_ids,
            tags,
            charseq_ids,
            charseqs: charseq_matrix,
            charseq_lens: to_i64(&charseq_lens),
            levels: indices.iter().map(|&e| self.levels[e] as i64).collect(),
            prompts: indices.iter().map(|&e| self.prompts[e] as i64).collect(),
            languages: indices
                .iter()
                .map(|&e| self.languages[e].map_or(-1, |id| id as i64))
                .collect(),
        })
    }

    /// The whole dataset in input order.
    pub fn whole_data_as_batch(&self) -> Result<Batch> {
        let indices: Vec<usize> = (0..self.len()).collect();
        self.batch(&indices)
    }

    /// Assembles the next `batch_size` essays (fewer at the end) of the
    /// current epoch's permutation.
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Batch> {
        if batch_size == 0 {
            return Err(DatasetError::EmptyBatch);
        }
        let indices = self.scheduler.take(batch_size);
        self.batch(&indices)
    }

    /// See [`crate::EpochScheduler::epoch_finished`].
    pub fn epoch_finished(&mut self) -> bool {
        self.scheduler.epoch_finished()
    }

    /// Essays left in the current epoch.
    pub fn remaining(&self) -> usize {
        self.scheduler.remaining()
    }
}

fn to_i64(values: &[usize]) -> Vec<i64> {
    values.iter().map(|&v| v as i64).collect()
}

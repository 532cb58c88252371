use tch::{Device, Tensor};

use crate::batch::{Batch, Matrix};

/// A [`Batch`] as int64 tensors on one device.
#[derive(Debug)]
pub struct BatchTensors {
    pub essay_lens: Tensor,
    pub sentence_ids: Tensor,
    pub sentence_lens: Tensor,
    pub word_ids: Tensor,
    pub tags: Tensor,
    pub charseq_ids: Tensor,
    pub charseqs: Tensor,
    pub charseq_lens: Tensor,
    pub levels: Tensor,
    pub prompts: Tensor,
    pub languages: Tensor,
}

impl Batch {
    pub fn to_tensors(&self, device: Device) -> BatchTensors {
        BatchTensors {
            essay_lens: vector(&self.essay_lens, device),
            sentence_ids: matrix(&self.sentence_ids, device),
            sentence_lens: vector(&self.sentence_lens, device),
            word_ids: matrix(&self.word_ids, device),
            tags: matrix(&self.tags, device),
            charseq_ids: matrix(&self.charseq_ids, device),
            charseqs: matrix(&self.charseqs, device),
            charseq_lens: vector(&self.charseq_lens, device),
            levels: vector(&self.levels, device),
            prompts: vector(&self.prompts, device),
            languages: vector(&self.languages, device),
        }
    }
}

fn vector(values: &[i64], device: Device) -> Tensor {
    Tensor::from_slice(values).to(device)
}

fn matrix(values: &Matrix, device: Device) -> Tensor {
    Tensor::from_slice(values.as_slice())
        .view([values.rows() as i64, values.cols() as i64])
        .to(device)
}

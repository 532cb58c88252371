pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
mod ragged;
pub mod scheduler;
#[cfg(feature = "tch")]
pub mod tensors;
pub mod vocab;

pub use batch::{Batch, Matrix};
pub use config::DatasetOptions;
pub use dataset::{Dataset, VocabSource};
pub use error::DatasetError;
pub use scheduler::EpochScheduler;
#[cfg(feature = "tch")]
pub use tensors::BatchTensors;
pub use vocab::{Feature, Vocab, VocabRegistry};

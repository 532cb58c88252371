use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    /// Wrap every character sequence in `<bow>` / `<eow>`.
    pub add_bow_eow: bool,
    /// Withhold language labels; batches carry `-1` instead.
    pub no_languages: bool,
    /// Seed of the epoch permutation.
    pub seed: u64,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            add_bow_eow: false,
            no_languages: false,
            seed: 42,
        }
    }
}

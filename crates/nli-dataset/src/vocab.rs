use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use crate::error::{DatasetError, Result};

pub const PAD: &str = "<pad>";
pub const UNK: &str = "<unk>";
pub const BOW: &str = "<bow>";
pub const EOW: &str = "<eow>";
/// End of sentence for words and tags, end of essay for sentences.
pub const EOS: &str = "\n";

/// Id of `<pad>` in every feature that reserves it. Batches pad with this value.
pub const PAD_ID: u32 = 0;

/// The linguistic levels a dataset keeps a vocabulary for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Chars,
    Words,
    Sentences,
    Tags,
    Languages,
    Levels,
    Prompts,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Chars,
        Feature::Words,
        Feature::Sentences,
        Feature::Tags,
        Feature::Languages,
        Feature::Levels,
        Feature::Prompts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Chars => "chars",
            Feature::Words => "words",
            Feature::Sentences => "sentences",
            Feature::Tags => "tags",
            Feature::Languages => "languages",
            Feature::Levels => "levels",
            Feature::Prompts => "prompts",
        }
    }

    /// Tokens seeded at ids `0..n` before any ingestion.
    pub fn reserved(self) -> &'static [&'static str] {
        match self {
            Feature::Chars => &[PAD, UNK, BOW, EOW],
            Feature::Words | Feature::Tags => &[PAD, UNK, EOS],
            Feature::Sentences => &[PAD, EOS],
            Feature::Languages | Feature::Levels | Feature::Prompts => &[],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| DatasetError::UnknownFeature(s.to_string()))
    }
}

/// Token <-> id mapping with ids assigned in insertion order.
///
/// Serialized as the plain token list, index = id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocab {
    id_to_token: Vec<String>,
    token_to_id: HashMap<String, u32>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved(tokens: &[&str]) -> Self {
        let mut vocab = Self::new();
        for token in tokens {
            vocab.insert(token);
        }
        vocab
    }

    /// Returns the id of `token`, appending it with the next id if unseen.
    pub fn insert(&mut self, token: &str) -> u32 {
        if let Some(id) = self.get_id(token) {
            return id;
        }
        let id = self.id_to_token.len() as u32;
        self.id_to_token.push(token.to_string());
        self.token_to_id.insert(token.to_string(), id);
        id
    }

    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.id_to_token
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }
}

impl From<Vec<String>> for Vocab {
    fn from(tokens: Vec<String>) -> Self {
        let mut vocab = Self::new();
        for token in &tokens {
            vocab.insert(token);
        }
        vocab
    }
}

impl From<Vocab> for Vec<String> {
    fn from(vocab: Vocab) -> Self {
        vocab.id_to_token
    }
}

/// One vocabulary per [`Feature`], growing until frozen.
///
/// A frozen registry maps unseen chars, words and tags to `<unk>` and rejects
/// unseen labels. Sentences keep growing in either mode since they belong to
/// the dataset that ingests them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SavedRegistry")]
pub struct VocabRegistry {
    vocabs: BTreeMap<Feature, Vocab>,
    #[serde(skip)]
    frozen: bool,
}

/// On-disk form; features missing from it are seeded with their reserved tokens.
#[derive(Deserialize)]
struct SavedRegistry {
    vocabs: BTreeMap<Feature, Vocab>,
}

impl From<SavedRegistry> for VocabRegistry {
    fn from(saved: SavedRegistry) -> Self {
        let mut registry = Self {
            vocabs: saved.vocabs,
            frozen: false,
        };
        for feature in Feature::ALL {
            registry.vocab_mut(feature);
        }
        registry
    }
}

impl VocabRegistry {
    pub fn new() -> Self {
        let vocabs = Feature::ALL
            .into_iter()
            .map(|feature| (feature, Vocab::with_reserved(feature.reserved())))
            .collect();
        Self {
            vocabs,
            frozen: false,
        }
    }

    /// Copy of this registry for another dataset split: frozen, with an empty
    /// sentence vocabulary.
    pub fn frozen_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.vocabs.insert(
            Feature::Sentences,
            Vocab::with_reserved(Feature::Sentences.reserved()),
        );
        copy.frozen = true;
        copy
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn get_or_add(&mut self, feature: Feature, token: &str) -> Result<u32> {
        let frozen = self.frozen && feature != Feature::Sentences;
        let vocab = self.vocab_mut(feature);
        if !frozen {
            return Ok(vocab.insert(token));
        }
        if let Some(id) = vocab.get_id(token) {
            return Ok(id);
        }
        match vocab.get_id(UNK) {
            Some(unk) => Ok(unk),
            None => Err(DatasetError::UnknownLabel {
                feature: feature.name(),
                token: token.to_string(),
            }),
        }
    }

    pub fn get_id(&self, feature: Feature, token: &str) -> Option<u32> {
        self.vocab(feature).get_id(token)
    }

    pub fn tokens(&self, feature: Feature) -> &[String] {
        self.vocab(feature).tokens()
    }

    pub fn size(&self, feature: Feature) -> usize {
        self.vocab(feature).len()
    }

    pub fn vocab(&self, feature: Feature) -> &Vocab {
        // Every construction path seeds all features.
        &self.vocabs[&feature]
    }

    fn vocab_mut(&mut self, feature: Feature) -> &mut Vocab {
        self.vocabs
            .entry(feature)
            .or_insert_with(|| Vocab::with_reserved(feature.reserved()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Loads a saved registry. The result is unfrozen; use
    /// [`VocabRegistry::frozen_copy`] to reuse it for another split.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for VocabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

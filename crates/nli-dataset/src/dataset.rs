use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::DatasetOptions;
use crate::error::{DatasetError, Result};
use crate::ragged::Ragged;
use crate::scheduler::EpochScheduler;
use crate::vocab::{Feature, Vocab, VocabRegistry, BOW, EOS, EOW};

/// Sentences inside an essay are separated by a period token tagged as a period.
const SENTENCE_SEPARATOR: &str = ". .";

/// Where a dataset's vocabularies come from.
#[derive(Debug, Clone, Copy)]
pub enum VocabSource<'a> {
    /// Start from the reserved tokens and grow.
    Fresh,
    /// Seed the word vocabulary with pretrained embedding words, then grow.
    Pretrained(&'a [String]),
    /// Reuse a registry (usually the training split's) without growing it.
    Frozen(&'a VocabRegistry),
}

/// An NLI essay collection: one labelled essay per input line, with sentences,
/// words and character sequences deduplicated into index tables.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub(crate) registry: VocabRegistry,
    /// essay -> sentence ids
    pub(crate) essays: Ragged<u32>,
    /// sentence id -> word ids, with parallel tag and charseq rows
    pub(crate) words: Ragged<u32>,
    pub(crate) tags: Ragged<u32>,
    pub(crate) word_charseqs: Ragged<u32>,
    /// charseq id -> char ids
    pub(crate) charseqs: Ragged<u32>,
    charseq_index: HashMap<String, u32>,
    pub(crate) levels: Vec<u32>,
    pub(crate) prompts: Vec<u32>,
    pub(crate) languages: Vec<Option<u32>>,
    pub(crate) scheduler: EpochScheduler,
    add_bow_eow: bool,
    no_languages: bool,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(
        path: P,
        options: &DatasetOptions,
        source: VocabSource<'_>,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), options, source)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        options: &DatasetOptions,
        source: VocabSource<'_>,
    ) -> Result<Self> {
        let registry = match source {
            VocabSource::Fresh => VocabRegistry::new(),
            VocabSource::Pretrained(words) => {
                let mut registry = VocabRegistry::new();
                for word in words {
                    registry.get_or_add(Feature::Words, word)?;
                }
                registry
            }
            VocabSource::Frozen(registry) => registry.frozen_copy(),
        };

        let mut dataset = Self::empty(registry, options);
        for (i, line) in reader.split(b'\n').enumerate() {
            let line = String::from_utf8(line?).map_err(|err| DatasetError::Parse {
                line: i + 1,
                message: format!("invalid UTF-8: {err}"),
            })?;
            dataset.ingest_line(&line, i + 1)?;
        }
        dataset.scheduler = EpochScheduler::new(dataset.len(), options.seed);

        info!(
            "Loaded {} essays, {} sentences, {} charseqs (words: {}, chars: {}, tags: {})",
            dataset.len(),
            dataset.words.len(),
            dataset.charseqs.len(),
            dataset.registry.size(Feature::Words),
            dataset.registry.size(Feature::Chars),
            dataset.registry.size(Feature::Tags),
        );
        Ok(dataset)
    }

    fn empty(registry: VocabRegistry, options: &DatasetOptions) -> Self {
        let mut dataset = Self {
            registry,
            essays: Ragged::new(),
            words: Ragged::new(),
            tags: Ragged::new(),
            word_charseqs: Ragged::new(),
            charseqs: Ragged::new(),
            charseq_index: HashMap::new(),
            levels: Vec::new(),
            prompts: Vec::new(),
            languages: Vec::new(),
            scheduler: EpochScheduler::new(0, options.seed),
            add_bow_eow: options.add_bow_eow,
            no_languages: options.no_languages,
        };
        // Reserved sentences (<pad>, end of essay) own no words.
        for _ in Feature::Sentences.reserved() {
            dataset.push_sentence(Vec::new(), Vec::new(), Vec::new());
        }
        dataset
    }

    fn ingest_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.splitn(4, '\t');
        let (language, prompt, level, text) =
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(language), Some(prompt), Some(level), Some(text)) => {
                    (language, prompt, level, text)
                }
                _ => {
                    return Err(DatasetError::Parse {
                        line: line_no,
                        message: "expected language, prompt, level and text separated by tabs"
                            .to_string(),
                    })
                }
            };

        // Withheld languages are still registered while the vocabulary grows.
        let language = if self.no_languages {
            if !self.registry.is_frozen() {
                self.registry.get_or_add(Feature::Languages, language)?;
            }
            None
        } else {
            Some(self.registry.get_or_add(Feature::Languages, language)?)
        };
        let level = self.registry.get_or_add(Feature::Levels, level)?;
        let prompt = self.registry.get_or_add(Feature::Prompts, prompt)?;

        let mut sentence_ids = Vec::new();
        for segment in text.trim_matches('\t').split(SENTENCE_SEPARATOR) {
            if Feature::Sentences.reserved().contains(&segment) {
                return Err(DatasetError::Parse {
                    line: line_no,
                    message: format!("sentence {segment:?} is a reserved token"),
                });
            }
            let sentence = if segment.is_empty() { EOS } else { segment };
            let id = self.registry.get_or_add(Feature::Sentences, sentence)?;
            if id as usize == self.words.len() {
                self.ingest_sentence(sentence, line_no)?;
            }
            sentence_ids.push(id);
        }

        self.essays.push_row(sentence_ids);
        self.languages.push(language);
        self.levels.push(level);
        self.prompts.push(prompt);
        Ok(())
    }

    fn ingest_sentence(&mut self, sentence: &str, line_no: usize) -> Result<()> {
        let mut words = Vec::new();
        let mut tags = Vec::new();
        let mut charseqs = Vec::new();

        for token in sentence.split('\t') {
            let (word, tag) = if token.is_empty() {
                (EOS, EOS)
            } else {
                match token.split_once(' ') {
                    Some((word, tag)) if !tag.contains(' ') => (word, tag),
                    _ => {
                        return Err(DatasetError::Parse {
                            line: line_no,
                            message: format!("expected `word tag`, found {token:?}"),
                        })
                    }
                }
            };

            charseqs.push(self.charseq_id(word)?);
            words.push(self.registry.get_or_add(Feature::Words, word)?);
            tags.push(self.registry.get_or_add(Feature::Tags, tag)?);
        }

        self.push_sentence(words, tags, charseqs);
        Ok(())
    }

    fn push_sentence(&mut self, words: Vec<u32>, tags: Vec<u32>, charseqs: Vec<u32>) {
        self.words.push_row(words);
        self.tags.push_row(tags);
        self.word_charseqs.push_row(charseqs);
    }

    fn charseq_id(&mut self, word: &str) -> Result<u32> {
        if let Some(&id) = self.charseq_index.get(word) {
            return Ok(id);
        }

        let mut chars = Vec::with_capacity(word.len() + 2);
        if self.add_bow_eow {
            chars.push(self.registry.get_or_add(Feature::Chars, BOW)?);
        }
        let mut buf = [0u8; 4];
        for c in word.chars() {
            chars.push(self.registry.get_or_add(Feature::Chars, c.encode_utf8(&mut buf))?);
        }
        if self.add_bow_eow {
            chars.push(self.registry.get_or_add(Feature::Chars, EOW)?);
        }

        let id = self.charseqs.push_row(chars) as u32;
        self.charseq_index.insert(word.to_string(), id);
        Ok(id)
    }

    /// Number of essays.
    pub fn len(&self) -> usize {
        self.essays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.essays.len() == 0
    }

    pub fn registry(&self) -> &VocabRegistry {
        &self.registry
    }

    /// Tokens of `feature`, index = id.
    pub fn vocabulary(&self, feature: Feature) -> &[String] {
        self.registry.tokens(feature)
    }

    pub fn vocabulary_map(&self, feature: Feature) -> &Vocab {
        self.registry.vocab(feature)
    }

    /// Sentence count of every essay.
    pub fn essay_lens(&self) -> Vec<usize> {
        (0..self.essays.len()).map(|e| self.essays.row_len(e)).collect()
    }

    /// Word count of every sentence id, reserved sentences included.
    pub fn sentence_lens(&self) -> Vec<usize> {
        (0..self.words.len()).map(|s| self.words.row_len(s)).collect()
    }

    pub fn essay_sentences(&self, essay: usize) -> &[u32] {
        self.essays.row(essay)
    }

    pub fn sentence_words(&self, sentence: u32) -> &[u32] {
        self.words.row(sentence as usize)
    }

    pub fn sentence_tags(&self, sentence: u32) -> &[u32] {
        self.tags.row(sentence as usize)
    }

    pub fn sentence_charseqs(&self, sentence: u32) -> &[u32] {
        self.word_charseqs.row(sentence as usize)
    }

    pub fn charseq(&self, charseq: u32) -> &[u32] {
        self.charseqs.row(charseq as usize)
    }

    pub fn charseq_count(&self) -> usize {
        self.charseqs.len()
    }

    pub fn level(&self, essay: usize) -> u32 {
        self.levels[essay]
    }

    pub fn prompt(&self, essay: usize) -> u32 {
        self.prompts[essay]
    }

    pub fn language(&self, essay: usize) -> Option<u32> {
        self.languages[essay]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::UNK;
    use std::io::Cursor;

    fn load(text: &str) -> Result<Dataset> {
        Dataset::from_reader(Cursor::new(text), &DatasetOptions::default(), VocabSource::Fresh)
    }

    #[test]
    fn test_labels_are_registered_in_order() {
        let dataset =
            load("ITA\tP1\tlow\tcat NN\nDEU\tP2\tlow\tdog NN\nITA\tP1\thigh\tcow NN\n").unwrap();
        assert_eq!(dataset.vocabulary(Feature::Languages), ["ITA", "DEU"]);
        assert_eq!(dataset.vocabulary(Feature::Levels), ["low", "high"]);
        assert_eq!(dataset.language(2), Some(0));
        assert_eq!(dataset.level(2), 1);
        assert_eq!(dataset.prompt(1), 1);
    }

    #[test]
    fn test_sentences_split_on_period_token() {
        let dataset = load("ITA\tP1\tlow\tthe DT\tcat NN\t. .\ta DT\tdog NN\n").unwrap();
        assert_eq!(dataset.essay_lens(), vec![2]);

        let sentences = dataset.essay_sentences(0);
        // "the DT\tcat NN\t" ends with an empty token, the end-of-sentence word.
        let first = dataset.sentence_words(sentences[0]);
        assert_eq!(first.len(), 3);
        assert_eq!(dataset.vocabulary(Feature::Words)[first[2] as usize], EOS);
        // "\ta DT\tdog NN" starts with one.
        let second = dataset.sentence_words(sentences[1]);
        assert_eq!(dataset.vocabulary(Feature::Words)[second[0] as usize], EOS);
        assert_eq!(dataset.vocabulary(Feature::Words)[second[1] as usize], "a");
    }

    #[test]
    fn test_empty_segment_is_end_of_essay_sentence() {
        let dataset = load("ITA\tP1\tlow\tcat NN\t. .\n").unwrap();
        let sentences = dataset.essay_sentences(0);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1], 1);
        assert!(dataset.sentence_words(1).is_empty());
        assert_eq!(dataset.vocabulary(Feature::Sentences)[1], EOS);
    }

    #[test]
    fn test_identical_sentences_share_an_id() {
        let dataset =
            load("ITA\tP1\tlow\tcat NN\nDEU\tP1\tlow\tdog NN\nFRA\tP2\thigh\tcat NN\n").unwrap();
        assert_eq!(dataset.essay_sentences(0), dataset.essay_sentences(2));
        assert_ne!(dataset.essay_sentences(0), dataset.essay_sentences(1));
        assert_eq!(dataset.vocabulary(Feature::Sentences).len(), 4);
    }

    #[test]
    fn test_surface_forms_share_charseqs() {
        let dataset = load("ITA\tP1\tlow\tcat NN\tcat VB\tcow NN\n").unwrap();
        let charseqs = dataset.sentence_charseqs(dataset.essay_sentences(0)[0]);
        assert_eq!(charseqs[0], charseqs[1]);
        assert_ne!(charseqs[0], charseqs[2]);
        assert_eq!(dataset.charseq_count(), 2);

        let chars: Vec<&str> = dataset
            .charseq(charseqs[0])
            .iter()
            .map(|&c| dataset.vocabulary(Feature::Chars)[c as usize].as_str())
            .collect();
        assert_eq!(chars, ["c", "a", "t"]);
    }

    #[test]
    fn test_bow_eow_wraps_charseqs() {
        let options = DatasetOptions {
            add_bow_eow: true,
            ..DatasetOptions::default()
        };
        let dataset =
            Dataset::from_reader(Cursor::new("ITA\tP1\tlow\tab NN\n"), &options, VocabSource::Fresh)
                .unwrap();
        assert_eq!(dataset.charseq(0), &[2, 4, 5, 3]);
    }

    #[test]
    fn test_no_languages_withholds_labels() {
        let options = DatasetOptions {
            no_languages: true,
            ..DatasetOptions::default()
        };
        let dataset = Dataset::from_reader(
            Cursor::new("ITA\tP1\tlow\tcat NN\n"),
            &options,
            VocabSource::Fresh,
        )
        .unwrap();
        assert_eq!(dataset.language(0), None);
        assert_eq!(dataset.vocabulary(Feature::Languages), ["ITA"]);
    }

    #[test]
    fn test_pretrained_words_come_first() {
        let pretrained = vec!["the".to_string(), "dog".to_string()];
        let dataset = Dataset::from_reader(
            Cursor::new("ITA\tP1\tlow\tcat NN\tdog NN\n"),
            &DatasetOptions::default(),
            VocabSource::Pretrained(&pretrained),
        )
        .unwrap();
        assert_eq!(dataset.vocabulary(Feature::Words), ["<pad>", UNK, EOS, "the", "dog", "cat"]);
    }

    #[test]
    fn test_missing_fields_is_a_parse_error() {
        match load("ITA\tP1\tlow\tcat NN\nITA\tP1\n") {
            Err(DatasetError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_token_is_a_parse_error() {
        assert!(matches!(
            load("ITA\tP1\tlow\tcat NN extra\n"),
            Err(DatasetError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            load("ITA\tP1\tlow\tcat\n"),
            Err(DatasetError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_reserved_sentence_text_is_a_parse_error() {
        assert!(matches!(
            load("ITA\tP1\tlow\t<pad>\n"),
            Err(DatasetError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            load("ITA\tP1\tlow\tcat NN\nITA\tP1\tlow\t. .<pad>\n"),
            Err(DatasetError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let bytes = b"ITA\tP1\tlow\tcat NN\nITA\tP1\tlow\tc\xff\xfet NN\n";
        let result = Dataset::from_reader(
            Cursor::new(&bytes[..]),
            &DatasetOptions::default(),
            VocabSource::Fresh,
        );
        assert!(matches!(result, Err(DatasetError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_crlf_line_endings() {
        let dataset = load("ITA\tP1\tlow\tcat NN\r\n").unwrap();
        assert_eq!(dataset.vocabulary(Feature::Tags)[3], "NN");
    }
}

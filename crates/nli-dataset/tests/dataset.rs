use std::collections::HashSet;
use std::io::Cursor;

use nli_dataset::vocab::UNK;
use nli_dataset::{Batch, Dataset, DatasetError, DatasetOptions, Feature, Matrix, VocabSource};

const TRAIN: &str = "\
ITA\tP1\tlow\tThe DT\tcat NN\tsat VBD\t. .\tIt PRP\tpurred VBD\t. .
DEU\tP2\tmedium\tcat NN\t. .\tThe DT\tdog NN\tbarked VBD
FRA\tP1\thigh\tcat NN\t. .
ITA\tP3\tmedium\tDogs NNS\tbark VBP\t. .\tcat NN\t. .\tcats NNS
DEU\tP2\tlow\tThe DT\tcat NN\tsat VBD\t. .
";

fn load(text: &str) -> Dataset {
    Dataset::from_reader(Cursor::new(text), &DatasetOptions::default(), VocabSource::Fresh)
        .expect("toy dataset should load")
}

/// Every entry at or past `lens[row]` must be the pad id.
fn assert_padded(matrix: &Matrix, lens: &[i64]) {
    assert_eq!(matrix.rows(), lens.len());
    for (row, &len) in lens.iter().enumerate() {
        assert!(matrix.row(row)[len as usize..].iter().all(|&id| id == 0));
    }
}

fn assert_batch_padding(batch: &Batch) {
    assert_padded(&batch.sentence_ids, &batch.essay_lens);
    assert_padded(&batch.word_ids, &batch.sentence_lens);
    assert_padded(&batch.tags, &batch.sentence_lens);
    assert_padded(&batch.charseq_ids, &batch.sentence_lens);
    assert_padded(&batch.charseqs, &batch.charseq_lens);
}

#[test]
fn test_vocabulary_round_trip() {
    let dataset = load(TRAIN);
    let registry = dataset.registry();
    for feature in [Feature::Words, Feature::Tags, Feature::Chars, Feature::Prompts] {
        for (id, token) in registry.tokens(feature).iter().enumerate() {
            assert_eq!(registry.get_id(feature, token), Some(id as u32));
        }
    }
    assert_eq!(registry.tokens(Feature::Tags)[3], "DT");
}

#[test]
fn test_essay_lens_match_parsed_sentences() {
    let dataset = load(TRAIN);
    assert_eq!(dataset.essay_lens(), vec![3, 2, 2, 3, 2]);

    let batch = dataset.whole_data_as_batch().unwrap();
    assert_eq!(batch.essay_lens, vec![3, 2, 2, 3, 2]);
    assert_eq!(batch.sentence_ids.shape(), (5, 3));
}

#[test]
fn test_whole_data_is_idempotent() {
    let dataset = load(TRAIN);
    let first = dataset.whole_data_as_batch().unwrap();
    let second = dataset.whole_data_as_batch().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_padding_is_zero_past_true_lengths() {
    let mut dataset = load(TRAIN);
    assert_batch_padding(&dataset.whole_data_as_batch().unwrap());
    while !dataset.epoch_finished() {
        assert_batch_padding(&dataset.next_batch(2).unwrap());
    }
}

#[test]
fn test_identical_sentences_share_one_row() {
    let dataset = load(
        "ITA\tP1\tlow\tcat NN\n\
         DEU\tP1\tlow\tdog NN\n\
         FRA\tP2\thigh\tcat NN\n",
    );
    assert_eq!(dataset.essay_sentences(0), dataset.essay_sentences(2));

    let batch = dataset.whole_data_as_batch().unwrap();
    assert_eq!(batch.sentence_ids.get(0, 0), batch.sentence_ids.get(2, 0));
    assert_eq!(batch.word_ids.rows(), 2);
    assert_eq!(batch.tags.rows(), 2);
}

#[test]
fn test_labels_follow_the_selection() {
    let dataset = load(TRAIN);
    let batch = dataset.batch(&[3, 0]).unwrap();

    let languages = dataset.vocabulary(Feature::Languages);
    let prompts = dataset.vocabulary(Feature::Prompts);
    assert_eq!(languages[batch.languages[0] as usize], "ITA");
    assert_eq!(prompts[batch.prompts[0] as usize], "P3");
    assert_eq!(prompts[batch.prompts[1] as usize], "P1");
    assert_eq!(dataset.vocabulary(Feature::Levels)[batch.levels[0] as usize], "medium");
}

#[test]
fn test_batches_of_two_over_five_essays() {
    let mut dataset = load(TRAIN);
    let mut seen = Vec::new();
    let mut sizes = Vec::new();

    while !dataset.epoch_finished() {
        let before = dataset.remaining();
        let batch = dataset.next_batch(2).unwrap();
        sizes.push(batch.essays());
        seen.push(before);
    }
    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(seen, vec![5, 3, 1]);
    assert_eq!(dataset.remaining(), 5);
}

#[test]
fn test_epoch_covers_every_essay_once() {
    let text: String = (0..23)
        .map(|i| format!("L{}\tP{}\tlow\tword{} NN\n", i % 3, i % 2, i))
        .collect();
    let mut dataset = load(&text);
    let batch_size = 4;

    for _ in 0..2 {
        let mut levels_seen = 0;
        let mut covered = HashSet::new();
        let mut calls = 0;
        while !dataset.epoch_finished() {
            let batch = dataset.next_batch(batch_size).unwrap();
            levels_seen += batch.levels.len();
            // Each essay holds a unique single-word sentence, so its word id
            // identifies the essay.
            for row in 0..batch.word_ids.rows() {
                assert!(covered.insert(batch.word_ids.get(row, 0)));
            }
            calls += 1;
        }
        assert_eq!(calls, (23 + batch_size - 1) / batch_size);
        assert_eq!(levels_seen, 23);
        assert_eq!(covered.len(), 23);
    }
}

#[test]
fn test_same_seed_same_traversal() {
    let mut a = load(TRAIN);
    let mut b = load(TRAIN);
    while !a.epoch_finished() {
        assert_eq!(a.next_batch(2).unwrap(), b.next_batch(2).unwrap());
    }
}

#[test]
fn test_dev_split_reuses_frozen_vocabulary() {
    let train = load(TRAIN);
    let words_before = train.vocabulary(Feature::Words).len();

    let dev = Dataset::from_reader(
        Cursor::new("DEU\tP1\tlow\tThe DT\tzebra NN\tsat VBZ\n"),
        &DatasetOptions::default(),
        VocabSource::Frozen(train.registry()),
    )
    .unwrap();

    let words = dev.sentence_words(dev.essay_sentences(0)[0]);
    let unk = train.registry().get_id(Feature::Words, UNK).unwrap();
    assert_eq!(words[1], unk);
    assert_eq!(words[0], train.registry().get_id(Feature::Words, "The").unwrap());
    assert_eq!(dev.vocabulary(Feature::Words).len(), words_before);
    assert_eq!(train.vocabulary(Feature::Words).len(), words_before);

    let tags = dev.sentence_tags(dev.essay_sentences(0)[0]);
    assert_eq!(tags[2], train.registry().get_id(Feature::Tags, UNK).unwrap());

    // Unseen characters fall back to <unk> as well.
    let zebra = dev.sentence_charseqs(dev.essay_sentences(0)[0])[1];
    let z = dev.charseq(zebra)[0];
    assert_eq!(dev.vocabulary(Feature::Chars)[z as usize], UNK);
}

#[test]
fn test_dev_split_rejects_unseen_labels() {
    let train = load(TRAIN);
    let result = Dataset::from_reader(
        Cursor::new("ITA\tP9\tlow\tcat NN\n"),
        &DatasetOptions::default(),
        VocabSource::Frozen(train.registry()),
    );
    assert!(matches!(
        result,
        Err(DatasetError::UnknownLabel { feature: "prompts", .. })
    ));
}

#[test]
fn test_test_split_withholds_languages() {
    let train = load(TRAIN);
    let options = DatasetOptions {
        no_languages: true,
        ..DatasetOptions::default()
    };
    let test = Dataset::from_reader(
        Cursor::new("???\tP2\tlow\tcat NN\n"),
        &options,
        VocabSource::Frozen(train.registry()),
    )
    .unwrap();

    let batch = test.whole_data_as_batch().unwrap();
    assert_eq!(batch.languages, vec![-1]);
}

#[test]
fn test_load_from_file_and_saved_vocabulary() {
    let dir = std::env::temp_dir().join(format!("nli-dataset-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let data_path = dir.join("train.txt");
    let vocab_path = dir.join("vocab.json");
    std::fs::write(&data_path, TRAIN).unwrap();

    let train = Dataset::load(&data_path, &DatasetOptions::default(), VocabSource::Fresh).unwrap();
    train.registry().save(&vocab_path).unwrap();
    let registry = nli_dataset::VocabRegistry::load(&vocab_path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let dev = Dataset::from_reader(
        Cursor::new("FRA\tP1\tlow\tcat NN\n"),
        &DatasetOptions::default(),
        VocabSource::Frozen(&registry),
    )
    .unwrap();
    assert_eq!(
        dev.sentence_words(dev.essay_sentences(0)[0]),
        &[train.registry().get_id(Feature::Words, "cat").unwrap()]
    );
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = Dataset::load(
        "/nonexistent/nli-train.txt",
        &DatasetOptions::default(),
        VocabSource::Fresh,
    );
    assert!(matches!(result, Err(DatasetError::Io(_))));
}

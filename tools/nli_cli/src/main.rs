use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use nli_dataset::{Dataset, DatasetOptions, Feature, VocabRegistry, VocabSource};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with dataset options (add_bow_eow, no_languages, seed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print essay counts and vocabulary sizes of the dataset splits
    Stats {
        /// Training split; its vocabulary is reused by the other splits
        #[arg(long)]
        train: PathBuf,

        /// Development split
        #[arg(long)]
        dev: Option<PathBuf>,

        /// Test split, loaded with languages withheld
        #[arg(long)]
        test: Option<PathBuf>,

        /// Pretrained embeddings; the first field of every line is a word
        #[arg(long)]
        pretrained: Option<PathBuf>,
    },
    /// Save the training vocabulary or print one feature of it
    Vocab {
        #[arg(long)]
        train: PathBuf,

        /// Where to write the vocabulary as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Feature to print (chars, words, sentences, tags, languages, levels, prompts)
        #[arg(short, long)]
        feature: Option<String>,
    },
    /// Walk shuffled epochs the way a training loop would
    Epochs {
        #[arg(long)]
        train: PathBuf,

        /// Reuse a saved vocabulary instead of building one
        #[arg(long)]
        vocab: Option<PathBuf>,

        #[arg(short, long, default_value_t = 100)]
        batch_size: usize,

        #[arg(short, long, default_value_t = 10)]
        epochs: usize,
    },
    /// Print the batch for the given essays as JSON
    Batch {
        #[arg(long)]
        train: PathBuf,

        /// Essay indices (comma separated); the whole split when omitted
        #[arg(long)]
        essays: Option<String>,
    },
}

fn load_options(path: Option<&Path>) -> Result<DatasetOptions> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            serde_yaml::from_str(&content).context("Failed to parse dataset config")
        }
        None => Ok(DatasetOptions::default()),
    }
}

fn load_pretrained(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pretrained embeddings {:?}", path))?;
    Ok(content
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}

fn load(path: &Path, options: &DatasetOptions, source: VocabSource<'_>) -> Result<Dataset> {
    info!("Loading {:?}", path);
    Dataset::load(path, options, source).with_context(|| format!("Failed to load {:?}", path))
}

fn print_stats(name: &str, dataset: &Dataset) {
    println!("{}: {} essays", name, dataset.len());
    for feature in Feature::ALL {
        println!("  {:<10} {}", feature.name(), dataset.vocabulary(feature).len());
    }
}

fn parse_indices(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(|s| {
            s.trim()
                .parse()
                .with_context(|| format!("Invalid essay index {:?}", s))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats {
            train,
            dev,
            test,
            pretrained,
        } => {
            let pretrained = pretrained.as_deref().map(load_pretrained).transpose()?;
            let source = match &pretrained {
                Some(words) => VocabSource::Pretrained(words),
                None => VocabSource::Fresh,
            };
            let train = load(&train, &options, source)?;
            print_stats("train", &train);

            if let Some(dev) = dev {
                let dev = load(&dev, &options, VocabSource::Frozen(train.registry()))?;
                print_stats("dev", &dev);
            }
            if let Some(test) = test {
                let test_options = DatasetOptions {
                    no_languages: true,
                    ..options.clone()
                };
                let test = load(&test, &test_options, VocabSource::Frozen(train.registry()))?;
                print_stats("test", &test);
            }
        }
        Commands::Vocab {
            train,
            output,
            feature,
        } => {
            let train = load(&train, &options, VocabSource::Fresh)?;
            if let Some(output) = output {
                train
                    .registry()
                    .save(&output)
                    .context("Failed to save vocabulary")?;
                println!("Saved vocabulary to {:?}", output);
            }
            if let Some(feature) = feature {
                let feature: Feature = feature.parse()?;
                for (id, token) in train.vocabulary(feature).iter().enumerate() {
                    println!("{}\t{:?}", id, token);
                }
            }
        }
        Commands::Epochs {
            train,
            vocab,
            batch_size,
            epochs,
        } => {
            let registry = vocab
                .map(|path| VocabRegistry::load(&path).context("Failed to load vocabulary"))
                .transpose()?;
            let source = match &registry {
                Some(registry) => VocabSource::Frozen(registry),
                None => VocabSource::Fresh,
            };
            let mut train = load(&train, &options, source)?;

            for epoch in 0..epochs {
                let mut batches = 0;
                let mut sentences = 0;
                while !train.epoch_finished() {
                    let batch = train.next_batch(batch_size)?;
                    batches += 1;
                    sentences += batch.sentence_lens.len();
                    info!(
                        "Epoch {} | Batch {} | essays {} | sentence ids {:?} | words {:?} | charseqs {:?}",
                        epoch + 1,
                        batches,
                        batch.essays(),
                        batch.sentence_ids.shape(),
                        batch.word_ids.shape(),
                        batch.charseqs.shape()
                    );
                }
                println!(
                    "Epoch {}: {} batches, {} distinct sentences per batch on average",
                    epoch + 1,
                    batches,
                    sentences / batches.max(1)
                );
            }
        }
        Commands::Batch { train, essays } => {
            let train = load(&train, &options, VocabSource::Fresh)?;
            let batch = match essays {
                Some(list) => train.batch(&parse_indices(&list)?)?,
                None => train.whole_data_as_batch()?,
            };
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
    }

    Ok(())
}

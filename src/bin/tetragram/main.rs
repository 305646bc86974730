//! Tetragram CLI: train a model from text, generate from a trained model, or
//! inspect a saved model's statistics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::PathBuf;
use tetragram::{Model, ModelConfig};

#[derive(Debug, Parser)]
#[command(name = "tetragram")]
#[command(about = "4th-order character-level Markov text model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a fresh model from a text file and save it
    Train(TrainArgs),
    /// Generate text from a saved model
    Generate(GenerateArgs),
    /// Print statistics about a saved model
    Stats(StatsArgs),
}

#[derive(Debug, Parser)]
struct TrainArgs {
    /// Path to the UTF-8 text corpus to train on
    input: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, default_value = "model.tetra")]
    output: PathBuf,

    /// log2 of the hash table's bucket count
    #[arg(long, default_value_t = tetragram::DEFAULT_BUCKET_BITS)]
    bucket_bits: u32,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Path to a saved model
    model: PathBuf,

    /// Maximum number of code points to generate
    #[arg(short, long, default_value_t = 200)]
    max_chars: usize,

    /// Seed for the generator's PRNG
    #[arg(short, long)]
    seed: Option<u32>,

    /// log2 of the bucket count to rehash the loaded model into
    #[arg(long, default_value_t = tetragram::DEFAULT_BUCKET_BITS)]
    bucket_bits: u32,

    /// Number of independent samples to print
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
}

#[derive(Debug, Parser)]
struct StatsArgs {
    /// Path to a saved model
    model: PathBuf,

    /// log2 of the bucket count to rehash the loaded model into
    #[arg(long, default_value_t = tetragram::DEFAULT_BUCKET_BITS)]
    bucket_bits: u32,
}

fn install_logger() {
    let default_level = if std::env::var("TETRAGRAM_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<()> {
    install_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => train(args),
        Command::Generate(args) => generate(args),
        Command::Stats(args) => stats(args),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let mut text = String::new();
    File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .read_to_string(&mut text)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut model = Model::new(ModelConfig::default().with_bucket_bits(args.bucket_bits))?;
    model.train_str(&text)?;

    let mut out = BufWriter::new(
        File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?,
    );
    model.save(&mut out)?;

    eprintln!(
        "trained {} rules from {} bytes, wrote {}",
        model.rule_count(),
        text.len(),
        args.output.display()
    );
    Ok(())
}

fn load_model(path: &PathBuf, bucket_bits: u32) -> Result<Model> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    );
    Model::load(reader, bucket_bits).with_context(|| format!("loading {}", path.display()))
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = ModelConfig::default().with_bucket_bits(args.bucket_bits);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let reader = BufReader::new(
        File::open(&args.model).with_context(|| format!("opening {}", args.model.display()))?,
    );
    let mut model = Model::load_with_config(reader, config)
        .with_context(|| format!("loading {}", args.model.display()))?;

    for _ in 0..args.count {
        println!("{}", model.generate(args.max_chars));
    }
    Ok(())
}

fn stats(args: StatsArgs) -> Result<()> {
    let model = load_model(&args.model, args.bucket_bits)?;
    println!("rules:        {}", model.rule_count());
    println!("buckets:      {}", model.bucket_count());
    println!("bucket_bits:  {}", model.bucket_bits());
    println!("heap bytes:   {}", model.heap_size());
    Ok(())
}

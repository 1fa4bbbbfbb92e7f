// src/main.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pain_dataset::config::{default_cache_dir, ALLOWED_CMP_DIMS, MNIST_SIDE};
use pain_dataset::data::MnistCsv;
use pain_dataset::{
    repr_gray_image, side_by_side, CacheState, CompressionFactor, DatasetCache, SynthConfig,
    Synthesizer,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
struct Cli {
    /// Directory holding the cached noisy datasets.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Args)]
struct Source {
    /// MNIST training csv (label,p0,...,p783 with a header line).
    train: PathBuf,
    /// MNIST test csv.
    test: PathBuf,
    /// Number of training images to use.
    #[arg(long, default_value_t = 60000)]
    num_train: usize,
    /// Number of test images to use.
    #[arg(long, default_value_t = 10000)]
    num_test: usize,
    /// Side length of the compressed images: 4, 7, 14 or 28.
    #[arg(short, long, default_value_t = 7)]
    cmp_dim: usize,
    /// Seed for the poisson sampler.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate (or load from cache) the noisy dataset.
    Generate {
        #[command(flatten)]
        source: Source,
    },

    /// Render a noisy test sample next to its clean source.
    Show {
        #[command(flatten)]
        source: Source,
        /// Index into the test split.
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Show which compression factors are cached.
    Status {},

    /// Delete the cache for a compression factor.
    Clear {
        #[arg(short, long)]
        cmp_dim: usize,
    },
}

struct Loaded {
    synth: Synthesizer,
    train: Vec<pain_dataset::Image>,
    test: Vec<pain_dataset::Image>,
    dataset: pain_dataset::NoisyDataset,
}

fn load(source: &Source, cache_dir: PathBuf) -> anyhow::Result<Loaded> {
    let config = SynthConfig::new(source.cmp_dim, MNIST_SIDE, source.seed, cache_dir)?;
    let mnist = MnistCsv::new(&source.train, &source.test);
    let train = mnist
        .train_images(0, source.num_train)
        .context("failed to read training images")?;
    let test = mnist
        .test_images(0, source.num_test)
        .context("failed to read test images")?;
    let synth = Synthesizer::new(config);
    let dataset = synth
        .load_or_generate(&train, &test)
        .context("failed to build noisy dataset")?;
    Ok(Loaded {
        synth,
        train,
        test,
        dataset,
    })
}

fn generate(source: &Source, cache_dir: PathBuf) -> anyhow::Result<()> {
    let loaded = load(source, cache_dir)?;
    let clean_train = loaded.synth.clean_targets(&loaded.train)?;
    let clean_test = loaded.synth.clean_targets(&loaded.test)?;
    println!("noisy_train {:?}", loaded.dataset.noisy_train.shape());
    println!("noisy_test  {:?}", loaded.dataset.noisy_test.shape());
    println!("clean_train {:?}", clean_train.shape());
    println!("clean_test  {:?}", clean_test.shape());
    Ok(())
}

fn show(source: &Source, index: usize, cache_dir: PathBuf) -> anyhow::Result<()> {
    let loaded = load(source, cache_dir)?;
    let noisy = &loaded.dataset.noisy_test;
    anyhow::ensure!(
        index < noisy.rows(),
        "index {index} is out of range for {} test samples",
        noisy.rows()
    );
    let d = loaded.synth.config().cmp_dim.cmp_dim();
    let scaled: Vec<f32> = noisy.row(index).iter().map(|x| x * 255.0).collect();
    let clean = &loaded.test[index];
    println!("label={:?}", clean.label());
    println!(
        "{}",
        side_by_side(
            &repr_gray_image(clean.pixels(), clean.side()),
            &repr_gray_image(&scaled, d),
            4
        )
    );
    Ok(())
}

fn status(cache: &DatasetCache) -> anyhow::Result<()> {
    tracing::info!("Using cache directory {}", cache.dir().display());
    for d in ALLOWED_CMP_DIMS {
        let factor = CompressionFactor::new(d, MNIST_SIDE)?;
        match cache.state(&factor) {
            CacheState::Present(path) => println!("{factor}\tcached\t{}", path.display()),
            CacheState::Absent => println!("{factor}\tabsent"),
        }
    }
    Ok(())
}

fn clear(cache: &DatasetCache, cmp_dim: usize) -> anyhow::Result<()> {
    let factor = CompressionFactor::new(cmp_dim, MNIST_SIDE)?;
    if cache.remove(&factor)? {
        println!("Removed cache for {factor}");
    } else {
        println!("No cache for {factor}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let cache_dir = cli.cache_dir.unwrap_or_else(default_cache_dir);
    let cache = DatasetCache::new(&cache_dir);
    match &cli.command {
        Some(Commands::Generate { source }) => generate(source, cache_dir)?,
        Some(Commands::Show { source, index }) => show(source, *index, cache_dir)?,
        Some(Commands::Status {}) => status(&cache)?,
        Some(Commands::Clear { cmp_dim }) => clear(&cache, *cmp_dim)?,
        None => {}
    }
    tracing::debug!("All done");
    Ok(())
}

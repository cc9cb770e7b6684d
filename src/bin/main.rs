//! digitclf command line interface
//!
//! Runs the logistic regression / SVM comparison on a digit dataset and
//! inspects datasets and sweep settings.

use clap::{Args, Parser, Subcommand, ValueEnum};
use digitclf::config::RunConfig;
use digitclf::core::Result;
use digitclf::data::DatasetFormat;
use digitclf::pipeline;
use env_logger::Env;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "digitclf")]
#[command(about = "Logistic regression and SVM classifiers for handwritten digits")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train every model and print accuracies
    Run(RunArgs),
    /// Load and preprocess a dataset, then describe the splits
    Inspect(InspectArgs),
    /// List the SVM configurations a run evaluates
    Configs(ConfigsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliFormat {
    /// MATLAB v5 file with train0..train9 / test0..test9
    #[value(name = "mat")]
    Mat,
    /// Directory with the four MNIST IDX files
    #[value(name = "idx")]
    Idx,
}

impl From<CliFormat> for DatasetFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Mat => DatasetFormat::Mat,
            CliFormat::Idx => DatasetFormat::Idx,
        }
    }
}

#[derive(Args)]
struct DatasetArgs {
    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset file (mat) or directory (idx)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Dataset format
    #[arg(short, long)]
    format: Option<CliFormat>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Iteration budget of the logistic regression minimizer
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Skip one-vs-rest logistic regression
    #[arg(long)]
    skip_binary: bool,

    /// Skip the SVM sweep
    #[arg(long)]
    skip_svm: bool,

    /// Skip softmax logistic regression
    #[arg(long)]
    skip_multiclass: bool,

    /// Write a JSON run summary to this file
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
}

#[derive(Args)]
struct ConfigsArgs {
    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Inspect(args) => inspect_command(args),
        Commands::Configs(args) => configs_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => {
            info!("Reading configuration from {path:?}");
            RunConfig::from_file(path)
        }
        None => Ok(RunConfig::default()),
    }
}

fn resolve_config(args: &DatasetArgs) -> Result<RunConfig> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(dataset) = &args.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(format) = args.format {
        config.format = format.into();
    }
    Ok(config)
}

fn run_command(args: RunArgs) -> Result<()> {
    let mut config = resolve_config(&args.dataset)?;
    if let Some(max_iterations) = args.max_iterations {
        config.logistic.max_iterations = max_iterations;
    }
    config.run_binary &= !args.skip_binary;
    config.run_svm &= !args.skip_svm;
    config.run_multiclass &= !args.skip_multiclass;
    if args.report.is_some() {
        config.report = args.report;
    }

    info!("Dataset: {:?} ({:?})", config.dataset, config.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    pipeline::run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    let config = resolve_config(&args.dataset)?;
    config.validate()?;
    let prepared = pipeline::load_and_prepare(&config)?;
    let splits = &prepared.splits;

    println!("Dataset: {}", config.dataset.display());
    println!("Classes: {}", splits.n_classes);
    println!(
        "Features: {} retained of {}",
        prepared.filter.n_retained(),
        prepared.filter.n_input()
    );
    println!("Split sizes:");
    println!("  Training:   {}", splits.train.n_samples());
    println!("  Validation: {}", splits.validation.n_samples());
    println!("  Testing:    {}", splits.test.n_samples());

    println!("Per-class counts (training / validation / testing):");
    let train = splits.train.class_counts(splits.n_classes);
    let validation = splits.validation.class_counts(splits.n_classes);
    let test = splits.test.class_counts(splits.n_classes);
    for class in 0..splits.n_classes {
        println!(
            "  {class}: {} / {} / {}",
            train[class], validation[class], test[class]
        );
    }
    Ok(())
}

fn configs_command(args: ConfigsArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    for (position, svm) in config.svm.configurations.iter().enumerate() {
        println!("{:>2}. {svm}", position + 1);
        println!("    {}", svm.description());
    }
    Ok(())
}

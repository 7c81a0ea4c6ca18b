//! gradrate CLI binary.
//!
//! Scrapes institution profiles, prepares the feature table, and fits and
//! scores the graduation-rate models.

use clap::{Args, Parser, Subcommand};
use gradrate::data::{CollegeResultsExtractor, ExtractorConfig, FillSource, read_csv, write_csv};
use gradrate::eval::{CrossValidationConfig, ModelArtifact, TrainerConfig, comparison_table};
use gradrate::models::ModelFamily;
use gradrate::{
    PipelineConfig, compare_families, evaluate_dataset, load_feature_table, predict_frame,
    prepare_dataset, scrape_dataset, train_final_model,
};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::{Column, NamedFrom, Series};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gradrate")]
#[command(about = "gradrate: college graduation-rate modeling", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed for fold assignment and train/test splits
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every institution on the reference list and build the feature table
    Scrape {
        /// IPEDS reference CSV
        #[arg(long, default_value = "4-Year-Public-and-Private-Universities-and-IPEDS-IDs.csv")]
        reference: PathBuf,

        /// Name column in the reference CSV
        #[arg(long, default_value = "college")]
        name_column: String,

        /// Where to write the assembled, uncleaned dataset
        #[arg(long, default_value = "college_raw.csv")]
        raw: PathBuf,

        /// Where to write the encoded feature table
        #[arg(long, default_value = "five_college_df.csv")]
        output: PathBuf,

        /// Profile page URL prefix; the identifier is appended
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Imputation policy (cohort-mean or table-mean)
        #[arg(long, default_value = "cohort-mean")]
        fill: FillSource,
    },

    /// Re-run cleaning, imputation and encoding over an assembled dataset
    Clean {
        /// Assembled dataset written by `scrape`
        #[arg(long, default_value = "college_raw.csv")]
        raw: PathBuf,

        /// Where to write the encoded feature table
        #[arg(long, default_value = "five_college_df.csv")]
        output: PathBuf,

        /// Imputation policy (cohort-mean or table-mean)
        #[arg(long, default_value = "cohort-mean")]
        fill: FillSource,
    },

    /// Cross-validate one model configuration
    Evaluate {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Number of folds
        #[arg(long, default_value = "5")]
        folds: usize,

        /// Standardize features with statistics from each training fold
        #[arg(long)]
        standardize: bool,
    },

    /// Cross-validate OLS, ridge and LASSO, each without and with scaling
    Compare {
        #[command(flatten)]
        data: DataArgs,

        /// Regularization strength for ridge and LASSO
        #[arg(long, default_value = "1.0")]
        alpha: f64,

        /// Number of folds
        #[arg(long, default_value = "5")]
        folds: usize,
    },

    /// Fit the final model on a train/test split and save it
    Train {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        train: TrainArgs,

        /// Where to write the model artifact
        #[arg(long, default_value = "linear_regression.json")]
        artifact: PathBuf,
    },

    /// Score a feature table with a saved model
    Predict {
        /// Model artifact written by `train`
        #[arg(long, default_value = "linear_regression.json")]
        artifact: PathBuf,

        /// Encoded feature table
        #[arg(long, default_value = "five_college_df.csv")]
        input: PathBuf,

        /// Write predictions to this CSV instead of printing a summary only
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Encoded feature table
    #[arg(long, default_value = "five_college_df.csv")]
    input: PathBuf,

    /// Column to predict
    #[arg(long, default_value = "five_year_grad_rate")]
    target: String,
}

#[derive(Args)]
struct ModelArgs {
    /// Model family (ols, ridge, lasso)
    #[arg(long, default_value = "ols")]
    family: String,

    /// Regularization strength for ridge and LASSO
    #[arg(long)]
    alpha: Option<f64>,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Fraction of rows held out for testing
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Fit on raw features instead of standardizing with training statistics
    #[arg(long)]
    no_standardize: bool,
}

impl DataArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            features_path: self.input.clone(),
            target: self.target.clone(),
            ..PipelineConfig::default()
        }
    }
}

impl ModelArgs {
    fn family(&self) -> Result<ModelFamily, Box<dyn std::error::Error>> {
        Ok(ModelFamily::from_parts(&self.family, self.alpha)?)
    }
}

impl TrainArgs {
    fn trainer_config(&self) -> Result<TrainerConfig, Box<dyn std::error::Error>> {
        Ok(TrainerConfig {
            test_fraction: self.test_fraction,
            family: self.model.family()?,
            standardize: !self.no_standardize,
        })
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Commands::Scrape {
            reference,
            name_column,
            raw,
            output,
            base_url,
            timeout,
            fill,
        } => {
            let config = PipelineConfig {
                reference_path: reference,
                reference_name_column: name_column,
                raw_path: raw,
                features_path: output,
                fill,
                ..PipelineConfig::default()
            };
            let mut extractor_config = ExtractorConfig {
                timeout_secs: timeout,
                ..ExtractorConfig::default()
            };
            if let Some(base_url) = base_url {
                extractor_config.base_url = base_url;
            }
            scrape(&config, extractor_config)?;
        }
        Commands::Clean { raw, output, fill } => {
            clean(&raw, &output, fill)?;
        }
        Commands::Evaluate {
            data,
            model,
            folds,
            standardize,
        } => {
            let config = CrossValidationConfig {
                folds,
                standardize,
                family: model.family()?,
            };
            evaluate(&data.pipeline_config(), config, &mut rng)?;
        }
        Commands::Compare { data, alpha, folds } => {
            compare(&data.pipeline_config(), alpha, folds, &mut rng)?;
        }
        Commands::Train {
            data,
            train: args,
            artifact,
        } => {
            let config = PipelineConfig {
                artifact_path: artifact,
                ..data.pipeline_config()
            };
            train(&config, args.trainer_config()?, &mut rng)?;
        }
        Commands::Predict {
            artifact,
            input,
            output,
        } => {
            predict(&artifact, &input, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn step(message: &str) -> std::io::Result<()> {
    print!("{}...", message);
    std::io::stdout().flush()
}

fn scrape(
    config: &PipelineConfig,
    extractor_config: ExtractorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\nCollege Results Scrape");
    println!("======================\n");
    println!("Reference list: {}", config.reference_path.display());
    println!("Profile source: {}\n", extractor_config.base_url);

    let extractor = CollegeResultsExtractor::new(extractor_config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let assembly = match scrape_dataset(config, &extractor, Some(&pb)) {
        Ok(assembly) => {
            pb.finish_with_message(format!("Extracted {} institutions", assembly.stats.extracted));
            assembly
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(format!("Scrape failed: {}", e).into());
        }
    };
    println!("\n{}", assembly.stats);

    step("Writing assembled dataset")?;
    let mut raw = assembly.frame.clone();
    write_csv(&mut raw, &config.raw_path)?;
    println!(" ✓ ({})", config.raw_path.display());

    step("Cleaning, imputing and encoding")?;
    let mut features = prepare_dataset(&assembly.frame, config.fill)?;
    println!(" ✓ ({} rows, {} columns)", features.height(), features.width());

    step("Writing feature table")?;
    write_csv(&mut features, &config.features_path)?;
    println!(" ✓ ({})", config.features_path.display());

    Ok(())
}

fn clean(
    raw_path: &Path,
    output: &Path,
    fill: FillSource,
) -> Result<(), Box<dyn std::error::Error>> {
    step("Reading assembled dataset")?;
    let raw = read_csv(raw_path)?;
    println!(" ✓ ({} rows)", raw.height());

    step(&format!("Cleaning, imputing ({}) and encoding", fill))?;
    let mut features = prepare_dataset(&raw, fill)?;
    println!(" ✓ ({} rows, {} columns)", features.height(), features.width());

    step("Writing feature table")?;
    write_csv(&mut features, output)?;
    println!(" ✓ ({})", output.display());

    Ok(())
}

fn evaluate(
    config: &PipelineConfig,
    cv: CrossValidationConfig,
    rng: &mut StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_feature_table(config)?;
    println!(
        "Loaded {} institutions with {} features from {}\n",
        table.n_samples(),
        table.n_features(),
        config.features_path.display()
    );

    let report = evaluate_dataset(&table, cv, rng)?;
    println!("{}", report);

    Ok(())
}

fn compare(
    config: &PipelineConfig,
    alpha: f64,
    folds: usize,
    rng: &mut StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_feature_table(config)?;
    println!(
        "Loaded {} institutions with {} features from {}\n",
        table.n_samples(),
        table.n_features(),
        config.features_path.display()
    );

    let reports = compare_families(&table, alpha, folds, rng)?;
    for report in &reports {
        println!("{}\n", report);
    }
    println!("{}", comparison_table(&reports));

    Ok(())
}

fn train(
    config: &PipelineConfig,
    trainer: TrainerConfig,
    rng: &mut StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_feature_table(config)?;

    step("Fitting final model")?;
    let (outcome, artifact) = train_final_model(&table, trainer, rng)?;
    println!(
        " ✓ ({} train / {} test)",
        outcome.train_indices.len(),
        outcome.test_indices.len()
    );

    step("Saving model artifact")?;
    artifact.save(&config.artifact_path)?;
    println!(" ✓ ({})\n", config.artifact_path.display());

    println!("{}", outcome);

    Ok(())
}

fn predict(
    artifact_path: &Path,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = ModelArtifact::load(artifact_path)?;
    println!("Model: {} (trained {})", artifact.family, artifact.created_at);

    let mut frame = read_csv(input)?;
    let prediction = predict_frame(&artifact, &frame)?;
    println!("Scored {} institutions", prediction.values.len());

    if let (Some(r2), Some(mse)) = (prediction.r2, prediction.mse) {
        println!("  R^2: {:.4}", r2);
        println!("  MSE: {:.4}", mse);
    }

    if let Some(output) = output {
        let column: Column = Series::new(
            format!("predicted_{}", artifact.target).into(),
            prediction.values.to_vec(),
        )
        .into();
        frame.with_column(column)?;
        write_csv(&mut frame, output)?;
        println!("Predictions written to {}", output.display());
    }

    Ok(())
}

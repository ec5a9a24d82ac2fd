//! Vaidya - Symptom-to-Remedy Recommendation Engine
//!
//! Main CLI entry point for diagnosing symptom text, browsing remedies, and
//! training the classifier.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vaidya::inference::Score;
use vaidya::{
    load_context, train, Diagnosis, DiagnosisError, DiagnosisPipeline, ModelArtifact,
    RemedyResolver, RemedyTable, Route, VaidyaConfig, DISCLAIMER,
};

/// Exit status for input the pipeline cannot work with
const EXIT_BAD_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "vaidya")]
#[command(version)]
#[command(about = "Ayurvedic remedy suggestions from a description of symptoms", long_about = None)]
struct Cli {
    /// Config file (default: search for vaidya.toml upward from the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the symptom matching threshold (0-100)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    symptom_threshold: Option<Score>,

    /// Override the remedy matching threshold (0-100)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    remedy_threshold: Option<Score>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a symptom description
    Diagnose {
        /// Symptom text (read from stdin when omitted)
        text: Option<String>,

        /// Print the diagnosis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prompt for symptom descriptions until 'exit'
    Interactive,

    /// Show the remedy keys matching a query
    Remedy {
        /// Condition or symptom to look up
        query: String,

        /// Show at most this many matches
        #[arg(long)]
        top: Option<usize>,
    },

    /// List the recognized symptoms
    Symptoms,

    /// Train the classifier from a one-hot symptom CSV
    Train {
        /// Training CSV (default: training.data from config)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output model path (default: artifacts.model from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fraction of each class held out for evaluation
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VaidyaConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => VaidyaConfig::load_from_cwd().context("Failed to load vaidya.toml")?,
    };
    if let Some(threshold) = cli.symptom_threshold {
        config.matching.symptom_threshold = threshold;
    }
    if let Some(threshold) = cli.remedy_threshold {
        config.matching.remedy_threshold = threshold;
    }

    init_tracing(&config.logging.filter);

    match cli.command {
        Commands::Diagnose { text, json } => cmd_diagnose(&config, text, json),
        Commands::Interactive => cmd_interactive(&config),
        Commands::Remedy { query, top } => cmd_remedy(&config, &query, top),
        Commands::Symptoms => cmd_symptoms(&config),
        Commands::Train {
            data,
            output,
            test_fraction,
            seed,
        } => cmd_train(&config, data, output, test_fraction, seed),
    }
}

/// Log to stderr; `RUST_LOG` wins over the config filter.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn build_pipeline(config: &VaidyaConfig) -> Result<DiagnosisPipeline> {
    let context = load_context(config)?;
    Ok(DiagnosisPipeline::with_config(
        Arc::new(context),
        config.pipeline_config(),
    ))
}

fn cmd_diagnose(config: &VaidyaConfig, text: Option<String>, json: bool) -> Result<ExitCode> {
    let pipeline = build_pipeline(config)?;

    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read symptoms from stdin")?;
            buffer
        }
    };

    match pipeline.diagnose(&text) {
        Ok(diagnosis) => {
            if json {
                print_json(&diagnosis)?;
            } else {
                print_diagnosis(&diagnosis);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ (DiagnosisError::EmptyInput | DiagnosisError::NoSymptomsRecognized)) => {
            eprintln!("{}", err);
            Ok(ExitCode::from(EXIT_BAD_INPUT))
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_interactive(config: &VaidyaConfig) -> Result<ExitCode> {
    let pipeline = build_pipeline(config)?;

    println!("Vaidya - Ayurvedic remedy suggestions");
    println!("Describe your symptoms, or type 'exit' to quit\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line_buffer = String::new();

    loop {
        print!("symptoms> ");
        io::stdout().flush()?;

        line_buffer.clear();
        if input.read_line(&mut line_buffer)? == 0 {
            println!();
            break;
        }
        let line = line_buffer.trim();

        match line {
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            _ => match pipeline.diagnose(line) {
                Ok(diagnosis) => print_diagnosis(&diagnosis),
                Err(DiagnosisError::EmptyInput) => continue,
                Err(DiagnosisError::NoSymptomsRecognized) => {
                    println!("{}\n", DiagnosisError::NoSymptomsRecognized);
                }
                Err(err) => eprintln!("Error: {}", err),
            },
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_remedy(config: &VaidyaConfig, query: &str, top: Option<usize>) -> Result<ExitCode> {
    let path = config.remedies_path();
    let table = RemedyTable::load_with_columns(&path, &config.remedy_columns())
        .with_context(|| format!("Failed to load remedy table {}", path.display()))?;

    let resolver = RemedyResolver::with_threshold(config.matching.remedy_threshold);
    let ranked = resolver.rank(query, &table);
    if ranked.is_empty() {
        println!("No remedy found for '{}'", query.trim());
        return Ok(ExitCode::SUCCESS);
    }

    println!("Matches for '{}':", query.trim());
    for candidate in ranked.iter().take(top.unwrap_or(usize::MAX)) {
        let treatment = table.treatment_for(&candidate.key).unwrap_or("-");
        println!(
            "  {:>3}  {:<30} {}",
            candidate.score, candidate.key, treatment
        );
    }
    println!("\n{}", DISCLAIMER);
    Ok(ExitCode::SUCCESS)
}

fn cmd_symptoms(config: &VaidyaConfig) -> Result<ExitCode> {
    let path = config.model_path();
    let artifact = ModelArtifact::load(&path)
        .with_context(|| format!("Failed to load model {}", path.display()))?;
    let (vocabulary, _, _) = artifact.into_parts()?;

    for (position, term) in vocabulary.iter().enumerate() {
        println!("{:>4}  {}", position, term);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_train(
    config: &VaidyaConfig,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
) -> Result<ExitCode> {
    let mut train_config = config.train_config();
    if let Some(data) = data {
        train_config.data_path = data;
    }
    if let Some(output) = output {
        train_config.output_path = output;
    }
    if let Some(fraction) = test_fraction {
        train_config.test_fraction = fraction;
    }
    if let Some(seed) = seed {
        train_config.seed = seed;
    }

    println!("Training on {}", train_config.data_path.display());
    let report = train::train(&train_config).context("Training failed")?;
    println!("{}", report);
    println!("Model saved to {}", train_config.output_path.display());
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    diagnosis: &'a Diagnosis,
    disclaimer: &'static str,
}

fn print_json(diagnosis: &Diagnosis) -> Result<()> {
    let report = JsonReport {
        diagnosis,
        disclaimer: DISCLAIMER,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_diagnosis(diagnosis: &Diagnosis) {
    let symptoms: Vec<&str> = diagnosis.symptoms.terms().collect();
    println!("Extracted symptoms: {}", symptoms.join(", "));

    if let Some(label) = &diagnosis.predicted_label {
        println!("Predicted condition: {}", label);
    }

    for warning in &diagnosis.warnings {
        println!("Warning: {}", warning);
    }

    if diagnosis.has_remedy() {
        match diagnosis.route {
            Route::SymptomFallback => {
                println!("No remedy for the predicted condition; remedies by symptom:")
            }
            Route::SingleSymptom | Route::Classified => println!("Suggested remedy:"),
        }
        for remedy in &diagnosis.remedies {
            println!("  {} ({}): {}", remedy.key, remedy.query, remedy.treatment);
        }
    }

    println!("\n{}\n", DISCLAIMER);
}

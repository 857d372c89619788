use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mcc::{
    burn_backend_types::{EvalDevice, NAME},
    evaluation::{run_directory, run_single, BinarizeOverrides, EvaluationConfig},
};

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "Matthews correlation coefficient between predicted and ground-truth masks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one predicted mask against its ground truth
    Score {
        /// Predicted mask image
        predicted: PathBuf,

        /// Ground-truth mask image
        reference: PathBuf,

        #[command(flatten)]
        options: ScoreOptions,
    },

    /// Score every predicted mask in a directory against the ground truth of the same name
    Batch {
        /// Directory of predicted masks
        predicted_dir: PathBuf,

        /// Directory of ground-truth masks
        reference_dir: PathBuf,

        #[command(flatten)]
        options: ScoreOptions,
    },

    /// Show backend information
    Info,
}

#[derive(Args)]
struct ScoreOptions {
    /// Intensities strictly above this value are foreground
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Level written for foreground pixels
    #[arg(long)]
    foreground: Option<u8>,

    /// Level written for background pixels
    #[arg(long)]
    background: Option<u8>,

    /// Binarization configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

impl ScoreOptions {
    fn overrides(&self) -> BinarizeOverrides {
        BinarizeOverrides {
            config_file: self.config.clone(),
            threshold: self.threshold,
            foreground_value: self.foreground,
            background_value: self.background,
        }
    }
}

fn main() -> Result<()> {
    // stdout carries the score or JSON report
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let device = EvalDevice::default();

    match cli.command {
        Commands::Score {
            predicted,
            reference,
            options,
        } => {
            let config =
                EvaluationConfig::new(predicted, reference, options.overrides().resolve()?);
            let evaluation = run_single(&config, &device)?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                println!("MCC: {}", evaluation.score);
            }
            Ok(())
        }

        Commands::Batch {
            predicted_dir,
            reference_dir,
            options,
        } => {
            let config =
                EvaluationConfig::new(predicted_dir, reference_dir, options.overrides().resolve()?);
            let report = run_directory(&config, &device)?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            for pair in &report.pairs {
                println!("{}: {}", pair.name, pair.evaluation.score);
            }
            for name in &report.failed {
                println!("{name}: failed");
            }
            match (report.mean_score, report.pooled_score) {
                (Some(mean), Some(pooled)) => {
                    println!("Mean MCC: {mean}");
                    println!("Pooled MCC: {pooled}");
                }
                _ => println!("No mask pairs evaluated"),
            }
            Ok(())
        }

        Commands::Info => {
            println!("MCC Information:");
            println!("  Backend: {}", NAME);
            println!("  Device: {device:?}");
            Ok(())
        }
    }
}

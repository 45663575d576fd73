//! Revcast CLI binary.
//!
//! Trains the revenue model, serves predictions and reports model quality.

mod config;
mod dashboard;
mod form;

use clap::{Parser, Subcommand, ValueEnum};
use config::{ArtifactArgs, DataArgs};
use dashboard::Dashboard;
use indicatif::{ProgressBar, ProgressStyle};
use revcast::data::{CompanyFeatures, load_dataset};
use revcast::model::{TrainingConfig, train};
use revcast::output::{ExportFormat, Exporter, QualitySummary, ReportError, ResidualExport};
use revcast::{Error, PredictionService};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "revcast")]
#[command(about = "Revcast: revenue regression from company spend and region", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the model on a dataset and save the artifact
    Train {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Interactive prediction dashboard
    Serve {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },

    /// Predict revenue for one company
    Predict {
        #[command(flatten)]
        artifact: ArtifactArgs,

        /// Marketing spend
        #[arg(long)]
        marketing_spend: f64,

        /// R&D spend
        #[arg(long)]
        rd_spend: f64,

        /// Administration costs
        #[arg(long)]
        administration_costs: f64,

        /// Number of employees
        #[arg(long)]
        employees: u32,

        /// Region label
        #[arg(long)]
        region: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Recompute in-sample metrics on a dataset
    Metrics {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        artifact: ArtifactArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write per-record residuals to this file (.csv or .json)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the artifact's schema, coefficients and training summary as JSON
    Inspect {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        match e.downcast_ref::<Error>() {
            Some(err) => eprintln!("Error ({}): {}", err.kind(), err),
            None => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "revcast=info".into()))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, artifact } => train_model(&data, &artifact)?,
        Commands::Serve { artifact } => {
            let service = PredictionService::open(&artifact.artifact_path)?;
            let stdin = io::stdin();
            Dashboard::new(service, stdin.lock(), io::stdout()).run()?;
        }
        Commands::Predict {
            artifact,
            marketing_spend,
            rd_spend,
            administration_costs,
            employees,
            region,
            format,
        } => {
            let service = PredictionService::open(&artifact.artifact_path)?;
            let features = CompanyFeatures::new(
                marketing_spend,
                rd_spend,
                administration_costs,
                employees,
                resolve_region(&service, &region)?,
            );
            predict_one(&service, &features, format)?;
        }
        Commands::Metrics {
            data,
            artifact,
            format,
            export,
        } => metrics(&data, &artifact, format, export.as_deref())?,
        Commands::Inspect { artifact } => inspect(&artifact)?,
    }

    Ok(())
}

fn train_model(data: &DataArgs, artifact: &ArtifactArgs) -> revcast::Result<()> {
    let dataset = load_dataset(&data.data_path)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fitting model on {} records", dataset.len()));

    let config = TrainingConfig {
        source: Some(data.data_path.display().to_string()),
        ..Default::default()
    };
    let trained = match train(&dataset, &config) {
        Ok(trained) => {
            spinner.finish_with_message("Model fitted");
            trained
        }
        Err(e) => {
            spinner.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    trained.save(&artifact.artifact_path)?;

    let service = PredictionService::new(trained);
    println!("{}", service.quality_summary().to_ascii_table());
    println!("Model saved to {}", artifact.artifact_path.display());
    Ok(())
}

/// Region label for a one-shot request, numbered against the served vocabulary.
fn resolve_region(service: &PredictionService, text: &str) -> revcast::Result<String> {
    let regions = service.artifact().preprocessor().encoder().categories();
    form::resolve_region(text, regions)
}

fn predict_one(
    service: &PredictionService,
    features: &CompanyFeatures,
    format: OutputFormat,
) -> revcast::Result<()> {
    let report = service.predict(features)?.report(features);

    match format {
        OutputFormat::Text => print!("{}", report.to_ascii_table()),
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn metrics(
    data: &DataArgs,
    artifact: &ArtifactArgs,
    format: OutputFormat,
    export: Option<&Path>,
) -> revcast::Result<()> {
    let service = PredictionService::open(&artifact.artifact_path)?;
    let dataset = load_dataset(&data.data_path)?;
    let evaluation = service.evaluate(&dataset)?;

    let model = service.artifact();
    let summary = QualitySummary::from_evaluation(&evaluation)
        .with_coefficients(model.model().intercept(), model.named_coefficients());

    match format {
        OutputFormat::Text => print!("{}", summary.to_ascii_table()),
        OutputFormat::Markdown => print!("{}", summary.to_markdown()),
        OutputFormat::Json => println!("{}", to_pretty_json(&summary)?),
    }

    if let Some(path) = export {
        let rows = ResidualExport::from_evaluation(&evaluation);
        rows.export_to_file(path, ExportFormat::from_path(path)?)?;
        info!(path = %path.display(), rows = rows.len(), "exported residuals");
    }
    Ok(())
}

fn inspect(artifact: &ArtifactArgs) -> revcast::Result<()> {
    let service = PredictionService::open(&artifact.artifact_path)?;
    let model = service.artifact();
    let preprocessor = model.preprocessor();

    let coefficients: serde_json::Map<String, serde_json::Value> = model
        .named_coefficients()
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!(value)))
        .collect();

    let value = json!({
        "feature_names": model.feature_names(),
        "intercept": model.model().intercept(),
        "coefficients": coefficients,
        "rank": model.model().rank(),
        "scaler": {
            "means": preprocessor.scaler().means(),
            "stds": preprocessor.scaler().stds(),
        },
        "regions": preprocessor.encoder().categories(),
        "summary": model.summary(),
    });

    println!("{}", to_pretty_json(&value)?);
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> revcast::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Report(ReportError::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use revcast::data::{CompanyRecord, Dataset};

    #[test]
    fn test_command_tree() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_needs_no_flags() {
        let cli = Cli::try_parse_from(["revcast", "train"]).unwrap();
        match cli.command {
            Commands::Train { data, artifact } => {
                assert_eq!(data.data_path, PathBuf::from(config::DEFAULT_DATA_PATH));
                assert_eq!(
                    artifact.artifact_path,
                    PathBuf::from(config::DEFAULT_ARTIFACT_PATH)
                );
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_metrics_with_explicit_paths() {
        let cli = Cli::try_parse_from([
            "revcast",
            "metrics",
            "--data",
            "in.csv",
            "--artifact",
            "m.bin",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Metrics {
                data,
                artifact,
                format,
                export,
            } => {
                assert_eq!(data.data_path, PathBuf::from("in.csv"));
                assert_eq!(artifact.artifact_path, PathBuf::from("m.bin"));
                assert_eq!(format, OutputFormat::Json);
                assert!(export.is_none());
            }
            _ => panic!("expected metrics"),
        }
    }

    #[test]
    fn test_one_shot_region_numbers_use_model_regions() {
        let records = [
            (100000.0, 150000.0, 120000.0, 100, "Europe", 500000.0),
            (50000.0, 50000.0, 50000.0, 20, "Asia", 200000.0),
            (200000.0, 300000.0, 250000.0, 500, "North America", 1200000.0),
        ]
        .into_iter()
        .map(|(m, r, a, e, region, revenue)| {
            CompanyRecord::new(CompanyFeatures::new(m, r, a, e, region), revenue)
        })
        .collect();
        let service = PredictionService::new(
            train(&Dataset::from_records(records), &TrainingConfig::default()).unwrap(),
        );

        assert_eq!(resolve_region(&service, "1").unwrap(), "Asia");
        assert_eq!(resolve_region(&service, "3").unwrap(), "North America");
        assert_eq!(resolve_region(&service, "europe").unwrap(), "Europe");

        let err = resolve_region(&service, "4").unwrap_err();
        assert!(err.to_string().contains("between 1 and 3"));
    }
}

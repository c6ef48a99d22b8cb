mod display;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use ocular_ai::{ClassifierAdapter, Diagnoser, OnnxClassifier};
use ocular_client::DiagnosisClient;
use ocular_core::{LabelOrder, ServiceConfig, config::DEFAULT_MAX_UPLOAD_BYTES};
use ocular_server::AppState;
use tracing_subscriber::EnvFilter;

const DEFAULT_MODEL: &str = "models/fundus/model.onnx";

#[derive(Parser, Debug)]
#[command(name = "ocular", author, version, about = "Retinal fundus classification service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP inference service.
    Serve {
        /// ONNX model artifact.
        #[arg(long, env = "OCULAR_MODEL", default_value = DEFAULT_MODEL, value_name = "FILE")]
        model: PathBuf,
        #[arg(long, env = "OCULAR_BIND", default_value = "0.0.0.0:8000", value_name = "ADDR")]
        bind: SocketAddr,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Maximum accepted request body, in bytes.
        #[arg(long, env = "OCULAR_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },
    /// Diagnose images locally without a running service.
    Predict {
        #[arg(long, env = "OCULAR_MODEL", default_value = DEFAULT_MODEL, value_name = "FILE")]
        model: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Print the JSON response body instead of a report.
        #[arg(long)]
        json: bool,
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,
    },
    /// Submit an image to a running service and print the clinical report.
    Report {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(long, env = "OCULAR_URL", default_value = "http://127.0.0.1:8000")]
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the disease reference (all entries, or one by name).
    Diseases {
        name: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct PolicyArgs {
    /// Minimum top score for a concrete diagnosis (0.0 - 1.0).
    #[arg(long, env = "OCULAR_THRESHOLD", default_value_t = 0.75, value_name = "THRESHOLD")]
    threshold: f32,
    /// Comma-separated class order of the model's output vector.
    #[arg(long, env = "OCULAR_LABELS", value_name = "LIST")]
    labels: Option<LabelOrder>,
}

impl PolicyArgs {
    fn config(&self) -> ServiceConfig {
        let config = ServiceConfig::default().with_threshold(self.threshold);
        match self.labels {
            Some(labels) => config.with_labels(labels),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            model,
            bind,
            policy,
            max_upload_bytes,
        } => {
            let config = policy.config().with_max_upload_bytes(max_upload_bytes);
            config.validate()?;
            tracing::info!("ocular v{}", env!("CARGO_PKG_VERSION"));

            let adapter = match OnnxClassifier::load(&model) {
                Ok(classifier) => ClassifierAdapter::new(classifier),
                Err(e) => {
                    tracing::error!(path = %model.display(), "model failed to load: {e:#}");
                    ClassifierAdapter::unavailable()
                }
            };
            let diagnoser = Diagnoser::new(adapter, &config);
            ocular_server::serve(bind, AppState::new(diagnoser, config)).await
        }
        Commands::Predict {
            model,
            policy,
            json,
            images,
        } => {
            let config = policy.config();
            config.validate()?;
            let classifier = OnnxClassifier::load(&model)?;
            let diagnoser = Diagnoser::new(ClassifierAdapter::new(classifier), &config);
            for path in &images {
                predict_local(&diagnoser, path, json)?;
            }
            Ok(())
        }
        Commands::Report { image, url, json } => {
            let client = DiagnosisClient::new(url);
            let remote = client.predict_file(&image).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&remote.result)?);
            } else {
                display::print_report(&remote.file_name, &remote.result, remote.received_at);
            }
            Ok(())
        }
        Commands::Diseases { name } => {
            match name {
                Some(name) => {
                    let info = ocular_core::find_disease(&name)
                        .with_context(|| format!("unknown disease: {name}"))?;
                    display::print_disease_card(info);
                }
                None => {
                    for label in LabelOrder::default().iter() {
                        display::print_disease_card(ocular_core::disease_info(label));
                    }
                }
            }
            Ok(())
        }
    }
}

fn predict_local(diagnoser: &Diagnoser, path: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let result = diagnoser
        .diagnose(&bytes)
        .with_context(|| format!("diagnosing {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        display::print_report(&name, &result, chrono::Utc::now());
    }
    Ok(())
}

//! Leakguard CLI: scores one file + behavior signals and prints the JSON verdict.
//! Stands in for the HTTP front end; scalar fields are passed through unparsed so the
//! engine's own validation decides what is acceptable.

use clap::{Parser, Subcommand};
use leakguard::{
    assess::{AssessmentRequest, Assessor, FileSource},
    config::EngineConfig,
    error::AssessError,
    features::RawInput,
    logging::StructuredLogger,
    model::ModelBundle,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "leakguard", version, about, long_about = None)]
struct Cli {
    /// Config file (JSON); defaults apply when absent
    #[arg(short, long, env = "LEAKGUARD_CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess one file
    Assess {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        file_type_encoded: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        downloads_mb: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        uploads_mb: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        login_hour: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        access_frequency: Option<String>,
    },
    /// Load models and validate the risk table against the label vocabulary
    CheckConfig,
}

fn print_error(e: &AssessError) -> ExitCode {
    if !e.is_client_error() {
        error!(kind = ?e.kind(), error = %e, "leakguard failed");
    }
    let body = serde_json::to_string(&e.to_response())
        .unwrap_or_else(|_| format!("{{\"error\":{:?}}}", e.to_string()));
    println!("{}", body);
    if e.is_client_error() {
        ExitCode::from(1)
    } else {
        ExitCode::from(2)
    }
}

fn run(cli: Cli, config: EngineConfig) -> Result<(), AssessError> {
    match cli.command {
        Command::Assess {
            file,
            file_type_encoded,
            downloads_mb,
            uploads_mb,
            login_hour,
            access_frequency,
        } => {
            let assessor = Assessor::from_config(&config)?;
            let request = AssessmentRequest {
                file: file.map(FileSource::Path),
                input: RawInput {
                    file_type_encoded,
                    downloads_mb,
                    uploads_mb,
                    login_hour,
                    access_frequency,
                },
            };
            let assessment = assessor.assess(&request)?;
            let body = serde_json::to_string(&assessment)
                .map_err(|e| AssessError::io("encoding result", e.into()))?;
            println!("{}", body);
        }
        Command::CheckConfig => {
            let models = ModelBundle::load(&config.model)?;
            config.risk.validate(&models.classifier().vocabulary())?;
            info!(model_dir = ?config.model.model_dir, "configuration valid");
            println!("ok");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match EngineConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            StructuredLogger::init(false, "info");
            return print_error(&e);
        }
    };

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = ?cli.config, "leakguard starting");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => print_error(&e),
    }
}

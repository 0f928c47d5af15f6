#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use premia::batch::infer_csv;
use premia::config::ServiceConfig;
use premia::features::PredictionInput;
use premia::serve;
use premia::service::{PredictionOutput, PredictionService};

#[derive(Args)]
pub struct ServeArgs {
    /// Optional TOML config file with models_dir, bind and log_filter keys
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing young.toml and rest.toml (overrides config and environment)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000 (overrides config and environment)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct PredictArgs {
    /// Path to a JSON file holding one applicant
    #[arg(value_name = "INPUT_JSON")]
    pub input: PathBuf,

    /// Directory containing young.toml and rest.toml
    #[arg(long, value_name = "DIR", default_value = "models")]
    pub models_dir: PathBuf,
}

#[derive(Args)]
pub struct InferArgs {
    /// Path to a CSV file with one applicant per row and a header naming the fields
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Directory containing young.toml and rest.toml
    #[arg(long, value_name = "DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Where to write the tab-separated predictions
    #[arg(long, value_name = "PATH", default_value = "predictions.tsv")]
    pub output: PathBuf,
}

#[derive(Parser)]
#[command(
    name = "premia",
    about = "Health insurance premium prediction with age-segmented models",
    long_about = "Serves premium predictions over HTTP, prices single applicants from JSON \
                 and prices applicant tables in bulk, using one fitted model per age segment."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP prediction service
    #[command(about = "Serve POST /predict, GET /health and GET /")]
    Serve(ServeArgs),

    /// Price one applicant
    #[command(about = "Price one applicant from a JSON file (prints the JSON response)")]
    Predict(PredictArgs),

    /// Price a table of applicants
    #[command(about = "Price every row of a CSV file (outputs: predictions.tsv)")]
    Infer(InferArgs),

    /// Display version information
    #[command(about = "Display version information")]
    Version,
}

fn main() {
    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Serve(args)) => serve_command(args),
        Some(Commands::Predict(args)) => predict(args),
        Some(Commands::Infer(args)) => infer(args),
        Some(Commands::Version) => {
            println!("premia {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(filter: &str) {
    env_logger::Builder::new().parse_filters(filter).init();
}

/// Logging for the one-shot commands follows `PREMIA_LOG`, defaulting to `info`.
fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load(None)?;
    init_logging(&config.log_filter);
    Ok(())
}

fn serve_command(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.models_dir {
        config.models_dir = dir;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    init_logging(&config.log_filter);

    let addr = config.bind_addr()?;
    log::info!("Loading artifacts from {}", config.models_dir.display());
    let service = Arc::new(PredictionService::load(&config.models_dir)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve::run(service, addr))?;
    Ok(())
}

pub fn predict(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_default_logging()?;

    let service = PredictionService::load(&args.models_dir)?;
    let text = fs::read_to_string(&args.input)?;
    let input: PredictionInput = serde_json::from_str(&text)?;

    let quote = service.quote(&input)?;
    log::info!(
        "Segment: {}, normalized risk score: {}, tier: {}",
        quote.segment,
        quote.normalized_risk_score,
        quote.premium_tier
    );

    let output = PredictionOutput {
        predicted_premium: quote.predicted_premium,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn infer(args: InferArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_default_logging()?;

    println!("Loading models from: {}", args.models_dir.display());
    let service = PredictionService::load(&args.models_dir)?;

    println!("Pricing applicants from: {}", args.input.display());
    let rows = infer_csv(&service, &args.input, &args.output)?;
    println!("Priced {rows} applicants");
    println!("Predictions saved to: {}", args.output.display());
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use log::{error, info};

use finai::api::{ProfilePayload, run_http_server};
use finai::core::{
    CompoundProjector, FallbackProjector, PlanError, Planner, PlannerConfig, Projector,
};

#[derive(Debug, Parser)]
#[command(name = "finai", version, about = "Retirement projection and recommendation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Analyze one profile read from a JSON file and print the report
    Analyze {
        #[arg(long, help = "Profile JSON in the same shape as the /analyze request body")]
        input: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Debug, Args)]
struct EngineArgs {
    #[arg(long, help = "Planner configuration JSON; built-in defaults when omitted")]
    config: Option<PathBuf>,
    #[arg(
        long,
        help = "Use the yearly fallback projector and flag results as degraded"
    )]
    degraded: bool,
}

impl EngineArgs {
    fn build_planner(&self) -> Result<Planner, PlanError> {
        let config = match &self.config {
            Some(path) => {
                info!("loading planner configuration from {}", path.display());
                PlannerConfig::from_json_file(path)?
            }
            None => PlannerConfig::default(),
        };
        let projector: Arc<dyn Projector> = if self.degraded {
            Arc::new(FallbackProjector)
        } else {
            Arc::new(CompoundProjector)
        };
        Planner::new(config, projector)
    }
}

fn analyze_file(input: &Path, planner: &Planner) -> Result<String, PlanError> {
    let raw = fs::read_to_string(input).map_err(|source| PlanError::Io {
        path: input.display().to_string(),
        source,
    })?;
    let payload: ProfilePayload = serde_json::from_str(&raw)?;
    let profile = payload.into_profile(&planner.config().defaults)?;
    let report = planner.analyze(&profile)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, engine } => {
            let planner = match engine.build_planner() {
                Ok(planner) => planner,
                Err(e) => {
                    error!("{e}");
                    process::exit(2);
                }
            };
            if let Err(e) = run_http_server(port, planner).await {
                error!("Server error: {e}");
                process::exit(1);
            }
        }
        Command::Analyze { input, engine } => {
            let result = engine
                .build_planner()
                .and_then(|planner| analyze_file(&input, &planner));
            match result {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("{e}");
                    process::exit(1);
                }
            }
        }
    }
}

use clap::Parser;
use colored::*;
use readmeforge::{
    clock::SystemClock, logging, CallerMode, Config, GenerateRequest, Pipeline, Result,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Generate a README from a repository URL or a description", long_about = None)]
struct Cli {
    /// Repository URL, project description, or edit instruction
    text: String,

    /// Output track: readme or template
    #[arg(short, long, default_value = "readme")]
    mode: CallerMode,

    /// Write the document to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!(
            "{} {} ({})",
            "Error:".bright_red().bold(),
            e.user_message(),
            e.kind().dimmed()
        );
        if let Some(suggestion) = e.suggestion() {
            eprintln!("{} {}", "Hint:".bright_yellow(), suggestion);
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    logging::init(&cli.log_level)?;

    let config = Config::load(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(&config, Arc::new(SystemClock))?;

    // Sessions are in-memory, so every run is a fresh conversation
    let response = pipeline
        .orchestrator
        .handle(GenerateRequest {
            text: cli.text,
            session_id: uuid::Uuid::new_v4().to_string(),
            mode: Some(cli.mode.to_string()),
        })
        .await?;

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, &response.document).await?;
            eprintln!(
                "{} {} ({})",
                "Wrote".bright_green(),
                path.display(),
                response.mode
            );
        }
        None => println!("{}", response.document),
    }

    if let Some(name) = &response.repository_name {
        eprintln!("{} {}", "Repository:".bright_blue(), name);
    }
    Ok(())
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use scenescript::app_config::{self, Config};
use scenescript::{server, ScenePipeline};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API (POST /generate_scene)
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides the config file and PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a single script and print it as JSON
    Generate {
        /// One-sentence scene prompt
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Print intermediate stage results alongside the script
        #[arg(short, long)]
        report: bool,
    },

    /// Generate shell completions for scenescript
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// SceneScript - prompt to scene script generator
#[derive(Parser, Debug)]
#[command(name = "scenescript")]
#[command(version)]
#[command(about = "Turn a one-sentence prompt into a dialogue and action script")]
#[command(long_about = "SceneScript runs a five-stage pipeline (interpret, search, plan, dialogue, actions)
over a prompt. Stages use the first configured LLM provider and fall back to
deterministic heuristics when none is configured or a call fails.

EXAMPLES:
    scenescript serve                                   # Serve on 0.0.0.0:5000
    scenescript serve -p 8080                           # Serve on another port
    scenescript generate \"A dog barks in the park.\"     # Print a script
    scenescript generate -r \"A teacher and student talk.\" # Include stage details
    scenescript completions bash > scenescript.bash     # Generate bash completions

CONFIGURATION:
    Settings are read from conf.json when present (see --config). Credentials
    come from the environment: GROQ_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY
    (first present wins) and SEARCH_API_KEY. PORT overrides the server port.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install the logger at trace and narrow it with set_max_level once the
    // configured level is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "scenescript", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level((&config.log_level).into());

    let pipeline = ScenePipeline::from_config(&config);
    let status = pipeline.status();
    info!(
        "LLM provider: {} | search: {}",
        status.active_llm.map(|k| k.display_name().to_string()).unwrap_or_else(|| "none (heuristics only)".to_string()),
        if status.search_configured { "configured" } else { "none" }
    );

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            server::serve(Arc::new(pipeline), &host, port).await
        }
        Commands::Generate { prompt, report } => {
            let run = pipeline.run(&prompt).await?;
            let json = if report {
                serde_json::to_string_pretty(&run)?
            } else {
                serde_json::to_string_pretty(&run.script)?
            };
            println!("{}", json);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file, overlay the environment, apply CLI overrides, validate.
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load(&cli.config_path)?;
    config.apply_env().context("Failed to read configuration from the environment")?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

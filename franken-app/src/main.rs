use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use franken_common::observability::{LogConfig, LogFormat, init_logging};
use franken_config::{FrankenConfig, FrankenConfigLoader};

mod generate;
mod output;

/// Harvest HTML snippets from the franken-ui component documentation.
#[derive(Debug, Parser)]
#[command(name = "franken-app", version, about)]
struct Cli {
    /// YAML config file, merged under FRANKEN_* environment overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the html/<component>/ tree is written into.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headed: bool,

    /// Log at debug verbosity.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = FrankenConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut cfg: FrankenConfig = loader.load()?;
    if cli.headed {
        cfg.headless = false;
    }
    if cli.debug {
        cfg.debug = true;
    }
    if let Some(output) = cli.output {
        cfg.output_dir = output.display().to_string();
    }

    let log_path = init_logging(LogConfig {
        app_name: "franken",
        emit_stderr: true,
        format: LogFormat::Text,
        default_filter: if cfg.debug { "debug" } else { "info" },
        ..LogConfig::default()
    })?;
    tracing::debug!(log_path = %log_path.display(), "logging initialised");

    generate::run(cfg).await
}

//! devtools CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use devtools::cli::{Cli, CommandDispatcher};
use devtools::config::find_project_root;
use devtools::report::OutputFormat;
use devtools::shell::is_ci;
use devtools::ui::{create_ui, should_use_colors, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for run-level errors (unreadable config or catalogue).
const EXIT_RUN_ERROR: u8 = 2;

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, so logs don't interleave with the report
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("devtools=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devtools=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("devtools starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let use_color = !cli.no_color && should_use_colors();

    let project_root = match &cli.project {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().unwrap_or_default();
            find_project_root(&cwd).unwrap_or(cwd)
        }
    };

    // JSON goes to stdout untouched, so no progress bar.
    let is_interactive = !is_ci() && cli.format() == OutputFormat::Human;
    let mut ui = create_ui(is_interactive, output_mode, use_color);

    let dispatcher = CommandDispatcher::new(project_root).with_config(cli.config.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(EXIT_RUN_ERROR)
        }
    }
}

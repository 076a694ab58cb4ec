//! hostprobe CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use hostprobe::cli::Cli;
use hostprobe::config::ProbeConfig;
use hostprobe::prober::Prober;
use hostprobe::report::{ReportFormat, Reporter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("hostprobe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostprobe=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("hostprobe starting with args: {:?}", cli);

    let format = ReportFormat::from(cli.format);
    let reporter = Reporter::new(format, cli.debug);

    // Fail fast: no probing is meaningful without a valid probe directory.
    let config = match ProbeConfig::from_environment(cli.debug, cli.strategy.forced()) {
        Ok(config) => config,
        Err(e) => {
            reporter.error(&e.to_string());
            return ExitCode::from(1);
        }
    };

    match Prober::new(&config).run(&reporter) {
        Ok(report) => {
            if format == ReportFormat::Json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        reporter.error(&format!("Could not serialize report: {}", e));
                        return ExitCode::from(1);
                    }
                }
            }
            // The verdict is informational; completion is success.
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.error(&e.to_string());
            ExitCode::from(1)
        }
    }
}

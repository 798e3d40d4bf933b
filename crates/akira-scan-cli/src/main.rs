mod commands;
mod logging;
mod progress;
mod report;

use std::process;

use akira_scan_core::{export, ProgressReporter, ScanEngine};
use clap::Parser;
use commands::Cli;
use dotenv::dotenv;
use progress::CliReporter;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match akira_scan_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let engine = ScanEngine::new(config);
    let reporter = CliReporter::new();
    let result = match engine.scan(&args.root, &reporter) {
        Ok(result) => result,
        Err(err) => {
            error!("Scan failed: {}", err);
            process::exit(1);
        }
    };

    report::print_report(&result);

    if let Some(output) = &args.output {
        if let Err(err) = export::write_json(&result, output) {
            error!("Error exporting results to {}: {}", output.display(), err);
            process::exit(1);
        }
        reporter.on_export_complete(&output.to_string_lossy());
    }

    Ok(())
}

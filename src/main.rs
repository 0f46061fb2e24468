//! Supreme Court verdict downloader CLI.

use clap::Parser;
use std::io::{self, IsTerminal};
use verdict_dl::logging::{LogConfig, init_logging};
use verdict_dl::{RunReport, VerdictDownloader};

mod cli;

use crate::cli::{Cli, EXIT_FATAL, exit_code};

fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(EXIT_FATAL);
        }
    };

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_log_file(cli.log_file(&config))
        .with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FATAL);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(error = %error, "failed to start async runtime");
            std::process::exit(EXIT_FATAL);
        }
    };

    let result = runtime.block_on(async {
        let downloader = VerdictDownloader::new(config).await?;
        downloader.run().await
    });

    let code = match result {
        Ok(report) => {
            print_summary(&report);
            exit_code(report.outcome, cli.fail_on_empty)
        }
        Err(error) => {
            tracing::error!(error = %error, "run failed");
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

fn print_summary(report: &RunReport) {
    println!("outcome:    {:?}", report.outcome);
    println!("verdicts:   {}", report.verdicts);
    println!("jobs:       {} ({} skipped)", report.jobs, report.skipped);
    println!("downloaded: {}", report.downloaded);
    println!("failed:     {}", report.failed);
    if let Some(path) = &report.metadata_path {
        println!("metadata:   {}", path.display());
    }
}

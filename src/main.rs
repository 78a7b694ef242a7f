use std::process::ExitCode;

use clap::Parser;

pub mod config;
use config::{
    app_config::{ProbeConfig, init_logging},
    cli::Cli,
};
pub mod error;
use error::Result;
pub mod http_probe;
use http_probe::prelude::*;
pub mod stats;
use stats::report::{banner, statistics_lines};

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ProbeConfig::load(&cli);
    let target = cli.url;

    let ip = resolve_host(&target, &config).await?;
    if !config.quiet {
        println!("{}", banner(&target, ip));
    }

    let server_report = config.server_report;
    let url = target.url.to_string();
    let mut prober = Prober::new(config, target, ip)?;
    let outcome = prober.run(interrupted()).await;
    let state = prober.finish();

    // the report is printed for completed, interrupted and aborted runs alike
    for line in statistics_lines(&url, &state.statistics()) {
        println!("{line}");
    }
    if server_report {
        if state.server_headers().is_none() {
            log::debug!("No successful response, no server headers to report");
        }
        for line in state.server_header_lines() {
            println!("{line}");
        }
    }

    outcome
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("httping: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

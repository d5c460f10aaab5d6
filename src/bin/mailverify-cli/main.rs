mod args;
mod input;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use mailverify_lib::{Verifier, VerifierConfig};
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let mut config = match &cli.config {
        Some(path) => VerifierConfig::from_file(path)
            .with_context(|| format!("load configuration {}", path.display()))?,
        None => VerifierConfig::load_default().context("load default configuration")?,
    };
    if let Some(ms) = cli.delay_ms {
        config.rate_limit_delay = Duration::from_millis(ms);
    }

    let addresses = input::collect_addresses(&cli)?;
    if addresses.is_empty() {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    }

    let verifier = Verifier::from_config(config).context("initialise DNS resolver")?;
    let mut report = output::IncrementalReport::new(&cli, std::io::stdout());
    let mut results = verifier.verify_batch(&addresses, |position, total, result| {
        if !cli.quiet {
            eprintln!(
                "[{position}/{total}] {} -> {} :: {}",
                result.email, result.status, result.details
            );
        }
        report.record(result);
    });
    report.finish()?;

    if cli.sort {
        output::sort_results(&mut results);
    }
    if !output::streams_rows(&cli) {
        output::write_reports(&results, &cli)?;
    }
    eprint!("{}", output::render_summary(&results));
    Ok(())
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

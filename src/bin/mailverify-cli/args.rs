use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Ndjson,
    Csv,
}

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "Verify e-mail addresses without sending mail")]
pub struct Cli {
    /// addresses to verify
    pub emails: Vec<String>,

    /// read addresses from a file (one per line, blank lines skipped)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// write the report to a file instead of stdout
    #[arg(long)]
    pub out: Option<String>,

    /// order results VALID, CATCH-ALL, UNKNOWN, INVALID, NO-MX, then the rest
    #[arg(long)]
    pub sort: bool,

    /// include the SMTP transcript of each probe
    #[arg(long)]
    pub transcript: bool,

    /// pause between two addresses, in milliseconds (overrides the configuration)
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// no per-address progress on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// more logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};

use crate::args::Cli;

/// Positional addresses first, then `--input`, then `--stdin`.
pub fn collect_addresses(cli: &Cli) -> Result<Vec<String>> {
    let mut addresses: Vec<String> = cli
        .emails
        .iter()
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect();

    if let Some(path) = &cli.input {
        let file = File::open(path).with_context(|| format!("open input {}", path.display()))?;
        let lines = read_lines(BufReader::new(file))
            .with_context(|| format!("read input {}", path.display()))?;
        addresses.extend(lines);
    }

    if cli.stdin {
        let lines = read_lines(io::stdin().lock()).context("read stdin")?;
        addresses.extend(lines);
    }

    Ok(addresses)
}

fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

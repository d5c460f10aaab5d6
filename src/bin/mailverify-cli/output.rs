use std::io::Write;

use anyhow::{Context, Result, bail};
use tracing::warn;

use mailverify_lib::{Status, VerificationResult};

use crate::args::{Cli, OutputFormat};

pub fn write_reports(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Human => write_human(results, cli),
        OutputFormat::Json => write_json(results, cli),
        OutputFormat::Ndjson => write_ndjson(results, cli),
        OutputFormat::Csv => write_csv(results, cli),
    }
}

/// `--out` is rewritten with everything verified so far after this many
/// results.
const CHECKPOINT_EVERY: usize = 50;

/// True when each result can be written as soon as it is known: a
/// line-oriented format, unsorted, on stdout.
pub fn streams_rows(cli: &Cli) -> bool {
    cli.out.is_none()
        && !cli.sort
        && matches!(cli.format, OutputFormat::Human | OutputFormat::Ndjson)
}

/// Writes results while a batch is still running. Streamed rows go to
/// `rows` immediately; with `--out`, the file is checkpointed every
/// [`CHECKPOINT_EVERY`] results so an interrupted run keeps its progress.
pub struct IncrementalReport<'a, W: Write> {
    cli: &'a Cli,
    rows: W,
    done: Vec<VerificationResult>,
    error: Option<anyhow::Error>,
}

impl<'a, W: Write> IncrementalReport<'a, W> {
    pub fn new(cli: &'a Cli, rows: W) -> Self {
        Self {
            cli,
            rows,
            done: Vec::new(),
            error: None,
        }
    }

    pub fn record(&mut self, result: &VerificationResult) {
        if self.error.is_some() {
            return;
        }
        if streams_rows(self.cli) {
            if let Err(err) = self.write_row(result) {
                self.error = Some(err);
            }
            return;
        }
        if self.cli.out.is_none() {
            return;
        }
        self.done.push(result.clone());
        if self.done.len() % CHECKPOINT_EVERY == 0 {
            if let Err(err) = write_reports(&self.done, self.cli) {
                warn!(error = %err, verified = self.done.len(), "checkpoint failed");
            }
        }
    }

    /// First error hit while streaming rows, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write_row(&mut self, result: &VerificationResult) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Ndjson if self.cli.transcript => serde_json::to_string(result)?,
            OutputFormat::Ndjson => {
                let mut row = result.clone();
                row.transcript.clear();
                serde_json::to_string(&row)?
            }
            _ => render_human(result, self.cli.transcript),
        };
        writeln!(self.rows, "{line}").context("write report row")?;
        self.rows.flush().context("flush report row")
    }
}

/// Stable sort by status rank; addresses keep their input order within a
/// status.
pub fn sort_results(results: &mut [VerificationResult]) {
    results.sort_by_key(|result| result.status.sort_rank());
}

pub fn render_summary(results: &[VerificationResult]) -> String {
    let mut out = format!("Summary ({} addresses):\n", results.len());
    for status in Status::ALL {
        let count = results.iter().filter(|r| r.status == status).count();
        if count > 0 {
            out.push_str(&format!("  {status}: {count}\n"));
        }
    }
    out
}

pub fn render_human(result: &VerificationResult, transcript: bool) -> String {
    let mut lines = vec![format!(
        "[{}] {} :: {} (risk {})",
        result.status, result.email, result.details, result.risk_score
    )];

    let flags: Vec<&str> = [
        (result.is_role, "role"),
        (result.is_disposable, "disposable"),
        (result.is_catch_all, "catch-all"),
        (result.is_free_provider, "free-provider"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if !flags.is_empty() {
        lines.push(format!("        flags: {}", flags.join(", ")));
    }

    if let Some(code) = result.smtp_code {
        lines.push(format!("        smtp: {code}"));
    }

    if !result.mx_records.is_empty() {
        lines.push(format!("        mx: {}", result.mx_records.join(", ")));
        lines.push(format!("        health: {}", health_summary(result)));
    }

    if transcript {
        for line in &result.transcript {
            lines.push(format!("        | {line}"));
        }
    }

    lines.join("\n")
}

fn health_summary(result: &VerificationResult) -> String {
    let health = &result.domain_health;
    let present: Vec<&str> = [
        (health.has_a, "A"),
        (health.has_spf, "SPF"),
        (health.has_dkim, "DKIM"),
        (health.has_dmarc, "DMARC"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if present.is_empty() {
        "none".to_string()
    } else {
        present.join(" ")
    }
}

fn write_human(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    let mut text = String::new();
    for result in results {
        text.push_str(&render_human(result, cli.transcript));
        text.push('\n');
    }
    emit(cli, text.as_bytes())
}

fn write_json(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    let mut text = if cli.transcript {
        serde_json::to_string_pretty(results)?
    } else {
        serde_json::to_string_pretty(&without_transcripts(results))?
    };
    text.push('\n');
    emit(cli, text.as_bytes())
}

fn write_ndjson(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    let rows = if cli.transcript {
        results.to_vec()
    } else {
        without_transcripts(results)
    };
    let mut buf = Vec::new();
    for row in &rows {
        buf.extend_from_slice(serde_json::to_string(row)?.as_bytes());
        buf.push(b'\n');
    }
    emit(cli, &buf)
}

fn without_transcripts(results: &[VerificationResult]) -> Vec<VerificationResult> {
    results
        .iter()
        .cloned()
        .map(|mut result| {
            result.transcript.clear();
            result
        })
        .collect()
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 14] = [
    "email",
    "status",
    "details",
    "smtp_code",
    "is_role",
    "is_disposable",
    "is_catch_all",
    "is_free_provider",
    "risk_score",
    "mx_records",
    "has_A",
    "has_SPF",
    "has_DKIM",
    "has_DMARC",
];

#[cfg(feature = "with-csv")]
fn write_csv(results: &[VerificationResult], cli: &Cli) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for result in results {
        wtr.write_record(csv_record(result))?;
    }
    let data = wtr.into_inner().context("flush csv")?;
    emit(cli, &data)
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(result: &VerificationResult) -> Vec<String> {
    let health = &result.domain_health;
    vec![
        result.email.clone(),
        result.status.to_string(),
        result.details.clone(),
        result.smtp_code.map(|code| code.to_string()).unwrap_or_default(),
        result.is_role.to_string(),
        result.is_disposable.to_string(),
        result.is_catch_all.to_string(),
        result.is_free_provider.to_string(),
        result.risk_score.to_string(),
        result.mx_records.join(";"),
        health.has_a.to_string(),
        health.has_spf.to_string(),
        health.has_dkim.to_string(),
        health.has_dmarc.to_string(),
    ]
}

fn emit(cli: &Cli, bytes: &[u8]) -> Result<()> {
    match &cli.out {
        Some(path) => write_all_atomically(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    if path.is_empty() {
        bail!("--out needs a file path");
    }
    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use mailverify_lib::DomainHealth;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["mailverify-cli"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid flags")
    }

    fn result(email: &str, status: Status) -> VerificationResult {
        VerificationResult {
            email: email.to_string(),
            status,
            details: String::new(),
            smtp_code: None,
            is_role: false,
            is_disposable: false,
            is_catch_all: false,
            is_free_provider: false,
            risk_score: 0,
            mx_records: Vec::new(),
            domain_health: DomainHealth::default(),
            transcript: Vec::new(),
        }
    }

    fn valid_admin() -> VerificationResult {
        VerificationResult {
            details: "Accepted by mx1.example.com".to_string(),
            smtp_code: Some(250),
            is_role: true,
            mx_records: vec!["mx1.example.com".to_string(), "mx2.example.com".to_string()],
            domain_health: DomainHealth {
                has_a: true,
                has_spf: true,
                has_dkim: false,
                has_dmarc: true,
            },
            transcript: vec![
                "[mx1.example.com] S: 220 mx1 ESMTP".to_string(),
                "[mx1.example.com] C: QUIT".to_string(),
            ],
            ..result("admin@example.com", Status::Valid)
        }
    }

    #[test]
    fn human_rendering() {
        insta::assert_snapshot!(render_human(&valid_admin(), false), @r"
[VALID] admin@example.com :: Accepted by mx1.example.com (risk 0)
        flags: role
        smtp: 250
        mx: mx1.example.com, mx2.example.com
        health: A SPF DMARC
");
    }

    #[test]
    fn human_rendering_with_transcript() {
        insta::assert_snapshot!(render_human(&valid_admin(), true), @r"
[VALID] admin@example.com :: Accepted by mx1.example.com (risk 0)
        flags: role
        smtp: 250
        mx: mx1.example.com, mx2.example.com
        health: A SPF DMARC
        | [mx1.example.com] S: 220 mx1 ESMTP
        | [mx1.example.com] C: QUIT
");
    }

    #[test]
    fn terminal_status_has_no_network_lines() {
        let disposable = VerificationResult {
            details: "Disposable email domain".to_string(),
            is_disposable: true,
            risk_score: 40,
            ..result("x@mailinator.com", Status::Disposable)
        };
        insta::assert_snapshot!(render_human(&disposable, false), @r"
[DISPOSABLE] x@mailinator.com :: Disposable email domain (risk 40)
        flags: disposable
");
    }

    #[test]
    fn bare_result_is_one_line() {
        let invalid = VerificationResult {
            details: "Invalid email syntax".to_string(),
            risk_score: 30,
            ..result("not-an-address", Status::Invalid)
        };
        insta::assert_snapshot!(
            render_human(&invalid, false),
            @"[INVALID] not-an-address :: Invalid email syntax (risk 30)"
        );
    }

    #[test]
    fn sort_keeps_input_order_within_status() {
        let mut results = vec![
            result("1@a.io", Status::NoMx),
            result("2@a.io", Status::Disposable),
            result("3@a.io", Status::Valid),
            result("4@a.io", Status::Invalid),
            result("5@a.io", Status::Valid),
            result("6@a.io", Status::CatchAll),
            result("7@a.io", Status::Unknown),
        ];
        sort_results(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(
            order,
            vec!["3@a.io", "5@a.io", "6@a.io", "7@a.io", "4@a.io", "1@a.io", "2@a.io"]
        );
    }

    #[test]
    fn summary_counts_per_status() {
        let results = vec![
            result("a@a.io", Status::Valid),
            result("b@a.io", Status::Invalid),
            result("c@a.io", Status::Valid),
        ];
        insta::assert_snapshot!(render_summary(&results), @r"
Summary (3 addresses):
  INVALID: 1
  VALID: 2
");
    }

    #[cfg(feature = "with-csv")]
    #[test]
    fn csv_columns_follow_header() {
        let record = csv_record(&valid_admin());
        assert_eq!(record.len(), CSV_HEADER.len());
        assert_eq!(record[1], "VALID");
        assert_eq!(record[3], "250");
        assert_eq!(record[9], "mx1.example.com;mx2.example.com");
        assert_eq!(record[12], "false");
    }

    #[test]
    fn json_hides_transcript_unless_asked() {
        let rows = without_transcripts(&[valid_admin()]);
        let json = serde_json::to_value(&rows).expect("json");
        assert!(json[0].get("transcript").is_none());
        assert_eq!(json[0]["status"], "VALID");
        assert_eq!(json[0]["domain_health"]["has_DMARC"], true);
    }

    #[test]
    fn ndjson_rows_are_written_as_results_arrive() {
        let cli = cli(&["--format", "ndjson"]);
        assert!(streams_rows(&cli));
        let mut rows = Vec::new();
        {
            let mut report = IncrementalReport::new(&cli, &mut rows);
            report.record(&valid_admin());
            report.finish().expect("rows written");
        }
        let first = String::from_utf8(rows.clone()).expect("utf8");
        assert_eq!(first.lines().count(), 1);
        assert!(!first.contains("transcript"));

        {
            let mut report = IncrementalReport::new(&cli, &mut rows);
            report.record(&result("b@a.io", Status::Invalid));
            report.finish().expect("rows written");
        }
        let text = String::from_utf8(rows).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"b@a.io\""), "{}", lines[1]);
    }

    #[test]
    fn human_rows_stream_unless_sorted() {
        let cli_plain = cli(&["--format", "human"]);
        let mut rows = Vec::new();
        let mut report = IncrementalReport::new(&cli_plain, &mut rows);
        report.record(&result("a@a.io", Status::Valid));
        report.record(&result("b@a.io", Status::Invalid));
        report.finish().expect("rows written");
        assert_eq!(String::from_utf8(rows).expect("utf8").lines().count(), 2);

        assert!(!streams_rows(&cli(&["--format", "human", "--sort"])));
        assert!(!streams_rows(&cli(&["--format", "json"])));
    }

    #[test]
    fn out_file_is_checkpointed_during_the_batch() {
        let path = std::env::temp_dir().join(format!(
            "mailverify-checkpoint-{}.ndjson",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().expect("utf8 temp path").to_string();
        let cli = cli(&["--format", "ndjson", "--out", &path_str]);
        assert!(!streams_rows(&cli));

        let mut rows = Vec::new();
        let mut report = IncrementalReport::new(&cli, &mut rows);
        for n in 0..CHECKPOINT_EVERY - 1 {
            report.record(&result(&format!("{n}@a.io"), Status::Valid));
        }
        assert!(!path.exists());

        report.record(&result("last@a.io", Status::Valid));
        let written = std::fs::read_to_string(&path).expect("checkpoint written");
        assert_eq!(written.lines().count(), CHECKPOINT_EVERY);
        report.finish().expect("no row errors");
        assert!(rows.is_empty());

        std::fs::remove_file(&path).expect("cleanup");
    }
}

use std::thread;

use tracing::debug;

use super::catch_all::detect_catch_all;
use super::{
    AmbiguousReplyPolicy, Connector, IdentitySource, ProbeReport, ProbeVerdict, SmtpError,
    SmtpProbeOptions, SmtpReply, SmtpSession,
};

/// Reply codes RFC 5321 defines as temporary; anything else outside 2xx/5xx
/// is retried the same way but reported as unexpected.
const TRANSIENT_CODES: [u16; 4] = [421, 450, 451, 452];
const AMBIGUOUS_CODE: u16 = 252;

/// Outcome of a single handshake round against one exchange.
#[derive(Debug)]
enum RoundOutcome {
    Accepted { code: u16, catch_all: bool },
    Ambiguous { code: u16 },
    Rejected { code: u16 },
    Transient { code: u16 },
    Failed(SmtpError),
}

/// Runs the `HELO`/`MAIL FROM`/`RCPT TO` dialogue against a domain's
/// exchanges, in order, one session at a time.
pub struct Prober<'a, C: ?Sized, I: ?Sized> {
    options: &'a SmtpProbeOptions,
    connector: &'a C,
    identity: &'a I,
}

impl<'a, C, I> Prober<'a, C, I>
where
    C: Connector + ?Sized,
    I: IdentitySource + ?Sized,
{
    pub fn new(options: &'a SmtpProbeOptions, connector: &'a C, identity: &'a I) -> Self {
        Self {
            options,
            connector,
            identity,
        }
    }

    /// Probe `local_part@domain` against `mx_hosts` (most preferred first).
    ///
    /// The first conclusive answer wins: an acceptance (after catch-all
    /// detection on the same session) or a permanent rejection. Temporary
    /// codes and transport failures are retried on the same host, then the
    /// next host is tried. Exhausting every host yields
    /// [`ProbeVerdict::Unknown`].
    pub fn probe(&self, local_part: &str, domain: &str, mx_hosts: &[String]) -> ProbeReport {
        let recipient = format!("{local_part}@{domain}");
        let mut transcript = Vec::new();
        let mut last_failure: Option<String> = None;
        let mut last_code = None;

        for host in mx_hosts {
            for round in 1..=self.options.rounds() {
                if round > 1 {
                    debug!(
                        host = %host,
                        round,
                        delay_ms = self.options.retry_delay.as_millis() as u64,
                        "retrying exchange"
                    );
                    thread::sleep(self.options.retry_delay);
                }

                let outcome = self.run_round(host, &recipient, domain, &mut transcript);
                debug!(host = %host, round, outcome = ?outcome, "handshake round finished");

                let report = match outcome {
                    RoundOutcome::Accepted { code, catch_all } => {
                        let (verdict, details) = if catch_all {
                            (
                                ProbeVerdict::CatchAll,
                                format!("Accepted by {host}, domain accepts any recipient"),
                            )
                        } else {
                            (ProbeVerdict::Valid, format!("Accepted by {host}"))
                        };
                        let mut report = ProbeReport::new(verdict, details)
                            .with_code(Some(code))
                            .with_host(host);
                        report.is_catch_all = catch_all;
                        report
                    }
                    RoundOutcome::Ambiguous { code } => ProbeReport::new(
                        ProbeVerdict::Unknown,
                        format!("Ambiguous reply from {host} (code {code})"),
                    )
                    .with_code(Some(code))
                    .with_host(host),
                    RoundOutcome::Rejected { code } => ProbeReport::new(
                        ProbeVerdict::Invalid,
                        format!("Rejected by {host} (code {code})"),
                    )
                    .with_code(Some(code))
                    .with_host(host),
                    RoundOutcome::Transient { code } => {
                        let kind = if TRANSIENT_CODES.contains(&code) {
                            "Temporary failure"
                        } else {
                            "Unexpected reply"
                        };
                        last_failure = Some(format!("{kind} on {host} (code {code})"));
                        last_code = Some(code);
                        continue;
                    }
                    RoundOutcome::Failed(err) => {
                        last_failure = Some(err.to_string());
                        last_code = None;
                        continue;
                    }
                };

                return ProbeReport {
                    transcript,
                    ..report
                };
            }
        }

        let details = match last_failure {
            Some(cause) => format!("Could not verify with any mail server (last failure: {cause})"),
            None => "No mail server to probe".to_string(),
        };
        ProbeReport {
            transcript,
            ..ProbeReport::new(ProbeVerdict::Unknown, details).with_code(last_code)
        }
    }

    fn run_round(
        &self,
        host: &str,
        recipient: &str,
        domain: &str,
        transcript: &mut Vec<String>,
    ) -> RoundOutcome {
        let mut session = match SmtpSession::open(
            self.connector,
            host,
            self.options.port,
            self.options.io_timeout(),
        ) {
            Ok(session) => session,
            Err(err) => return RoundOutcome::Failed(err),
        };

        let outcome = self
            .dialogue(&mut session, recipient, domain)
            .unwrap_or_else(RoundOutcome::Failed);
        transcript.extend(session.finish());
        outcome
    }

    fn dialogue(
        &self,
        session: &mut SmtpSession,
        recipient: &str,
        domain: &str,
    ) -> Result<RoundOutcome, SmtpError> {
        let helo = self.identity.helo_domain(&self.options.helo_domains);
        let reply = session.hello(&helo)?;
        if !reply.is_positive_completion() {
            return Err(SmtpError::refused(session.host(), "HELO", reply.code));
        }

        let sender = self.identity.mail_from(&self.options.mail_from);
        let reply = session.mail_from(&sender)?;
        if !reply.is_positive_completion() {
            return Err(SmtpError::refused(session.host(), "MAIL FROM", reply.code));
        }

        let reply = session.rcpt_to(recipient)?;
        Ok(self.classify(session, &reply, domain, &sender))
    }

    fn classify(
        &self,
        session: &mut SmtpSession,
        reply: &SmtpReply,
        domain: &str,
        sender: &str,
    ) -> RoundOutcome {
        let code = reply.code;
        if code == AMBIGUOUS_CODE {
            match self.options.ambiguous_reply {
                AmbiguousReplyPolicy::Valid => {}
                AmbiguousReplyPolicy::Invalid => return RoundOutcome::Rejected { code },
                AmbiguousReplyPolicy::Unknown => return RoundOutcome::Ambiguous { code },
            }
        }

        if reply.is_positive_completion() {
            let catch_all = detect_catch_all(
                session,
                domain,
                sender,
                self.options.catch_all_test_count,
                self.identity,
            );
            RoundOutcome::Accepted { code, catch_all }
        } else if reply.is_permanent_failure() {
            RoundOutcome::Rejected { code }
        } else {
            RoundOutcome::Transient { code }
        }
    }
}

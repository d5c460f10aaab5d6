use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a `252` ("cannot verify, will attempt delivery") reply to `RCPT TO`
/// is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousReplyPolicy {
    /// Treat like any other 2xx acceptance (catch-all detection included).
    Valid,
    /// Treat like a permanent rejection.
    Invalid,
    /// Stop probing and report the address as unknown.
    #[default]
    Unknown,
}

/// Knobs for [`Prober::probe`](crate::smtp::Prober::probe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    pub port: u16,
    pub timeout: Duration,
    pub helo_domains: Vec<String>,
    pub mail_from: Vec<String>,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub catch_all_test_count: u8,
    pub ambiguous_reply: AmbiguousReplyPolicy,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            timeout: Duration::from_secs(10),
            helo_domains: vec!["verify.example.com".to_string()],
            mail_from: vec!["verify@example.com".to_string()],
            retry_count: 1,
            retry_delay: Duration::from_secs(2),
            catch_all_test_count: 2,
            ambiguous_reply: AmbiguousReplyPolicy::Unknown,
        }
    }
}

impl SmtpProbeOptions {
    /// Handshake rounds per exchange, first attempt included.
    pub fn rounds(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }

    /// `None` disables the connect/IO deadline.
    pub fn io_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}

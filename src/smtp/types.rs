use std::fmt;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        self.code >= 500
    }
}

/// Classification of the `RCPT TO` exchange for the real recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// Accepted, and the domain rejected at least one synthetic recipient.
    Valid,
    /// Accepted, along with every synthetic recipient.
    CatchAll,
    /// Permanently rejected (5xx).
    Invalid,
    /// Every exchange failed or answered with a temporary/unclassified code.
    Unknown,
}

impl fmt::Display for ProbeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::CatchAll => f.write_str("catch-all"),
            Self::Invalid => f.write_str("invalid"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Result of [`Prober::probe`](crate::smtp::Prober::probe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub verdict: ProbeVerdict,
    pub details: String,
    pub smtp_code: Option<u16>,
    pub is_catch_all: bool,
    /// Exchange that produced the verdict, if one answered conclusively.
    pub host: Option<String>,
    pub transcript: Vec<String>,
}

impl ProbeReport {
    pub(crate) fn new(verdict: ProbeVerdict, details: impl Into<String>) -> Self {
        Self {
            verdict,
            details: details.into(),
            smtp_code: None,
            is_catch_all: false,
            host: None,
            transcript: Vec::new(),
        }
    }

    pub(crate) fn with_code(mut self, code: Option<u16>) -> Self {
        self.smtp_code = code;
        self
    }

    pub(crate) fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }
}

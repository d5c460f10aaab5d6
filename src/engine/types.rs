use std::fmt;

use serde::{Deserialize, Serialize};

use crate::health::DomainHealth;
use crate::smtp::ProbeVerdict;

/// Final classification of an address. Variants are listed in detection
/// order; the first one reached ends the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Status {
    Invalid,
    Disposable,
    Spamtrap,
    Abuse,
    NoMx,
    Valid,
    CatchAll,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::Invalid,
        Status::Disposable,
        Status::Spamtrap,
        Status::Abuse,
        Status::NoMx,
        Status::Valid,
        Status::CatchAll,
        Status::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Invalid => "INVALID",
            Status::Disposable => "DISPOSABLE",
            Status::Spamtrap => "SPAMTRAP",
            Status::Abuse => "ABUSE",
            Status::NoMx => "NO-MX",
            Status::Valid => "VALID",
            Status::CatchAll => "CATCH-ALL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Position when results are sorted for reporting: deliverable first,
    /// undeliverable next, everything else last.
    pub fn sort_rank(self) -> u8 {
        match self {
            Status::Valid => 0,
            Status::CatchAll => 1,
            Status::Unknown => 2,
            Status::Invalid => 3,
            Status::NoMx => 4,
            Status::Disposable | Status::Spamtrap | Status::Abuse => 99,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProbeVerdict> for Status {
    fn from(verdict: ProbeVerdict) -> Self {
        match verdict {
            ProbeVerdict::Valid => Status::Valid,
            ProbeVerdict::CatchAll => Status::CatchAll,
            ProbeVerdict::Invalid => Status::Invalid,
            ProbeVerdict::Unknown => Status::Unknown,
        }
    }
}

/// Everything the engine learned about one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub email: String,
    pub status: Status,
    pub details: String,
    pub smtp_code: Option<u16>,
    pub is_role: bool,
    pub is_disposable: bool,
    pub is_catch_all: bool,
    pub is_free_provider: bool,
    pub risk_score: u8,
    pub mx_records: Vec<String>,
    pub domain_health: DomainHealth,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<String>,
}

impl VerificationResult {
    pub(crate) fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: Status::Unknown,
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

    pub(crate) fn conclude(&mut self, status: Status, details: impl Into<String>) {
        self.status = status;
        self.details = details.into();
    }
}

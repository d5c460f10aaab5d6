#![forbid(unsafe_code)]
//! mailverify_lib: e-mail deliverability verdicts without sending mail
//! (syntax, reputation lists, DNS, SMTP `RCPT TO` probing, risk score).

pub mod classifier;
pub mod config;
pub mod dns;
pub mod engine;
pub mod health;
pub mod smtp;
pub mod syntax;

pub use classifier::{DomainLists, ListedAs};
pub use config::{ConfigError, VerifierConfig};
pub use dns::{DnsError, DnsLookup, MxRecord};
pub use engine::{DomainAgeLookup, RiskWeights, Status, VerificationResult, Verifier};
pub use health::DomainHealth;
pub use smtp::{
    AmbiguousReplyPolicy, Connector, IdentitySource, ProbeReport, ProbeVerdict, SmtpError,
    SmtpProbeOptions, TcpConnector,
};

//! SMTP recipient probing.
//!
//! [`Prober::probe`] walks a domain's exchanges and runs a minimal
//! `HELO`/`MAIL FROM`/`RCPT TO` dialogue, never `DATA`, so nothing is
//! delivered. An accepted recipient triggers catch-all detection on the same
//! session. Transport and protocol failures never escape: they become retries,
//! a move to the next exchange, or finally [`ProbeVerdict::Unknown`].

mod catch_all;
mod connector;
mod error;
mod identity;
mod options;
mod probe;
mod session;
mod types;

pub use connector::{Connector, SmtpStream, TcpConnector};
pub use error::SmtpError;
pub use identity::{IdentitySource, RandomIdentity};
pub use options::{AmbiguousReplyPolicy, SmtpProbeOptions};
pub use probe::Prober;
pub use session::SmtpSession;
pub use types::{ProbeReport, ProbeVerdict, SmtpReply};

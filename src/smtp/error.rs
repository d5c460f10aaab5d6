use std::io;

use thiserror::Error;

/// Host-level SMTP failures. The probe converts every one of these into a
/// retry or a move to the next exchange.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{host} timed out")]
    Timeout { host: String },
    #[error("{host} closed the connection")]
    Disconnected { host: String },
    #[error("I/O error with {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("protocol error with {host}: {message}")]
    Protocol { host: String, message: String },
    #[error("{host} refused {stage} with {code}")]
    Refused {
        host: String,
        stage: &'static str,
        code: u16,
    },
}

impl SmtpError {
    pub(crate) fn connect(host: &str, source: io::Error) -> Self {
        if is_timeout(&source) {
            return Self::Timeout {
                host: host.to_string(),
            };
        }
        Self::Connect {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn io(host: &str, source: io::Error) -> Self {
        match source.kind() {
            _ if is_timeout(&source) => Self::Timeout {
                host: host.to_string(),
            },
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Disconnected {
                host: host.to_string(),
            },
            _ => Self::Io {
                host: host.to_string(),
                source,
            },
        }
    }

    pub(crate) fn protocol(host: &str, message: impl Into<String>) -> Self {
        Self::Protocol {
            host: host.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn refused(host: &str, stage: &'static str, code: u16) -> Self {
        Self::Refused {
            host: host.to_string(),
            stage,
            code,
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

//! Runtime configuration, loaded once and read-only afterwards.

mod file;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::classifier::{DomainLists, defaults};
use crate::engine::RiskWeights;
use crate::smtp::SmtpProbeOptions;
use file::ConfigFile;

pub const DEFAULT_DISPOSABLE_FILE: &str = "disposable_domains.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot read disposable domain list {path}: {source}")]
    DisposableList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Everything the engine reads. Built-in list defaults apply; the
/// disposable list is only populated by [`VerifierConfig::load_default`] and
/// the `from_*` constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub smtp: SmtpProbeOptions,
    pub dns_timeout: Duration,
    pub dkim_selectors: Vec<String>,
    pub disposable_domains_file: PathBuf,
    pub lists: DomainLists,
    pub risk: RiskWeights,
    /// Pause between two addresses of a batch.
    pub rate_limit_delay: Duration,
    pub domain_age_enabled: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            smtp: SmtpProbeOptions::default(),
            dns_timeout: Duration::from_secs(5),
            dkim_selectors: vec!["default".to_string()],
            disposable_domains_file: PathBuf::from(DEFAULT_DISPOSABLE_FILE),
            lists: DomainLists::builtin(),
            risk: RiskWeights::default(),
            rate_limit_delay: Duration::from_millis(1000),
            domain_age_enabled: false,
        }
    }
}

impl VerifierConfig {
    /// Defaults plus the disposable list at its default location.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file_contents(ConfigFile::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::from_file_contents(file)
    }

    fn from_file_contents(file: ConfigFile) -> Result<Self, ConfigError> {
        let fallback = Self::default();
        let base = fallback.smtp;
        let smtp_file = file.smtp;

        let port = smtp_file.port.unwrap_or(base.port);
        if port == 0 {
            return Err(ConfigError::invalid("smtp.port", "must be between 1 and 65535"));
        }

        let smtp = SmtpProbeOptions {
            port,
            timeout: smtp_file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.timeout),
            helo_domains: smtp_file.helo_domains.unwrap_or(base.helo_domains),
            mail_from: smtp_file.mail_from.unwrap_or(base.mail_from),
            retry_count: smtp_file.retry_count.unwrap_or(base.retry_count),
            retry_delay: smtp_file
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(base.retry_delay),
            catch_all_test_count: smtp_file
                .catch_all_test_count
                .unwrap_or(base.catch_all_test_count),
            ambiguous_reply: smtp_file.ambiguous_reply.unwrap_or(base.ambiguous_reply),
        };

        let dns_timeout = file
            .dns
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(fallback.dns_timeout);
        if dns_timeout.is_zero() {
            return Err(ConfigError::invalid("dns.timeout_secs", "must be positive"));
        }

        let lists_file = file.lists;
        let disposable_domains_file = lists_file
            .disposable_domains_file
            .unwrap_or(fallback.disposable_domains_file);
        let lists = build_lists(
            lists_file.free_providers,
            lists_file.role_accounts,
            lists_file.spamtrap_usernames,
        )
        .with_abuse_addresses(lists_file.abuse_list.unwrap_or_default())
        .with_disposable_file(&disposable_domains_file)
        .map_err(|source| ConfigError::DisposableList {
            path: disposable_domains_file.clone(),
            source,
        })?;

        Ok(Self {
            smtp,
            dns_timeout,
            dkim_selectors: file.dns.dkim_selectors.unwrap_or(fallback.dkim_selectors),
            disposable_domains_file,
            lists,
            risk: file.risk,
            rate_limit_delay: file
                .batch
                .rate_limit_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.rate_limit_delay),
            domain_age_enabled: file.domain_age.enabled.unwrap_or(fallback.domain_age_enabled),
        })
    }
}

/// Configured lists replace the built-in ones rather than extend them.
fn build_lists(
    free_providers: Option<Vec<String>>,
    role_accounts: Option<Vec<String>>,
    spamtrap_usernames: Option<Vec<String>>,
) -> DomainLists {
    let lists = DomainLists::new();
    let lists = match free_providers {
        Some(domains) => lists.with_free_providers(domains),
        None => lists.with_free_providers(defaults::FREE_PROVIDERS.iter().copied()),
    };
    let lists = match role_accounts {
        Some(prefixes) => lists.with_role_accounts(prefixes),
        None => lists.with_role_accounts(defaults::ROLE_ACCOUNTS.iter().copied()),
    };
    match spamtrap_usernames {
        Some(usernames) => lists.with_spamtrap_usernames(usernames),
        None => lists.with_spamtrap_usernames(defaults::SPAMTRAP_USERNAMES.iter().copied()),
    }
}

//! Shape of the TOML configuration file. Every key is optional; anything
//! missing falls back to the defaults in [`VerifierConfig`](super::VerifierConfig).

use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::RiskWeights;
use crate::smtp::AmbiguousReplyPolicy;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub(crate) smtp: SmtpSection,
    #[serde(default)]
    pub(crate) dns: DnsSection,
    #[serde(default)]
    pub(crate) lists: ListsSection,
    #[serde(default)]
    pub(crate) risk: RiskWeights,
    #[serde(default)]
    pub(crate) batch: BatchSection,
    #[serde(default)]
    pub(crate) domain_age: DomainAgeSection,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpSection {
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) port: Option<u16>,
    pub(crate) helo_domains: Option<Vec<String>>,
    pub(crate) mail_from: Option<Vec<String>>,
    pub(crate) retry_count: Option<u32>,
    pub(crate) retry_delay_ms: Option<u64>,
    pub(crate) catch_all_test_count: Option<u8>,
    pub(crate) ambiguous_reply: Option<AmbiguousReplyPolicy>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsSection {
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) dkim_selectors: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListsSection {
    pub(crate) disposable_domains_file: Option<PathBuf>,
    pub(crate) free_providers: Option<Vec<String>>,
    pub(crate) role_accounts: Option<Vec<String>>,
    pub(crate) spamtrap_usernames: Option<Vec<String>>,
    pub(crate) abuse_list: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchSection {
    pub(crate) rate_limit_delay_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DomainAgeSection {
    pub(crate) enabled: Option<bool>,
}

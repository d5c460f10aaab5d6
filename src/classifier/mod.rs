//! Static reputation lookups: disposable domains, free providers, role
//! accounts, spam traps and known-abuse addresses.
//!
//! Every check is a set membership test against [`DomainLists`], which is
//! built once (from configuration) and only read afterwards.

pub(crate) mod defaults;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Which reputation list matched in [`is_spamtrap_or_abuse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListedAs {
    SpamTrap,
    Abuse,
}

/// Lookup sets consulted by the classifier. Entries are stored lower-cased;
/// role entries are additionally stripped of `.`, `-` and `_`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainLists {
    disposable: HashSet<String>,
    free_providers: HashSet<String>,
    role_accounts: HashSet<String>,
    spamtrap_usernames: HashSet<String>,
    abuse_addresses: HashSet<String>,
}

impl DomainLists {
    /// Empty sets: every check answers `false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in free-provider, role and spam-trap sets, no disposable or abuse
    /// entries.
    pub fn builtin() -> Self {
        Self::new()
            .with_free_providers(defaults::FREE_PROVIDERS.iter().copied())
            .with_role_accounts(defaults::ROLE_ACCOUNTS.iter().copied())
            .with_spamtrap_usernames(defaults::SPAMTRAP_USERNAMES.iter().copied())
    }

    pub fn with_disposable_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.disposable, domains, normalize_entry);
        self
    }

    pub fn with_free_providers<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.free_providers, domains, normalize_entry);
        self
    }

    pub fn with_role_accounts<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.role_accounts, prefixes, normalize_role);
        self
    }

    pub fn with_spamtrap_usernames<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.spamtrap_usernames, usernames, normalize_entry);
        self
    }

    pub fn with_abuse_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.abuse_addresses, addresses, normalize_entry);
        self
    }

    /// Adds the disposable domains listed in `path` (one per line, `#`
    /// comments allowed). A missing file disables the check silently.
    pub fn with_disposable_file(self, path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let domains: Vec<&str> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .collect();
                debug!(
                    path = %path.display(),
                    count = domains.len(),
                    "loaded disposable domain list"
                );
                Ok(self.with_disposable_domains(domains))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "disposable domain list not found, disposable check disabled"
                );
                Ok(self)
            }
            Err(err) => Err(err),
        }
    }

    pub fn disposable_count(&self) -> usize {
        self.disposable.len()
    }
}

pub fn is_disposable(lists: &DomainLists, domain: &str) -> bool {
    lists.disposable.contains(&normalize_entry(domain))
}

pub fn is_free_provider(lists: &DomainLists, domain: &str) -> bool {
    lists.free_providers.contains(&normalize_entry(domain))
}

/// Exact match against the role set once `.`, `-` and `_` are stripped.
pub fn is_role_account(lists: &DomainLists, local_part: &str) -> bool {
    lists.role_accounts.contains(&normalize_role(local_part))
}

/// Spam-trap usernames are matched on the local part, abuse entries on the
/// full address.
pub fn is_spamtrap_or_abuse(lists: &DomainLists, local_part: &str, email: &str) -> Option<ListedAs> {
    if lists.spamtrap_usernames.contains(&normalize_entry(local_part)) {
        return Some(ListedAs::SpamTrap);
    }
    if lists.abuse_addresses.contains(&normalize_entry(email)) {
        return Some(ListedAs::Abuse);
    }
    None
}

fn extend_normalized<I, S>(set: &mut HashSet<String>, items: I, normalize: fn(&str) -> String)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        let value = normalize(item.as_ref());
        if !value.is_empty() {
            set.insert(value);
        }
    }
}

fn normalize_entry(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn normalize_role(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests;

//! DNS lookups used by the verification pipeline.
//!
//! Every function here folds resolution failures (NXDOMAIN, no answer, no
//! nameservers, timeout) into an empty or `false` result. Nothing is retried
//! at this layer.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DnsLookup, build_resolver};
pub use types::MxRecord;

use tracing::debug;
use trust_dns_resolver::error::ResolveError;

use resolver::is_no_records;

/// MX exchanges for `domain`, most preferred first. Records sharing a
/// preference keep the order the resolver returned them in.
pub fn resolve_mx<L: DnsLookup + ?Sized>(lookup: &L, domain: &str) -> Vec<String> {
    let mut records = match lookup.lookup_mx(domain) {
        Ok(records) => records,
        Err(err) => {
            log_failure("MX", domain, &err);
            return Vec::new();
        }
    };
    records.sort_by_key(|record| record.preference);
    records
        .into_iter()
        .map(|record| record.exchange.trim_end_matches('.').to_string())
        .filter(|exchange| !exchange.is_empty())
        .collect()
}

pub fn resolve_a<L: DnsLookup + ?Sized>(lookup: &L, domain: &str) -> bool {
    lookup.lookup_a(domain).unwrap_or_else(|err| {
        log_failure("A", domain, &err);
        false
    })
}

pub fn resolve_aaaa<L: DnsLookup + ?Sized>(lookup: &L, domain: &str) -> bool {
    lookup.lookup_aaaa(domain).unwrap_or_else(|err| {
        log_failure("AAAA", domain, &err);
        false
    })
}

/// Raw TXT strings for `name` (a domain or a label under it such as
/// `_dmarc.example.com`).
pub fn resolve_txt<L: DnsLookup + ?Sized>(lookup: &L, name: &str) -> Vec<String> {
    lookup.lookup_txt(name).unwrap_or_else(|err| {
        log_failure("TXT", name, &err);
        Vec::new()
    })
}

pub(crate) fn fqdn(label: &str, domain: &str) -> String {
    let trimmed = label.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", trimmed.to_ascii_lowercase(), domain)
    }
}

fn log_failure(record: &str, name: &str, err: &ResolveError) {
    if is_no_records(err) {
        debug!(record, name, "no records");
    } else {
        debug!(record, name, error = %err, "lookup failed");
    }
}

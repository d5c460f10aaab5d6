use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    lookup::TxtLookup,
    system_conf::read_system_conf,
};

use super::{DnsError, MxRecord};

/// Raw DNS queries. Implemented for the synchronous system [`Resolver`] and by
/// test stubs; error swallowing happens one level up.
pub trait DnsLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
    fn lookup_a(&self, domain: &str) -> Result<bool, ResolveError>;
    fn lookup_aaaa(&self, domain: &str) -> Result<bool, ResolveError>;
    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError>;
}

/// Build a resolver from the system configuration, with a per-query deadline
/// of `timeout` and a single attempt per query.
pub fn build_resolver(timeout: Duration) -> Result<Resolver, DnsError> {
    let (config, mut opts) = read_system_conf().map_err(DnsError::resolver_init)?;
    opts.timeout = timeout;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(DnsError::resolver_init)
}

impl DnsLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }

    fn lookup_a(&self, domain: &str) -> Result<bool, ResolveError> {
        let lookup = Resolver::ipv4_lookup(self, domain)?;
        Ok(lookup.iter().next().is_some())
    }

    fn lookup_aaaa(&self, domain: &str) -> Result<bool, ResolveError> {
        let lookup = Resolver::ipv6_lookup(self, domain)?;
        Ok(lookup.iter().next().is_some())
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let lookup = Resolver::txt_lookup(self, name)?;
        Ok(collect_txt_records(&lookup))
    }
}

fn collect_txt_records(lookup: &TxtLookup) -> Vec<String> {
    lookup
        .iter()
        .map(|txt| {
            txt.txt_data()
                .iter()
                .map(|piece| String::from_utf8_lossy(piece))
                .collect::<String>()
        })
        .collect()
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

pub(crate) fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

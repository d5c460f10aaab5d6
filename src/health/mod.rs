//! Domain health: A record and SPF/DKIM/DMARC presence.

use serde::{Deserialize, Serialize};

use crate::dns::{self, DnsLookup, fqdn};

/// Presence flags only. A flag is set on a confirmed record and stays `false`
/// on absence or lookup failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHealth {
    #[serde(rename = "has_A")]
    pub has_a: bool,
    #[serde(rename = "has_SPF")]
    pub has_spf: bool,
    #[serde(rename = "has_DKIM")]
    pub has_dkim: bool,
    #[serde(rename = "has_DMARC")]
    pub has_dmarc: bool,
}

/// Check `domain` probing only the `default` DKIM selector.
pub fn check<L: DnsLookup + ?Sized>(lookup: &L, domain: &str) -> DomainHealth {
    check_with_selectors(lookup, domain, &["default"])
}

/// Check `domain`; `has_dkim` is set when any of `selectors` publishes a TXT
/// record under `<selector>._domainkey.<domain>`. An empty selector list
/// leaves it `false`.
pub fn check_with_selectors<L, S>(lookup: &L, domain: &str, selectors: &[S]) -> DomainHealth
where
    L: DnsLookup + ?Sized,
    S: AsRef<str>,
{
    let has_a = dns::resolve_a(lookup, domain);

    let has_spf = dns::resolve_txt(lookup, domain)
        .iter()
        .any(|record| record.to_ascii_lowercase().contains("v=spf1"));

    let has_dkim = selectors.iter().any(|selector| {
        let name = fqdn(&format!("{}._domainkey", selector.as_ref()), domain);
        !dns::resolve_txt(lookup, &name).is_empty()
    });

    let has_dmarc = !dns::resolve_txt(lookup, &fqdn("_dmarc", domain)).is_empty();

    DomainHealth {
        has_a,
        has_spf,
        has_dkim,
        has_dmarc,
    }
}

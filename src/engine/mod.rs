//! The verification pipeline.
//!
//! [`Verifier::verify`] runs, in order: normalisation, syntax, the static
//! classifier, MX resolution and domain health, then the SMTP probe. The first
//! terminal status ends the pass; the risk score is computed last from the
//! assembled result. Nothing in here returns an error: the worst outcome for
//! an address is [`Status::Unknown`].

mod age;
mod batch;
mod risk;
mod types;

pub use age::DomainAgeLookup;
pub use risk::RiskWeights;
pub use types::{Status, VerificationResult};

use tracing::{debug, info};
use trust_dns_resolver::Resolver;

use crate::classifier::{self, ListedAs};
use crate::config::VerifierConfig;
use crate::dns::{self, DnsError, DnsLookup, build_resolver};
use crate::health;
use crate::smtp::{Connector, IdentitySource, Prober, RandomIdentity, TcpConnector};
use crate::syntax::{self, Address};

/// Verification engine over a DNS backend `D` and an SMTP transport `C`.
///
/// Holds only read-only state, so one instance serves any number of
/// addresses.
pub struct Verifier<D = Resolver, C = TcpConnector> {
    config: VerifierConfig,
    dns: D,
    connector: C,
    identity: Box<dyn IdentitySource>,
    domain_age: Option<Box<dyn DomainAgeLookup>>,
}

impl Verifier {
    /// System resolver and plain TCP, with the configured DNS timeout.
    pub fn from_config(config: VerifierConfig) -> Result<Self, DnsError> {
        let resolver = build_resolver(config.dns_timeout)?;
        Ok(Self::with_backends(config, resolver, TcpConnector))
    }
}

impl<D, C> Verifier<D, C>
where
    D: DnsLookup,
    C: Connector,
{
    pub fn with_backends(config: VerifierConfig, dns: D, connector: C) -> Self {
        Self {
            config,
            dns,
            connector,
            identity: Box::new(RandomIdentity),
            domain_age: None,
        }
    }

    /// Replace the source of HELO names, senders and catch-all probe names.
    pub fn with_identity<I: IdentitySource + 'static>(mut self, identity: I) -> Self {
        self.identity = Box::new(identity);
        self
    }

    /// Attach a registration-age source. It is consulted only when domain age
    /// is enabled in the configuration.
    pub fn with_domain_age<A: DomainAgeLookup + 'static>(mut self, lookup: A) -> Self {
        self.domain_age = Some(Box::new(lookup));
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn verify(&self, raw: &str) -> VerificationResult {
        let raw = raw.trim();
        let mut result = VerificationResult::new(raw.to_lowercase());

        let address = self.run_pipeline(raw, &mut result);
        let age = address
            .as_ref()
            .and_then(|address| self.domain_age_days(&address.domain));
        result.risk_score = self.config.risk.score(&result, age);

        info!(
            email = %result.email,
            status = %result.status,
            risk = result.risk_score,
            "verified"
        );
        result
    }

    /// Fills `result` up to its terminal status. Returns the parsed address
    /// once it has passed the syntax check.
    fn run_pipeline(&self, raw: &str, result: &mut VerificationResult) -> Option<Address> {
        if raw.is_empty() {
            result.conclude(Status::Invalid, "Empty address");
            return None;
        }
        let Some(address) = Address::parse(raw) else {
            result.conclude(Status::Invalid, "Malformed address");
            return None;
        };
        if !syntax::validate(&address.email) {
            result.conclude(Status::Invalid, "Invalid email syntax");
            return None;
        }

        let lists = &self.config.lists;
        result.is_role = classifier::is_role_account(lists, &address.local_part);
        result.is_free_provider = classifier::is_free_provider(lists, &address.domain);

        if classifier::is_disposable(lists, &address.domain) {
            result.is_disposable = true;
            result.conclude(Status::Disposable, "Disposable email domain");
            return Some(address);
        }

        match classifier::is_spamtrap_or_abuse(lists, &address.local_part, &address.email) {
            Some(ListedAs::SpamTrap) => {
                result.conclude(Status::Spamtrap, "Known spam-trap username");
                return Some(address);
            }
            Some(ListedAs::Abuse) => {
                result.conclude(Status::Abuse, "Address is on the abuse list");
                return Some(address);
            }
            None => {}
        }

        let mx_records = dns::resolve_mx(&self.dns, &address.domain);
        if mx_records.is_empty() {
            result.conclude(Status::NoMx, "No MX records found for domain");
            return Some(address);
        }
        debug!(domain = %address.domain, mx = ?mx_records, "resolved exchanges");

        result.domain_health =
            health::check_with_selectors(&self.dns, &address.domain, &self.config.dkim_selectors);
        result.mx_records = mx_records;

        let report = Prober::new(&self.config.smtp, &self.connector, self.identity.as_ref())
            .probe(&address.local_part, &address.domain, &result.mx_records);
        result.smtp_code = report.smtp_code;
        result.is_catch_all = report.is_catch_all;
        result.transcript = report.transcript;
        result.conclude(Status::from(report.verdict), report.details);

        Some(address)
    }

    fn domain_age_days(&self, domain: &str) -> Option<u32> {
        if !self.config.domain_age_enabled {
            return None;
        }
        let days = self.domain_age.as_ref()?.domain_age_days(domain);
        debug!(domain, days = ?days, "domain age");
        days
    }
}

#[cfg(test)]
mod tests;

/// Registration-age source for a domain, typically backed by WHOIS/RDAP.
///
/// `None` means the age could not be determined, which never affects the
/// score.
pub trait DomainAgeLookup {
    fn domain_age_days(&self, domain: &str) -> Option<u32>;
}

impl<F> DomainAgeLookup for F
where
    F: Fn(&str) -> Option<u32>,
{
    fn domain_age_days(&self, domain: &str) -> Option<u32> {
        self(domain)
    }
}

use thiserror::Error;

/// Raised only while building the system resolver. Individual lookups never
/// fail: they degrade to "no record found".
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
}

impl DnsError {
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }
}

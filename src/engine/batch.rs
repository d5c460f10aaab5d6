use std::thread;

use tracing::debug;

use super::{VerificationResult, Verifier};
use crate::dns::DnsLookup;
use crate::smtp::Connector;

impl<D, C> Verifier<D, C>
where
    D: DnsLookup,
    C: Connector,
{
    /// Verify `addresses` one after another, pausing the configured rate-limit
    /// delay between two verifications (never after the last one).
    ///
    /// `on_result` receives the 1-based position, the total and the result as
    /// soon as each address is done.
    pub fn verify_batch<I, S, F>(&self, addresses: I, mut on_result: F) -> Vec<VerificationResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(usize, usize, &VerificationResult),
    {
        let addresses: Vec<S> = addresses.into_iter().collect();
        let total = addresses.len();
        let delay = self.config.rate_limit_delay;
        let mut results = Vec::with_capacity(total);

        let mut pending = addresses.iter().enumerate().peekable();
        while let Some((index, address)) = pending.next() {
            let result = self.verify(address.as_ref());
            on_result(index + 1, total, &result);
            results.push(result);

            if pending.peek().is_some() && !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "rate limit pause");
                thread::sleep(delay);
            }
        }
        results
    }
}

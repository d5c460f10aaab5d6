use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, distributions::Alphanumeric, seq::SliceRandom};

/// Source of the values the probe varies between sessions: the HELO name,
/// the envelope sender, and the synthetic catch-all recipients.
pub trait IdentitySource {
    fn helo_domain(&self, pool: &[String]) -> String;
    fn mail_from(&self, pool: &[String]) -> String;
    /// A local part that almost certainly names no mailbox.
    fn probe_local_part(&self) -> String;
}

const FALLBACK_HELO: &str = "localhost";

/// Picks uniformly from the configured pools and generates probe local parts
/// from a random token plus a millisecond timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentitySource for RandomIdentity {
    fn helo_domain(&self, pool: &[String]) -> String {
        pool.choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_HELO.to_string())
    }

    fn mail_from(&self, pool: &[String]) -> String {
        // An empty pool means the null sender, `MAIL FROM:<>`.
        pool.choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }

    fn probe_local_part(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        format!("{}{}", token.to_ascii_lowercase(), millis)
    }
}

use serde::{Deserialize, Serialize};

use super::{Status, VerificationResult};

const YOUNG_DOMAIN_DAYS: u32 = 90;
const NEW_DOMAIN_DAYS: u32 = 365;

/// Weights of the risk score. Penalties are positive, health bonuses
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    pub disposable_weight: i32,
    pub catch_all_weight: i32,
    pub no_mx_weight: i32,
    pub smtp_fail_weight: i32,
    pub spamtrap_weight: i32,
    pub abuse_weight: i32,
    pub spf_bonus: i32,
    pub dkim_bonus: i32,
    pub dmarc_bonus: i32,
    pub a_record_bonus: i32,
    /// Registered less than 90 days ago.
    pub young_domain_weight: i32,
    /// Registered less than a year ago (but not young).
    pub new_domain_weight: i32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            disposable_weight: 40,
            catch_all_weight: 20,
            no_mx_weight: 50,
            smtp_fail_weight: 30,
            spamtrap_weight: 80,
            abuse_weight: 60,
            spf_bonus: -5,
            dkim_bonus: -5,
            dmarc_bonus: -10,
            a_record_bonus: -5,
            young_domain_weight: 15,
            new_domain_weight: 5,
        }
    }
}

impl RiskWeights {
    /// Score a finished result, clamped to `0..=100`.
    pub fn score(&self, result: &VerificationResult, domain_age_days: Option<u32>) -> u8 {
        let mut score: i64 = 0;
        let mut add = |condition: bool, weight: i32| {
            if condition {
                score += i64::from(weight);
            }
        };

        add(result.is_disposable, self.disposable_weight);
        add(result.is_catch_all, self.catch_all_weight);
        add(result.status == Status::NoMx, self.no_mx_weight);
        add(result.status == Status::Invalid, self.smtp_fail_weight);
        add(result.status == Status::Spamtrap, self.spamtrap_weight);
        add(result.status == Status::Abuse, self.abuse_weight);

        let health = &result.domain_health;
        add(health.has_spf, self.spf_bonus);
        add(health.has_dkim, self.dkim_bonus);
        add(health.has_dmarc, self.dmarc_bonus);
        add(health.has_a, self.a_record_bonus);

        match domain_age_days {
            Some(days) if days < YOUNG_DOMAIN_DAYS => add(true, self.young_domain_weight),
            Some(days) if days < NEW_DOMAIN_DAYS => add(true, self.new_domain_weight),
            _ => {}
        }

        score.clamp(0, 100) as u8
    }
}

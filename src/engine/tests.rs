use std::io;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::*;
use crate::classifier::DomainLists;
use crate::dns::MxRecord;
use crate::dns::tests::StubDns;
use crate::smtp::tests::{FixedIdentity, MockServer, Plan, ScriptedConnector, fast_options};

fn config() -> VerifierConfig {
    VerifierConfig {
        smtp: fast_options(),
        lists: DomainLists::builtin()
            .with_disposable_domains(["mailinator.com"])
            .with_abuse_addresses(["reported@example.org"]),
        rate_limit_delay: Duration::ZERO,
        ..VerifierConfig::default()
    }
}

fn example_dns() -> StubDns {
    StubDns::new()
        .with_mx(
            "example.com",
            vec![
                MxRecord::new(20, "mx2.example.com."),
                MxRecord::new(10, "mx1.example.com."),
            ],
        )
        .with_a("example.com")
        .with_txt("example.com", ["v=spf1 include:_spf.example.com ~all"])
        .with_txt("_dmarc.example.com", ["v=DMARC1; p=none"])
}

fn verifier(dns: StubDns, connector: ScriptedConnector) -> Verifier<StubDns, ScriptedConnector> {
    Verifier::with_backends(config(), dns, connector).with_identity(FixedIdentity::default())
}

#[test]
fn role_address_on_healthy_domain_is_valid() {
    let connector = ScriptedConnector::new().host(
        "mx1.example.com",
        vec![Plan::Serve(MockServer::rcpt_split("admin@example.com", 250, 550))],
    );
    let verifier = verifier(example_dns(), connector);

    let result = verifier.verify("admin@example.com");

    assert_eq!(result.status, Status::Valid);
    assert!(result.is_role);
    assert!(!result.is_catch_all);
    assert!(!result.is_disposable);
    assert!(!result.is_free_provider);
    assert_eq!(result.smtp_code, Some(250));
    assert_eq!(result.mx_records, vec!["mx1.example.com", "mx2.example.com"]);
    assert!(result.domain_health.has_a);
    assert!(result.domain_health.has_spf);
    assert!(!result.domain_health.has_dkim);
    assert!(result.domain_health.has_dmarc);
    assert_eq!(result.risk_score, 0);
    assert_eq!(verifier.connector.connect_count("mx2.example.com"), 0);
}

#[test]
fn input_is_trimmed_and_lower_cased() {
    let connector = ScriptedConnector::new().host(
        "mx1.example.com",
        vec![Plan::Serve(MockServer::rcpt_split("bob@example.com", 250, 550))],
    );
    let result = verifier(example_dns(), connector).verify("  Bob@Example.COM ");
    assert_eq!(result.email, "bob@example.com");
    assert_eq!(result.status, Status::Valid);
}

#[test]
fn disposable_domain_skips_network() {
    let verifier = verifier(example_dns(), ScriptedConnector::new());

    let result = verifier.verify("someone@Mailinator.com");

    assert_eq!(result.status, Status::Disposable);
    assert!(result.is_disposable);
    assert_eq!(result.risk_score, 40);
    assert!(result.mx_records.is_empty());
    assert_eq!(verifier.dns.queries(), 0);
    assert!(verifier.connector.connects().is_empty());
}

#[test]
fn malformed_address_carries_fail_weight() {
    let verifier = verifier(example_dns(), ScriptedConnector::new());

    let result = verifier.verify("alice.example.com");

    assert_eq!(result.status, Status::Invalid);
    assert_eq!(result.risk_score, 30);
    assert_eq!(result.smtp_code, None);
    assert_eq!(verifier.dns.queries(), 0);
}

#[test]
fn spamtrap_and_abuse_are_terminal() {
    let verifier = verifier(example_dns(), ScriptedConnector::new());

    let trap = verifier.verify("spamtrap@example.com");
    assert_eq!(trap.status, Status::Spamtrap);
    assert_eq!(trap.risk_score, 80);

    let abuse = verifier.verify("reported@example.org");
    assert_eq!(abuse.status, Status::Abuse);
    assert_eq!(abuse.risk_score, 60);

    assert_eq!(verifier.dns.queries(), 0);
    assert!(verifier.connector.connects().is_empty());
}

#[test]
fn missing_mx_is_no_mx() {
    let verifier = verifier(StubDns::new().with_a("nomail.test"), ScriptedConnector::new());

    let result = verifier.verify("user@nomail.test");

    assert_eq!(result.status, Status::NoMx);
    assert!(result.mx_records.is_empty());
    assert_eq!(result.domain_health, Default::default());
    assert_eq!(result.risk_score, 50);
    assert!(verifier.connector.connects().is_empty());
}

#[test]
fn catch_all_domain() {
    let connector = ScriptedConnector::new().host(
        "mx1.example.com",
        vec![Plan::Serve(MockServer::rcpt_all(250))],
    );
    let result = verifier(example_dns(), connector).verify("anyone@example.com");

    assert_eq!(result.status, Status::CatchAll);
    assert!(result.is_catch_all);
    // 20 for catch-all, minus SPF, DMARC and A bonuses.
    assert_eq!(result.risk_score, 0);
}

#[test]
fn smtp_rejection_is_invalid() {
    let connector = ScriptedConnector::new().host(
        "mx1.example.com",
        vec![Plan::Serve(MockServer::rcpt_all(550))],
    );
    let dns = StubDns::new().with_mx("example.com", vec![MxRecord::new(10, "mx1.example.com")]);
    let result = verifier(dns, connector).verify("ghost@example.com");

    assert_eq!(result.status, Status::Invalid);
    assert_eq!(result.smtp_code, Some(550));
    assert!(result.details.contains("mx1.example.com"));
    assert_eq!(result.risk_score, 30);
}

#[test]
fn unreachable_exchanges_are_unknown() {
    let connector = ScriptedConnector::new()
        .host("mx1.example.com", vec![Plan::Refuse(io::ErrorKind::TimedOut)])
        .host("mx2.example.com", vec![Plan::Refuse(io::ErrorKind::ConnectionRefused)]);
    let result = verifier(example_dns(), connector).verify("alice@example.com");

    assert_eq!(result.status, Status::Unknown);
    assert!(result.details.contains("mx2.example.com"), "{}", result.details);
    assert!(result.domain_health.has_spf);
}

#[test]
fn repeated_verification_is_stable() {
    let connector = ScriptedConnector::new().host(
        "mx1.example.com",
        vec![Plan::Serve(MockServer::rcpt_split("carol@example.com", 250, 550))],
    );
    let verifier = verifier(example_dns(), connector);

    let first = verifier.verify("carol@example.com");
    let second = verifier.verify("carol@example.com");

    assert_eq!(first.status, second.status);
    assert_eq!(first.details, second.details);
    assert_eq!(first.smtp_code, second.smtp_code);
    assert_eq!(first.risk_score, second.risk_score);
    assert_eq!(first.domain_health, second.domain_health);
}

#[test]
fn domain_age_only_when_enabled() {
    let dns = StubDns::new();

    let disabled = Verifier::with_backends(config(), dns, ScriptedConnector::new())
        .with_domain_age(|_: &str| Some(30));
    assert_eq!(disabled.verify("user@young.test").risk_score, 50);

    let enabled_config = VerifierConfig {
        domain_age_enabled: true,
        ..config()
    };
    let enabled = Verifier::with_backends(enabled_config, StubDns::new(), ScriptedConnector::new())
        .with_domain_age(|_: &str| Some(30));
    assert_eq!(enabled.verify("user@young.test").risk_score, 65);

    let invalid = enabled.verify("not-an-address");
    assert_eq!(invalid.status, Status::Invalid);
    assert_eq!(invalid.risk_score, 30);
}

#[test]
fn batch_pauses_between_addresses_only() {
    let delay = Duration::from_millis(30);
    let batch_config = VerifierConfig {
        rate_limit_delay: delay,
        ..config()
    };
    let verifier = Verifier::with_backends(batch_config, StubDns::new(), ScriptedConnector::new());

    let mut seen = Vec::new();
    let started = Instant::now();
    let addresses = ["", "a@mailinator.com", "b@nomail.test"];
    let results = verifier.verify_batch(addresses, |position, total, result| {
        seen.push((position, total, result.status));
    });

    assert!(started.elapsed() >= delay * 2);
    assert_eq!(
        seen,
        vec![
            (1, 3, Status::Invalid),
            (2, 3, Status::Disposable),
            (3, 3, Status::NoMx),
        ]
    );
    assert_eq!(results.len(), 3);

    let single = Instant::now();
    verifier.verify_batch(["x@mailinator.com"], |_, _, _| {});
    assert!(single.elapsed() < Duration::from_secs(1));
}

proptest! {
    #[test]
    fn strings_without_at_are_invalid(raw in "[a-zA-Z0-9 ._%+-]{0,40}") {
        let verifier = verifier(example_dns(), ScriptedConnector::new());
        let result = verifier.verify(&raw);
        prop_assert_eq!(result.status, Status::Invalid);
        prop_assert_eq!(verifier.dns.queries(), 0);
    }

    #[test]
    fn forbidden_characters_are_invalid(
        head in "[a-z]{1,8}",
        bad in "[!#$&*()<>,;:\"]",
        tail in "[a-z]{0,5}",
    ) {
        let verifier = verifier(example_dns(), ScriptedConnector::new());
        let result = verifier.verify(&format!("{head}{bad}{tail}@example.com"));
        prop_assert_eq!(result.status, Status::Invalid);
        prop_assert!(verifier.connector.connects().is_empty());
    }
}

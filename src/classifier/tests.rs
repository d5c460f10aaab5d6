use std::path::PathBuf;

use super::*;

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "mailverify-{}-{}.txt",
        name,
        std::process::id()
    ));
    fs::write(&path, content).expect("write scratch list");
    path
}

#[test]
fn disposable_lookup_is_case_insensitive() {
    let lists = DomainLists::new().with_disposable_domains(["Mailinator.com"]);
    assert!(is_disposable(&lists, "mailinator.com"));
    assert!(is_disposable(&lists, "MAILINATOR.COM"));
    assert!(!is_disposable(&lists, "example.com"));
}

#[test]
fn disposable_file_skips_comments_and_blanks() {
    let path = scratch_file("disposable", "# throwaway\n\nyopmail.com\n  Trashmail.com  \n");
    let lists = DomainLists::new()
        .with_disposable_file(&path)
        .expect("list loads");
    fs::remove_file(&path).ok();

    assert_eq!(lists.disposable_count(), 2);
    assert!(is_disposable(&lists, "trashmail.com"));
    assert!(!is_disposable(&lists, "# throwaway"));
}

#[test]
fn missing_disposable_file_disables_check() {
    let path = std::env::temp_dir().join("mailverify-does-not-exist.txt");
    let lists = DomainLists::new()
        .with_disposable_file(&path)
        .expect("missing file is not fatal");
    assert_eq!(lists.disposable_count(), 0);
    assert!(!is_disposable(&lists, "yopmail.com"));
}

#[test]
fn builtin_free_providers() {
    let lists = DomainLists::builtin();
    assert!(is_free_provider(&lists, "gmail.com"));
    assert!(!is_free_provider(&lists, "example.com"));
}

#[test]
fn role_match_strips_separators() {
    let lists = DomainLists::builtin();
    assert!(is_role_account(&lists, "admin"));
    assert!(is_role_account(&lists, "no.reply"));
    assert!(is_role_account(&lists, "no_reply"));
    assert!(is_role_account(&lists, "do-not-reply"));
    assert!(!is_role_account(&lists, "j.o.e"));
}

#[test]
fn role_match_is_exact_not_fuzzy() {
    let lists = DomainLists::builtin();
    assert!(!is_role_account(&lists, "adminteam"));
    assert!(!is_role_account(&lists, "admin-team"));

    let custom = DomainLists::new().with_role_accounts(["admin-team"]);
    assert!(is_role_account(&custom, "admin-team"));
    assert!(is_role_account(&custom, "adminteam"));
}

#[test]
fn spamtrap_and_abuse_are_distinguished() {
    let lists = DomainLists::builtin().with_abuse_addresses(["Known.Bad@Example.com"]);
    assert_eq!(
        is_spamtrap_or_abuse(&lists, "spamtrap", "spamtrap@example.com"),
        Some(ListedAs::SpamTrap)
    );
    assert_eq!(
        is_spamtrap_or_abuse(&lists, "known.bad", "known.bad@example.com"),
        Some(ListedAs::Abuse)
    );
    assert_eq!(
        is_spamtrap_or_abuse(&lists, "alice", "alice@example.com"),
        None
    );
}

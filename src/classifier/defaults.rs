use phf::phf_set;

pub(crate) const FREE_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "yahoo.co.uk",
    "yahoo.fr",
    "ymail.com",
    "outlook.com",
    "hotmail.com",
    "hotmail.fr",
    "live.com",
    "msn.com",
    "aol.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "gmx.com",
    "gmx.de",
    "web.de",
    "mail.com",
    "yandex.com",
    "yandex.ru",
    "mail.ru",
    "protonmail.com",
    "proton.me",
    "zoho.com",
    "orange.fr",
    "free.fr",
    "laposte.net",
};

pub(crate) const ROLE_ACCOUNTS: phf::Set<&'static str> = phf_set! {
    "admin",
    "administrator",
    "webmaster",
    "postmaster",
    "hostmaster",
    "support",
    "help",
    "sales",
    "info",
    "contact",
    "billing",
    "security",
    "abuse",
    "noreply",
    "marketing",
    "jobs",
    "hr",
    "no-reply",
    "donotreply",
};

pub(crate) const SPAMTRAP_USERNAMES: phf::Set<&'static str> = phf_set! {
    "spamtrap",
    "spam-trap",
    "honeypot",
    "trap",
};

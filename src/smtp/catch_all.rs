use tracing::debug;

use super::{IdentitySource, SmtpError, SmtpReply, SmtpSession};

/// Decide whether the domain behind `session` accepts any recipient.
///
/// Runs `probes` synthetic `RCPT TO` commands on the already-accepted session,
/// each after `RSET` and a new `MAIL FROM`. Only unanimous acceptance counts
/// as catch-all; a rejection, a temporary code, or a broken session answers
/// `false`. Zero probes answers `false`.
pub(crate) fn detect_catch_all<I>(
    session: &mut SmtpSession,
    domain: &str,
    sender: &str,
    probes: u8,
    identity: &I,
) -> bool
where
    I: IdentitySource + ?Sized,
{
    if probes == 0 {
        return false;
    }

    for _ in 0..probes {
        let recipient = format!("{}@{}", identity.probe_local_part(), domain);
        match probe_recipient(session, sender, &recipient) {
            Ok(reply) if reply.is_positive_completion() => {}
            Ok(reply) => {
                debug!(
                    host = session.host(),
                    recipient = %recipient,
                    code = reply.code,
                    "synthetic recipient not accepted"
                );
                return false;
            }
            Err(err) => {
                debug!(
                    host = session.host(),
                    error = %err,
                    "catch-all probing aborted"
                );
                return false;
            }
        }
    }
    true
}

fn probe_recipient(
    session: &mut SmtpSession,
    sender: &str,
    recipient: &str,
) -> Result<SmtpReply, SmtpError> {
    session.reset()?;
    session.mail_from(sender)?;
    session.rcpt_to(recipient)
}

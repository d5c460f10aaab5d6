use std::io::{self, BufRead, BufReader, Write};
use std::time::{Duration, Instant};

use super::{Connector, SmtpError, SmtpReply, SmtpStream};

/// Longest reply line accepted, CRLF included.
const MAX_LINE_LEN: usize = 1024;
/// Lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 64;

/// One open SMTP conversation with an exchange host.
///
/// The connection is released on every exit path: [`SmtpSession::finish`]
/// sends `QUIT` and hands back the transcript, and dropping an unfinished
/// session does the same on a best-effort basis.
///
/// Each reply must arrive complete within the session timeout, however the
/// server paces its bytes.
pub struct SmtpSession {
    host: String,
    reader: BufReader<Box<dyn SmtpStream>>,
    reply_timeout: Option<Duration>,
    transcript: Vec<String>,
    broken: bool,
    closed: bool,
}

impl SmtpSession {
    /// Connect and read the greeting. A non-2xx banner is a refusal.
    pub fn open<C: Connector + ?Sized>(
        connector: &C,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Self, SmtpError> {
        let stream = connector.connect(host, port, timeout)?;
        let mut session = Self {
            host: host.to_string(),
            reader: BufReader::new(stream),
            reply_timeout: timeout,
            transcript: Vec::new(),
            broken: false,
            closed: false,
        };
        let banner = session.read_reply()?;
        if !banner.is_positive_completion() {
            return Err(SmtpError::refused(host, "greeting", banner.code));
        }
        Ok(session)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `EHLO`, falling back to `HELO` when the server refuses the extended
    /// greeting.
    pub fn hello(&mut self, name: &str) -> Result<SmtpReply, SmtpError> {
        let reply = self.command(&format!("EHLO {name}"))?;
        if reply.is_positive_completion() {
            return Ok(reply);
        }
        self.command(&format!("HELO {name}"))
    }

    pub fn mail_from(&mut self, sender: &str) -> Result<SmtpReply, SmtpError> {
        self.command(&format!("MAIL FROM:<{sender}>"))
    }

    pub fn rcpt_to(&mut self, recipient: &str) -> Result<SmtpReply, SmtpError> {
        self.command(&format!("RCPT TO:<{recipient}>"))
    }

    pub fn reset(&mut self) -> Result<SmtpReply, SmtpError> {
        self.command("RSET")
    }

    /// Close politely and return what was exchanged.
    pub fn finish(mut self) -> Vec<String> {
        self.quit();
        std::mem::take(&mut self.transcript)
    }

    fn quit(&mut self) {
        if self.closed || self.broken {
            self.closed = true;
            return;
        }
        self.closed = true;
        // The server may already be gone; the connection is dropped either way.
        let _ = self.command("QUIT");
    }

    fn command(&mut self, command: &str) -> Result<SmtpReply, SmtpError> {
        self.record("C", command);
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let stream = self.reader.get_mut();
        let sent = stream.write_all(&line).and_then(|()| stream.flush());
        if let Err(err) = sent {
            return Err(self.fail(err));
        }
        self.read_reply()
    }

    fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        let deadline = self.reply_timeout.map(|timeout| Instant::now() + timeout);
        match parse_reply(&mut self.reader, deadline) {
            Ok(reply) => {
                self.record("S", &format!("{} {}", reply.code, reply.message.replace('\n', " | ")));
                Ok(reply)
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                self.broken = true;
                Err(SmtpError::protocol(&self.host, err.to_string()))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: io::Error) -> SmtpError {
        self.broken = true;
        let err = SmtpError::io(&self.host, err);
        self.record("!", &err.to_string());
        err
    }

    fn record(&mut self, direction: &str, message: &str) {
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Read one (possibly multi-line) reply before `deadline`. Malformed or
/// oversized replies surface as `InvalidData`, a missed deadline as
/// `TimedOut`.
fn parse_reply<R: BufRead>(reader: &mut R, deadline: Option<Instant>) -> io::Result<SmtpReply> {
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        if message_lines.len() == MAX_REPLY_LINES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply longer than {MAX_REPLY_LINES} lines"),
            ));
        }
        let raw = read_line(reader, deadline)?;
        let raw = raw.trim_end_matches(['\r', '\n']);

        let code_part = raw.get(..3).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP reply: '{raw}'"),
            )
        })?;
        let parsed_code = code_part.parse::<u16>().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP status code: '{code_part}'"),
            )
        })?;
        match code {
            Some(existing) if existing != parsed_code => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                ));
            }
            Some(_) => {}
            None => code = Some(parsed_code),
        }
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        message_lines.push(raw.get(4..).unwrap_or("").to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.unwrap_or_default(),
        message: message_lines.join("\n"),
    })
}

/// One `\n`-terminated line (or what precedes EOF), capped at
/// [`MAX_LINE_LEN`] bytes.
fn read_line<R: BufRead>(reader: &mut R, deadline: Option<Instant>) -> io::Result<String> {
    let mut line = Vec::new();
    loop {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "reply not complete before the deadline",
            ));
        }
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            if line.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ));
            }
            break;
        }
        let (taken, complete) = match available.iter().position(|&byte| byte == b'\n') {
            Some(end) => (end + 1, true),
            None => (available.len(), false),
        };
        line.extend_from_slice(&available[..taken]);
        reader.consume(taken);
        if line.len() > MAX_LINE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply line longer than {MAX_LINE_LEN} bytes"),
            ));
        }
        if complete {
            break;
        }
    }
    String::from_utf8(line)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "SMTP reply is not UTF-8"))
}

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::SmtpError;

/// A bidirectional byte stream carrying one SMTP session.
pub trait SmtpStream: Read + Write {}

impl<T: Read + Write> SmtpStream for T {}

/// Opens the transport for one exchange host. The probe only ever holds one
/// connection at a time.
pub trait Connector {
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn SmtpStream>, SmtpError>;
}

/// Plain TCP on the configured port. Every resolved address of the host is
/// tried in turn; read/write deadlines mirror the connect deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn SmtpStream>, SmtpError> {
        let addrs = resolve(host, port, timeout).map_err(|err| SmtpError::connect(host, err))?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream
                        .set_read_timeout(timeout)
                        .map_err(|err| SmtpError::io(host, err))?;
                    stream
                        .set_write_timeout(timeout)
                        .map_err(|err| SmtpError::io(host, err))?;
                    return Ok(Box::new(stream));
                }
                Err(err) => last_err = Some(err),
            }
        }
        let err = last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        });
        Err(SmtpError::connect(host, err))
    }
}

/// Address lookup for `host`, abandoned once `timeout` passes. The lookup
/// thread is left to finish on its own.
fn resolve(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<Vec<SocketAddr>> {
    let Some(timeout) = timeout else {
        return (host, port).to_socket_addrs().map(|addrs| addrs.collect());
    };
    let (tx, rx) = mpsc::channel();
    let name = host.to_string();
    thread::spawn(move || {
        let found = (name.as_str(), port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>());
        let _ = tx.send(found);
    });
    match rx.recv_timeout(timeout) {
        Ok(found) => found,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "address lookup timed out",
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(io::Error::other("address lookup aborted")),
    }
}

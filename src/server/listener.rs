//! Listening socket setup

use socket2::{Domain, Protocol, Socket, Type};
use std::{io, net::SocketAddr};
use tokio::net::{lookup_host, TcpListener};

const BACKLOG: i32 = 1024;

/// Binds a TCP listener with `SO_REUSEADDR` and, on unix, `SO_REUSEPORT`.
///
/// Must be called from within a tokio runtime.
///
/// # Examples
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> std::io::Result<()> {
/// let listener = minihttpd::bind("127.0.0.1:4221".parse().unwrap())?;
/// # Ok(())
/// # }
/// ```
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    #[cfg(all(
        unix,
        not(any(target_os = "solaris", target_os = "illumos", target_os = "cygwin"))
    ))]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    TcpListener::from_std(socket.into())
}

/// Resolves `host:port`, preferring an IPv4 address when the name has both.
pub async fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{host}:{port} did not resolve to any address"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
    };

    #[tokio::test]
    async fn bind_accepts_connections() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"ping").await.unwrap();
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        client.await.unwrap();

        assert_eq!(buf, b"ping");
    }

    #[tokio::test]
    async fn resolve_localhost() {
        let addr = resolve("localhost", 4221).await.unwrap();

        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 4221);
    }

    #[tokio::test]
    async fn resolve_literal() {
        let addr = resolve("127.0.0.1", 80).await.unwrap();
        assert_eq!(addr, "127.0.0.1:80".parse().unwrap());
    }
}

//! Server configuration limits and timeouts
//!
//! # Examples
//!
//! ```no_run
//! use minihttpd::{limits::{ConnLimits, ReqLimits}, Router, Server};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = minihttpd::bind("127.0.0.1:4221".parse().unwrap())?;
//!
//!     Server::builder()
//!         .listener(listener)
//!         .handler(Router::new(None))
//!         .connection_limits(ConnLimits {
//!             socket_read_timeout: Duration::from_secs(5),
//!             ..ConnLimits::default()
//!         })
//!         .request_limits(ReqLimits {
//!             body_size: 16 * 1024, // 16KB uploads
//!             ..ReqLimits::default()
//!         })
//!         .build()?
//!         .launch()
//!         .await
//! }
//! ```

use std::time::Duration;

/// Connection-level timeouts
///
/// Every connection serves exactly one request, so these bound the whole
/// lifetime of a connection: one read phase, one write phase.
#[derive(Debug, Clone)]
pub struct ConnLimits {
    /// Maximum duration to wait for each read from the socket (default: `10 seconds`)
    ///
    /// A client that connects and stays silent, or stalls halfway through
    /// its request, is dropped without a response once this expires.
    pub socket_read_timeout: Duration,

    /// Maximum duration to wait for the response write (default: `10 seconds`)
    pub socket_write_timeout: Duration,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            socket_read_timeout: Duration::from_secs(10),
            socket_write_timeout: Duration::from_secs(10),

            _priv: (),
        }
    }
}

/// HTTP request reading limits
///
/// # Reading strategy
///
/// ```text
///  [ receive up to `buffer_size` ]
///               ||
///               \/
///   /------------------------\   No, buffer full   [-------------]
///   | CRLF CRLF in buffer?   | ==================> [ Sending 431 ]
///   \------------------------/                     [-------------]
///               || Yes
///               \/
///   /------------------------\   Yes   [-------------]
///   | Content-Length > limit | ======> [ Sending 413 ]
///   \------------------------/         [-------------]
///               || No
///               \/
///  [ read the rest of the body ]
/// ```
///
/// Without a `Content-Length` header the body is whatever arrived together
/// with the head.
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Size of a single receive and maximum size of the request head (default: `1024`)
    ///
    /// The request line and all headers must fit in this many bytes.
    pub buffer_size: usize,

    /// Maximum body size announced through `Content-Length` (default: `1 MiB`)
    pub body_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            body_size: 1024 * 1024,

            _priv: (),
        }
    }
}

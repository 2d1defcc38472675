//! Response content negotiation

use flate2::{write::GzEncoder, Compression};
use std::io::{self, Write};

/// A content coding the server can apply to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// [[RFC9110, Section 8.4.1.3](https://datatracker.ietf.org/doc/html/rfc9110#section-8.4.1.3)]
    Gzip,
}

impl Encoding {
    /// Picks an encoding from an `Accept-Encoding` value.
    ///
    /// The value is split on `", "` and matched token by token, so
    /// `"deflate, gzip"` selects gzip while `"gzip;q=1.0"` and `"deflate,gzip"`
    /// do not.
    #[inline]
    pub fn negotiate(accept_encoding: Option<&str>) -> Option<Self> {
        accept_encoding?
            .split(", ")
            .any(|token| token == Self::Gzip.as_str())
            .then_some(Self::Gzip)
    }

    /// Token for the `Content-Encoding` header.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
        }
    }

    /// Compresses the whole body in one pass.
    pub fn encode(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }
}

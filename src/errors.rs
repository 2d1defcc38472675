use crate::http::types::StatusCode;
use std::{error, fmt, io};

#[derive(Debug, PartialEq)]
pub(crate) enum ErrorKind {
    /// The request line does not hold a method, a path and a version,
    /// or the head is not valid UTF-8. Never answered.
    MalformedRequest,

    HeaderTooLarge,
    BodyTooLarge {
        declared: usize,
        limit: usize,
    },

    Io(IoError),
}

macro_rules! http_errors {
    ($($name:ident: $status:ident; )*) => {
        /// Returns the status answered for this error, `None` for errors
        /// that close the connection silently.
        pub(crate) const fn status(&self) -> Option<StatusCode> {
            match self {
                $(Self::$name { .. } => Some(StatusCode::$status),)*
                _ => None,
            }
        }
    };
}

impl ErrorKind {
    http_errors! {
        HeaderTooLarge: RequestHeaderFieldsTooLarge;
        BodyTooLarge: PayloadTooLarge;
    }

    /// Returns the prebuilt response for errors that are answered.
    #[inline]
    pub(crate) const fn as_http(&self) -> Option<&'static [u8]> {
        match self.status() {
            Some(status) => Some(status.to_empty_response()),
            None => None,
        }
    }
}

impl error::Error for ErrorKind {}
impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRequest => f.write_str("malformed request line"),
            Self::HeaderTooLarge => f.write_str("request head exceeds the read buffer"),
            Self::BodyTooLarge { declared, limit } => {
                write!(f, "declared body of {declared} bytes exceeds limit of {limit}")
            }
            Self::Io(e) => write!(f, "i/o error: {}", e.0),
        }
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(IoError(err))
    }
}

#[derive(Debug)]
pub(crate) struct IoError(pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::*;

    #[test]
    fn as_http() {
        #[rustfmt::skip]
        let cases = [
            (ErrorKind::MalformedRequest, None, None),
            (
                ErrorKind::HeaderTooLarge,
                Some(StatusCode::RequestHeaderFieldsTooLarge),
                Some("HTTP/1.1 431 Request Header Fields Too Large\r\nContent-Length: 0\r\n\r\n"),
            ),
            (
                ErrorKind::BodyTooLarge { declared: 10, limit: 5 },
                Some(StatusCode::PayloadTooLarge),
                Some("HTTP/1.1 413 Payload Too Large\r\nContent-Length: 0\r\n\r\n"),
            ),
            (io::Error::from(io::ErrorKind::TimedOut).into(), None, None),
        ];

        for (error, status, expected) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.as_http().map(str_op), expected);
        }
    }

    #[test]
    fn io_errors_compare_by_kind() {
        let a: ErrorKind = io::Error::new(io::ErrorKind::BrokenPipe, "a").into();
        let b: ErrorKind = io::Error::new(io::ErrorKind::BrokenPipe, "b").into();
        let c: ErrorKind = io::Error::new(io::ErrorKind::TimedOut, "a").into();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

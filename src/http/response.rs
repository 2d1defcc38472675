//! HTTP response builder writing straight into the outgoing buffer.

use crate::http::types::StatusCode;
use std::{borrow::Cow, sync::Arc};

/// HTTP response builder for constructing server responses.
///
/// Build responses by chaining methods in strict order:
/// [`status()`](Response::status) -> headers -> [`body()`](Response::body)
/// or [`end()`](Response::end).
///
/// Instances are created by the server and passed to
/// [`Handler::handle`](crate::Handler::handle).
///
/// # Examples
/// ```
/// use minihttpd::{Handled, Request, Response, StatusCode};
///
/// // In your implementation `Handler`
/// async fn handle(_req: &Request, resp: &mut Response) -> Handled {
///     resp.status(StatusCode::Ok)
///         .header("Content-Type", "text/plain")
///         .body("Hello World")
/// }
/// ```
///
/// # Panics
/// All methods perform order checks in `debug` mode that panic on violations.
#[derive(Debug)]
pub struct Response {
    buffer: Vec<u8>,
    status: Option<StatusCode>,
    state: ResponseState,
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Handled(());

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResponseState {
    Clean,
    Headers,
    Complete,
}

impl Response {
    #[inline(always)]
    pub(crate) fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
            status: None,
            state: ResponseState::Clean,
        }
    }

    #[inline(always)]
    pub(crate) fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[inline(always)]
    pub(crate) fn status_code(&self) -> Option<StatusCode> {
        self.status
    }

    #[inline(always)]
    pub(crate) fn is_complete(&self) -> bool {
        self.state == ResponseState::Complete
    }
}

impl Response {
    /// Sets the HTTP status code for the response.
    ///
    /// # Panics
    /// Error message: `Must be first and called only once`
    #[inline]
    #[track_caller]
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Clean,
            "Must be first and called only once"
        );

        self.buffer.extend_from_slice(status.to_first_line());
        self.status = Some(status);
        self.state = ResponseState::Headers;
        self
    }

    /// Adds a header to the response.
    ///
    /// PLEASE DO NOT ADD `Content-Length`, it is calculated by
    /// [`body()`](Response::body).
    ///
    /// # Examples
    /// ```
    /// # minihttpd::run_test(|_, resp| {
    /// use minihttpd::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header("Content-Type", "text/plain")
    ///     .header("Content-Encoding", "gzip")
    ///     .body(vec![0x1f_u8, 0x8b])
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    #[inline]
    #[track_caller]
    pub fn header<V: WriteBuffer>(&mut self, name: &str, value: V) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        self.buffer.extend_from_slice(name.as_bytes());
        self.buffer.extend_from_slice(b": ");
        value.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Sets the response body and finalizes the response.
    ///
    /// Emits `Content-Length` with the exact byte length of `data`, even
    /// when it is empty. The bytes are appended as-is.
    ///
    /// # Examples
    /// ```
    /// # minihttpd::run_test(|_, resp| {
    /// use minihttpd::StatusCode;
    ///
    /// resp.status(StatusCode::Created)
    ///     .header("Content-Type", "text/plain")
    ///     .body("")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and any header methods`
    #[inline]
    #[track_caller]
    pub fn body<T: WriteBuffer>(&mut self, data: T) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        let mut body = Vec::new();
        data.write_to(&mut body);

        self.buffer.extend_from_slice(b"Content-Length: ");
        body.len().write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b"\r\n\r\n");
        self.buffer.extend_from_slice(&body);
        self.state = ResponseState::Complete;

        Handled(())
    }

    /// Finalizes the response without a body and without `Content-Length`.
    ///
    /// With no headers this is the bare `HTTP/1.1 200 OK\r\n\r\n` form.
    ///
    /// # Panics
    /// Error message: `Must be called after status() and any header methods`
    #[inline]
    #[track_caller]
    pub fn end(&mut self) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        self.buffer.extend_from_slice(b"\r\n");
        self.state = ResponseState::Complete;

        Handled(())
    }

    #[inline]
    const fn number_to_bytes(mut n: u128) -> ([u8; 39], usize) {
        let mut buffer = [b'0'; 39];
        let mut i = 39;

        if n == 0 {
            return (buffer, 38);
        }

        while n > 0 {
            i -= 1;
            buffer[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }

        (buffer, i)
    }
}

/// Trait for writing data to the [`Response`] buffer.
///
/// Implemented for strings, byte containers and unsigned integers.
///
/// # Example
/// ```
/// use minihttpd::WriteBuffer;
///
/// struct MyString(String);
///
/// impl WriteBuffer for MyString {
///     fn write_to(&self, buffer: &mut Vec<u8>) {
///         buffer.extend_from_slice(self.0.as_bytes())
///     }
/// }
/// ```
pub trait WriteBuffer {
    /// Writes the value's representation directly to the buffer.
    fn write_to(&self, buffer: &mut Vec<u8>);
}

macro_rules! impl_write_buffer {
    (bytes, $conn:expr => $($t:ty),*) => {
        $(impl WriteBuffer for $t {
            #[inline] fn write_to(&self, buffer: &mut Vec<u8>) {
                let closure = $conn;
                closure(self, buffer);
            }
        })*
    };
    (number => $($t:ty),*) => {
        $(impl WriteBuffer for $t {
            #[inline] fn write_to(&self, buffer: &mut Vec<u8>) {
                let (arr, start) = Response::number_to_bytes(*self as u128);
                buffer.extend_from_slice(&arr[start..]);
            }
        })*
    };
}

impl<T: WriteBuffer + ?Sized> WriteBuffer for &T {
    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        T::write_to(*self, buffer);
    }
}
impl WriteBuffer for str {
    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(self.as_bytes());
    }
}
impl WriteBuffer for [u8] {
    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(self);
    }
}
impl<const N: usize> WriteBuffer for [u8; N] {
    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(self);
    }
}
impl_write_buffer! {
    bytes, |value: &str, buffer: &mut Vec<u8>| {
        buffer.extend_from_slice(value.as_bytes());
    } => String, Box<str>, Cow<'_, str>, Arc<str>
}
impl_write_buffer! {
    bytes, |value: &[u8], buffer: &mut Vec<u8>| {
        buffer.extend_from_slice(value);
    } => Vec<u8>, Box<[u8]>, Cow<'_, [u8]>, Arc<[u8]>
}
impl_write_buffer! {
    number => u8, u16, u32, u64, usize
}

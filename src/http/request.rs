use crate::{
    errors::ErrorKind,
    http::types::{Headers, Method},
    limits::ReqLimits,
};
use memchr::memmem;
use std::{io, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::timeout,
};

/// A decoded HTTP request.
///
/// # Input data requirements
///
/// #### General designations
/// - `SP`: ASCII space (0x20)
/// - `CRLF`: Carriage return + line feed (`"\r\n"`) - **exactly this sequence required**
///
/// ## First line
///
/// ```text
/// [METHOD] SP [PATH] SP [VERSION] CRLF
/// ```
///
/// The line is split on single spaces into three tokens. Fewer tokens, an
/// empty method or a path that does not start with `/` make the request
/// malformed: the connection is closed without an answer.
///
/// Extra spaces are not rejected: everything after the second space is the
/// version, so `GET /a b HTTP/1.1` has path `/a` and version `b HTTP/1.1`.
///
/// ## Header
///
/// ```text
/// [NAME] ": " [VALUE] CRLF
/// ```
///
/// The line is split once on the first `": "`. Lines without that separator
/// are skipped. A repeated name overwrites the earlier value (see [`Headers`]).
///
/// ## Body
///
/// Everything after the first empty line. The body is kept as raw bytes and
/// never decoded, only the head has to be `UTF-8`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    version: String,

    headers: Headers,
    body: Vec<u8>,
}

// Public API
impl Request {
    #[inline(always)]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request target exactly as received, always starting with `/`.
    #[inline(always)]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline(always)]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline(always)]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the header value stored under `name` (case-sensitive).
    #[inline(always)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the parsed `Content-Length` header, if present and numeric.
    #[inline]
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")?.trim().parse().ok()
    }

    /// Returns the raw request body, empty when none was sent.
    #[inline(always)]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

// Parse
impl Request {
    const HEAD_END: &'static [u8] = b"\r\n\r\n";

    pub(crate) fn parse(src: &[u8]) -> Result<Self, ErrorKind> {
        let (head, body) = match memmem::find(src, Self::HEAD_END) {
            Some(pos) => (&src[..pos], &src[pos + Self::HEAD_END.len()..]),
            None => (src, &[][..]),
        };

        let head = simdutf8::basic::from_utf8(head).map_err(|_| ErrorKind::MalformedRequest)?;
        let mut lines = head.split("\r\n");

        let (method, path, version) = Self::parse_first_line(lines.next().unwrap_or_default())?;

        let mut headers = Headers::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(": ") {
                headers.insert(name, value);
            }
        }

        Ok(Request {
            method,
            path: path.to_owned(),
            version: version.to_owned(),
            headers,
            body: body.to_vec(),
        })
    }

    #[inline]
    fn parse_first_line(line: &str) -> Result<(Method, &str, &str), ErrorKind> {
        let mut tokens = line.splitn(3, ' ');

        let (Some(method), Some(path), Some(version)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ErrorKind::MalformedRequest);
        };

        if method.is_empty() || !path.starts_with('/') {
            return Err(ErrorKind::MalformedRequest);
        }

        Ok((Method::from_token(method), path, version))
    }
}

//

/// Reads a single request from a stream according to [`ReqLimits`].
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    limits: &'a ReqLimits,
    read_timeout: Duration,
}

impl<'a> Parser<'a> {
    #[inline(always)]
    pub(crate) fn new(limits: &'a ReqLimits, read_timeout: Duration) -> Self {
        Self {
            limits,
            read_timeout,
        }
    }

    /// Returns `Ok(None)` when the peer closed the connection before sending anything.
    pub(crate) async fn read_request<R>(&self, stream: &mut R) -> Result<Option<Request>, ErrorKind>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = vec![0; self.limits.buffer_size];
        let mut len = 0;

        loop {
            if memmem::find(&buffer[..len], Request::HEAD_END).is_some() {
                break;
            }
            if len == buffer.len() {
                return Err(ErrorKind::HeaderTooLarge);
            }

            let n = self.fill(stream, &mut buffer[len..]).await?;
            if n == 0 {
                break;
            }
            len += n;
        }

        if len == 0 {
            return Ok(None);
        }

        let mut request = Request::parse(&buffer[..len])?;
        self.complete_body(stream, &mut request).await?;

        Ok(Some(request))
    }

    async fn complete_body<R>(&self, stream: &mut R, request: &mut Request) -> Result<(), ErrorKind>
    where
        R: AsyncRead + Unpin,
    {
        let Some(declared) = request.content_length() else {
            return Ok(());
        };

        if declared > self.limits.body_size {
            return Err(ErrorKind::BodyTooLarge {
                declared,
                limit: self.limits.body_size,
            });
        }

        let mut received = request.body.len();
        if received >= declared {
            request.body.truncate(declared);
            return Ok(());
        }

        request.body.resize(declared, 0);
        while received < declared {
            let n = self.fill(stream, &mut request.body[received..]).await?;
            if n == 0 {
                break;
            }
            received += n;
        }
        request.body.truncate(received);

        Ok(())
    }

    #[inline]
    async fn fill<R>(&self, stream: &mut R, buf: &mut [u8]) -> Result<usize, ErrorKind>
    where
        R: AsyncRead + Unpin,
    {
        let n = timeout(self.read_timeout, stream.read(buf))
            .await
            .map_err(io::Error::from)??;

        Ok(n)
    }
}

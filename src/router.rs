//! Static route table and dispatch
//!
//! Routes are checked top to bottom and the first match wins:
//!
//! | Method | Pattern        | Endpoint                  |
//! |--------|----------------|---------------------------|
//! | `GET`  | `/echo/*`      | echo with gzip negotiation |
//! | any    | `/echo/*`      | plain echo                |
//! | any    | `/user-agent`  | `User-Agent` reflection   |
//! | `GET`  | `/files/*`     | file read                 |
//! | `POST` | `/files/*`     | file write                |
//! | any    | `/files/*`     | not found                 |
//! | any    | `/`            | root                      |
//!
//! Everything else is answered with `404 Not Found`.

use crate::{
    handlers,
    http::{
        request::Request,
        response::{Handled, Response},
        types::Method,
    },
    server::server_impl::Handler,
    store::FileStore,
};
use tracing::debug;

/// Method side of a [`Route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Get,
    Post,
}

/// Path side of a [`Route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Matches the path exactly.
    Exact(&'static str),
    /// Matches any path starting with the prefix. The remainder is handed to
    /// the endpoint and may be empty or contain further slashes.
    Prefix(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    EchoNegotiated,
    Echo,
    UserAgent,
    FileRead,
    FileWrite,
    Root,
    NotFound,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub method: MethodFilter,
    pub pattern: Pattern,
    pub endpoint: Endpoint,
}

#[rustfmt::skip]
pub const ROUTES: &[Route] = &[
    Route { method: MethodFilter::Get,  pattern: Pattern::Prefix("/echo/"),     endpoint: Endpoint::EchoNegotiated },
    Route { method: MethodFilter::Any,  pattern: Pattern::Prefix("/echo/"),     endpoint: Endpoint::Echo },
    Route { method: MethodFilter::Any,  pattern: Pattern::Exact("/user-agent"), endpoint: Endpoint::UserAgent },
    Route { method: MethodFilter::Get,  pattern: Pattern::Prefix("/files/"),    endpoint: Endpoint::FileRead },
    Route { method: MethodFilter::Post, pattern: Pattern::Prefix("/files/"),    endpoint: Endpoint::FileWrite },
    Route { method: MethodFilter::Any,  pattern: Pattern::Prefix("/files/"),    endpoint: Endpoint::NotFound },
    Route { method: MethodFilter::Any,  pattern: Pattern::Exact("/"),           endpoint: Endpoint::Root },
];

impl MethodFilter {
    #[inline]
    pub fn accepts(self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Get => *method == Method::Get,
            Self::Post => *method == Method::Post,
        }
    }
}

impl Pattern {
    /// Returns the part of `path` left after the pattern, `""` for exact matches.
    #[inline]
    pub fn matches<'p>(self, path: &'p str) -> Option<&'p str> {
        match self {
            Self::Exact(exact) => (path == exact).then_some(""),
            Self::Prefix(prefix) => path.strip_prefix(prefix),
        }
    }
}

impl Route {
    #[inline]
    pub fn matches<'p>(&self, method: &Method, path: &'p str) -> Option<&'p str> {
        match self.method.accepts(method) {
            true => self.pattern.matches(path),
            false => None,
        }
    }
}

/// Dispatches requests over [`ROUTES`].
///
/// File routes need a [`FileStore`]. Without one they answer
/// `404 Not Found`.
///
/// # Examples
/// ```no_run
/// use minihttpd::{FileStore, Router, Server};
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     Server::builder()
///         .listener(minihttpd::bind("127.0.0.1:4221".parse().unwrap())?)
///         .handler(Router::new(Some(FileStore::new("/tmp"))))
///         .build()?
///         .launch()
///         .await
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    store: Option<FileStore>,
}

impl Router {
    #[inline]
    pub fn new(store: Option<FileStore>) -> Self {
        Self { store }
    }

    #[inline]
    pub fn store(&self) -> Option<&FileStore> {
        self.store.as_ref()
    }

    /// Finds the endpoint for a request and the path remainder it receives.
    pub fn route<'p>(method: &Method, path: &'p str) -> (Endpoint, &'p str) {
        ROUTES
            .iter()
            .find_map(|route| Some((route.endpoint, route.matches(method, path)?)))
            .unwrap_or((Endpoint::NotFound, ""))
    }

    pub async fn dispatch(&self, req: &Request, resp: &mut Response) -> Handled {
        let (endpoint, rest) = Self::route(req.method(), req.path());
        debug!(method = req.method().as_str(), path = req.path(), ?endpoint, "Routing request");

        match endpoint {
            Endpoint::EchoNegotiated => handlers::echo_negotiated(req, rest, resp),
            Endpoint::Echo => handlers::echo(rest, resp),
            Endpoint::UserAgent => handlers::user_agent(req, resp),
            Endpoint::FileRead => handlers::file_read(self.store(), rest, resp).await,
            Endpoint::FileWrite => {
                handlers::file_write(self.store(), rest, req.body(), resp).await
            }
            Endpoint::Root => handlers::root(resp),
            Endpoint::NotFound => handlers::not_found(resp),
        }
    }
}

impl Handler for Router {
    #[inline]
    async fn handle(&self, request: &Request, response: &mut Response) -> Handled {
        self.dispatch(request, response).await
    }
}


#[cfg(test)]
mod dispatch_tests {
    use super::*;
    use crate::tools::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    async fn respond(router: &Router, raw: &[u8]) -> Vec<u8> {
        let request = Request::parse(raw).unwrap();
        let mut response = Response::new();

        router.dispatch(&request, &mut response).await;
        assert!(response.is_complete());

        response.buffer().to_vec()
    }

    #[tokio::test]
    async fn text_routes() {
        let router = Router::new(None);

        #[rustfmt::skip]
        let cases = [
            (
                "GET / HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\n\r\n",
            ),
            (
                "GET /unknown/path HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\n\r\n",
            ),
            (
                "GET /echo/abc HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc",
            ),
            (
                "POST /echo/a/b HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\na/b",
            ),
            (
                "GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-encoding\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc",
            ),
            (
                "GET /user-agent HTTP/1.1\r\nUser-Agent: test-agent/1.0\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 14\r\n\r\ntest-agent/1.0",
            ),
            (
                "GET /user-agent HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                "GET /files/a HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                "PUT /files/a HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\n\r\n",
            ),
        ];

        for (request, expected) in cases {
            assert_eq!(
                str_op(&respond(&router, request.as_bytes()).await),
                expected,
                "{request:?}"
            );
        }
    }

    #[tokio::test]
    async fn gzip_echo() {
        let router = Router::new(None);
        let raw = b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: deflate, gzip\r\n\r\n";

        let buffer = respond(&router, raw).await;
        let split = buffer.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        let (head, body) = buffer.split_at(split);

        assert_eq!(
            str_op(head),
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\
                 Content-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
                body.len()
            )
        );

        let mut decoded = String::new();
        GzDecoder::new(body).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "abc");
    }

    #[tokio::test]
    async fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let router = Router::new(Some(FileStore::new(dir.path())));

        let mut upload = b"POST /files/blob HTTP/1.1\r\nContent-Length: 4\r\n\r\n".to_vec();
        upload.extend_from_slice(&[0x00, 0xff, b'\r', b'\n']);

        assert_eq!(
            str_op(&respond(&router, &upload).await),
            "HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
        );

        let mut expected =
            b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 4\r\n\r\n"
                .to_vec();
        expected.extend_from_slice(&[0x00, 0xff, b'\r', b'\n']);

        let first = respond(&router, b"GET /files/blob HTTP/1.1\r\n\r\n").await;
        let second = respond(&router, b"GET /files/blob HTTP/1.1\r\n\r\n").await;
        assert_eq!(first, expected);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn file_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob"), b"x").unwrap();
        let router = Router::new(Some(FileStore::new(dir.path())));

        #[rustfmt::skip]
        let cases = [
            (
                "GET /files/never-written HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                "GET /files/../secret HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                "POST /files/ HTTP/1.1\r\n\r\nx",
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                // A regular file used as a directory fails with an i/o error
                "GET /files/blob/inner HTTP/1.1\r\n\r\n",
                "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                "POST /files/missing/dir HTTP/1.1\r\n\r\nx",
                "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
        ];

        for (request, expected) in cases {
            assert_eq!(
                str_op(&respond(&router, request.as_bytes()).await),
                expected,
                "{request:?}"
            );
        }
    }
}

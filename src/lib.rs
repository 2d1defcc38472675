//! minihttpd - Minimal HTTP/1.1 server with echo, user-agent and file routes
//!
//! Every accepted connection is served by its own tokio task which reads one
//! request, dispatches it, writes one response and closes the socket.
//!
//! # Routes
//!
//! - `GET /echo/{text}`: echoes `{text}`, gzip-compressed when the client
//!   accepts it. Other methods echo without compression.
//! - `/user-agent`: echoes the `User-Agent` header.
//! - `GET /files/{name}`, `POST /files/{name}`: read and write files under
//!   the configured directory.
//! - `/`: empty `200 OK`.
//!
//! Anything else is answered with `404 Not Found`. See [`router`] for the
//! full table.
//!
//! # Examples
//!
//! Serving the built-in routes:
//! ```no_run
//! use minihttpd::{FileStore, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let addr = minihttpd::resolve("localhost", 4221).await?;
//!
//!     Server::builder()
//!         .listener(minihttpd::bind(addr)?)
//!         .handler(Router::new(Some(FileStore::new("/tmp/"))))
//!         .build()?
//!         .launch()
//!         .await
//! }
//! ```
//! A handler of your own:
//! ```no_run
//! use minihttpd::{Handled, Handler, Request, Response, Server, StatusCode};
//!
//! struct MyHandler;
//!
//! impl Handler for MyHandler {
//!     async fn handle(&self, req: &Request, resp: &mut Response) -> Handled {
//!         match req.path().strip_prefix("/hello/") {
//!             Some(name) => resp
//!                 .status(StatusCode::Ok)
//!                 .header("Content-Type", "text/plain")
//!                 .body(format!("Hello, {name}!")),
//!             None => resp.status(StatusCode::NotFound).end(),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     Server::builder()
//!         .listener(minihttpd::bind("127.0.0.1:8080".parse().unwrap())?)
//!         .handler(MyHandler)
//!         .build()?
//!         .launch()
//!         .await
//! }
//! ```

pub(crate) mod http {
    pub(crate) mod encoding;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod listener;
    pub(crate) mod server_impl;
}
pub mod config;
pub(crate) mod errors;
pub(crate) mod handlers;
pub mod limits;
pub mod router;
pub(crate) mod store;

pub use crate::{
    http::{
        encoding::Encoding,
        request::Request,
        response::{Handled, Response, WriteBuffer},
        types::{Header, Headers, Method, StatusCode},
    },
    router::Router,
    server::{
        listener::{bind, resolve},
        server_impl::{Handler, Server, ServerBuilder},
    },
    store::{FileStore, StoreError},
};

#[doc(hidden)]
pub fn run_test<F: FnOnce(&Request, &mut Response) -> Handled>(f: F) {
    if let Ok(request) = Request::parse(b"GET / HTTP/1.1\r\n\r\n") {
        f(&request, &mut Response::new());
    }
}

#[cfg(test)]
pub mod tools {
    use std::str::from_utf8;

    #[inline]
    pub fn str_op(value: &[u8]) -> &str {
        from_utf8(value).unwrap()
    }
}

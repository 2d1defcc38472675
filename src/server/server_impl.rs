use crate::{
    http::{
        request::Request,
        response::{Handled, Response},
    },
    limits::{ConnLimits, ReqLimits},
    server::connection::HttpConnection,
};
use std::{
    future::Future,
    io,
    marker::{Send, Sync},
    net::SocketAddr,
    sync::Arc,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tracing::{debug, error, info, info_span, Instrument};

/// A trait for handling HTTP requests and generating responses.
///
/// `&self` is shared by every connection, so it holds read-only state such
/// as a [`FileStore`](crate::FileStore).
///
/// # Examples
///
/// ```
/// use minihttpd::{Handler, Request, Response, Handled, StatusCode};
///
/// struct MyHandler;
///
/// impl Handler for MyHandler {
///     async fn handle(&self, req: &Request, resp: &mut Response) -> Handled {
///         if req.path() == "/ping" {
///             resp.status(StatusCode::Ok).body("pong")
///         } else {
///             resp.status(StatusCode::NotFound).end()
///         }
///     }
/// }
/// ```
pub trait Handler
where
    Self: Sync + Send + 'static,
{
    /// Processes one HTTP request and finalizes the response.
    ///
    /// Implementations should handle errors internally and set an appropriate
    /// status on the response. Panics terminate the connection without an
    /// answer.
    fn handle(&self, request: &Request, response: &mut Response) -> impl Future<Output = Handled> + Send;
}

/// An HTTP server that answers one request per connection.
///
/// Every accepted connection gets its own tokio task, so a slow client never
/// holds up the accept loop.
///
/// # Examples
///
/// ```no_run
/// use minihttpd::{Router, Server};
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     Server::builder()
///         .listener(minihttpd::bind("127.0.0.1:4221".parse().unwrap())?)
///         .handler(Router::new(None))
///         .build()?
///         .launch()
///         .await
/// }
/// ```
pub struct Server<H: Handler> {
    listener: TcpListener,
    handler: Arc<H>,
    limits: Arc<AllLimits>,
}

impl Server<()> {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder() -> ServerBuilder<()> {
        ServerBuilder {
            listener: None,
            handler: (),
            request_limits: None,
            connection_limits: None,
        }
    }
}

impl<H: Handler> Server<H> {
    /// Address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections.
    ///
    /// Only returns on an accept failure: the error is logged, the listener
    /// is dropped and the error is handed back to the caller. Connections
    /// already accepted keep running on their own tasks.
    pub async fn launch(self) -> io::Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Server started");
        }

        let Self {
            listener,
            handler,
            limits,
        } = self;

        accept_loop(|| listener.accept(), &handler, &limits).await
    }
}

/// Spawns a connection task for every accepted stream until `accept` fails.
async fn accept_loop<H, S, A, F>(mut accept: A, handler: &Arc<H>, limits: &Arc<AllLimits>) -> io::Result<()>
where
    H: Handler,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    A: FnMut() -> F,
    F: Future<Output = io::Result<(S, SocketAddr)>>,
{
    loop {
        let (mut stream, peer) = match accept().await {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                return Err(e);
            }
        };
        info!(%peer, "Connection from");

        let conn = HttpConnection::new(handler.clone(), limits.clone());

        tokio::spawn(
            async move {
                if let Err(e) = conn.run(&mut stream).await {
                    debug!(error = %e, "Connection closed with error");
                }
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}

impl Handler for () {
    #[inline]
    async fn handle(&self, _: &Request, response: &mut Response) -> Handled {
        response.status(crate::StatusCode::NotFound).end()
    }
}

//

/// Builder for configuring and creating [`Server`] instances.
///
/// [`listener`](Self::listener) is required, [`build`](Self::build) fails
/// without it.
pub struct ServerBuilder<H> {
    listener: Option<TcpListener>,
    handler: H,

    request_limits: Option<ReqLimits>,
    connection_limits: Option<ConnLimits>,
}

impl<H> ServerBuilder<H> {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.** See [`bind`](crate::bind) for a
    /// listener with address reuse enabled.
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the request handler that will process incoming requests.
    ///
    /// Defaults to a handler answering `404 Not Found` to everything.
    #[inline(always)]
    pub fn handler<NewH: Handler>(self, handler: NewH) -> ServerBuilder<NewH> {
        ServerBuilder {
            listener: self.listener,
            handler,
            request_limits: self.request_limits,
            connection_limits: self.connection_limits,
        }
    }

    /// Configures socket timeouts.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # #[tokio::main]
    /// # async fn main() -> std::io::Result<()> {
    /// use minihttpd::{limits::ConnLimits, Router, Server};
    /// use std::time::Duration;
    ///
    /// let server = Server::builder()
    ///     .listener(minihttpd::bind("127.0.0.1:4221".parse().unwrap())?)
    ///     .handler(Router::new(None))
    ///     .connection_limits(ConnLimits {
    ///         // Your changes
    ///         socket_read_timeout: Duration::from_secs(5),
    ///         socket_write_timeout: Duration::from_secs(2),
    ///         ..ConnLimits::default() // Required line
    ///     })
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.connection_limits = Some(limits);
        self
    }

    /// Configures request reading limits.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # #[tokio::main]
    /// # async fn main() -> std::io::Result<()> {
    /// use minihttpd::{limits::ReqLimits, Router, Server};
    ///
    /// let server = Server::builder()
    ///     .listener(minihttpd::bind("127.0.0.1:4221".parse().unwrap())?)
    ///     .handler(Router::new(None))
    ///     .request_limits(ReqLimits {
    ///         // Your changes
    ///         buffer_size: 4096,
    ///         body_size: 64 * 1024,
    ///         ..ReqLimits::default() // Required line
    ///     })
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }
}

impl<H: Handler> ServerBuilder<H> {
    /// Finalizes the builder and constructs a [`Server`] instance.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::InvalidInput`] when [`listener`](Self::listener) was
    /// not called.
    #[inline]
    pub fn build(self) -> io::Result<Server<H>> {
        let listener = self.listener.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "The `listener` method must be called to create",
            )
        })?;

        Ok(Server {
            listener,
            handler: Arc::new(self.handler),
            limits: Arc::new((
                self.connection_limits.unwrap_or_default(),
                self.request_limits.unwrap_or_default(),
            )),
        })
    }
}

pub(crate) type AllLimits = (ConnLimits, ReqLimits);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn build_requires_listener() {
        let err = Server::builder().handler(Router::new(None)).build().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn accept_error_stops_the_loop() {
        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(b"GET /echo/last HTTP/1.1\r\n\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let mut accepts = vec![
            Err(io::Error::from(io::ErrorKind::ConnectionAborted)),
            Ok((server, peer)),
        ];

        let result = accept_loop(
            move || {
                let next = accepts.pop();
                async move { next.unwrap_or_else(|| Err(io::ErrorKind::Other.into())) }
            },
            &Arc::new(Router::new(None)),
            &Arc::new((ConnLimits::default(), ReqLimits::default())),
        )
        .await;

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::ConnectionAborted);

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert_eq!(
            response,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\nlast"
        );
    }

    #[tokio::test]
    async fn default_handler_answers_not_found() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::builder().listener(listener).build().unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.launch());

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert_eq!(response, b"HTTP/1.1 404 Not Found\r\n\r\n");
    }
}

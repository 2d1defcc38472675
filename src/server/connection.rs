use crate::{
    errors::ErrorKind,
    http::{request::Parser, response::Response, types::StatusCode},
    server::server_impl::{AllLimits, Handler},
};
use std::{io, sync::Arc};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Drives one connection through read, dispatch, write and close.
pub(crate) struct HttpConnection<H: Handler> {
    handler: Arc<H>,
    limits: Arc<AllLimits>,
}

impl<H: Handler> HttpConnection<H> {
    #[inline]
    pub(crate) fn new(handler: Arc<H>, limits: Arc<AllLimits>) -> Self {
        Self { handler, limits }
    }

    /// Serves a single request and shuts the write side down.
    ///
    /// Malformed requests are dropped without an answer, oversized ones get
    /// their prebuilt error response. Only socket errors are returned.
    pub(crate) async fn run<S>(&self, stream: &mut S) -> Result<(), io::Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = match self.impl_run(stream).await {
            Ok(()) => Ok(()),
            Err(ErrorKind::Io(e)) => Err(e.0),
            Err(err) => match err.as_http() {
                Some(response) => {
                    info!(
                        error = %err,
                        status = err.status().map(StatusCode::as_u16),
                        reason = err.status().map(StatusCode::reason),
                        "Rejecting request"
                    );
                    let result = self.write_bytes(stream, response).await;

                    let _ = stream.shutdown().await;
                    self.discard_input(stream).await;
                    return result;
                }
                None => {
                    debug!(error = %err, "Dropping connection without response");
                    Ok(())
                }
            },
        };

        let _ = stream.shutdown().await;
        result
    }

    #[inline(always)]
    async fn impl_run<S>(&self, stream: &mut S) -> Result<(), ErrorKind>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (conn_limits, req_limits) = &*self.limits;

        let Some(request) = Parser::new(req_limits, conn_limits.socket_read_timeout)
            .read_request(stream)
            .await?
        else {
            debug!("Peer closed before sending a request");
            return Ok(());
        };

        let mut response = Response::new();
        self.handler.handle(&request, &mut response).await;
        debug_assert!(response.is_complete(), "Handler returned an unfinished response");

        self.write_bytes(stream, response.buffer()).await?;
        info!(
            method = request.method().as_str(),
            path = request.path(),
            status = response.status_code().map(|s| s.as_u16()),
            "Response sent"
        );

        Ok(())
    }

    #[inline(always)]
    async fn write_bytes<S>(&self, stream: &mut S, bytes: &[u8]) -> Result<(), io::Error>
    where
        S: AsyncWrite + Unpin,
    {
        let write = async {
            stream.write_all(bytes).await?;
            stream.flush().await
        };

        tokio::time::timeout(self.limits.0.socket_write_timeout, write).await?
    }

    /// Reads and drops whatever the peer still sends, until it closes or
    /// the read timeout expires. Unread input turns the close into a reset.
    async fn discard_input<S>(&self, stream: &mut S)
    where
        S: AsyncRead + Unpin,
    {
        let mut scratch = [0; 1024];
        let drain = async {
            while let Ok(n) = stream.read(&mut scratch).await {
                if n == 0 {
                    break;
                }
            }
        };

        let _ = tokio::time::timeout(self.limits.0.socket_read_timeout, drain).await;
    }
}

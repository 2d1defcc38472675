//! Route handlers
//!
//! Each handler finalizes the [`Response`] it is given and returns the
//! [`Handled`] token, so a matched route always produces exactly one answer.

use crate::{
    http::{
        encoding::Encoding,
        request::Request,
        response::{Handled, Response},
        types::StatusCode,
    },
    store::{FileStore, StoreError},
};
use tracing::{error, info};

pub(crate) const TEXT_PLAIN: &str = "text/plain";
pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

/// Echoes `text` back as `text/plain`.
#[inline]
pub(crate) fn echo(text: &str, resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok)
        .header("Content-Type", TEXT_PLAIN)
        .body(text)
}

/// Echoes `text`, gzip-compressed when the client lists `gzip` in
/// `Accept-Encoding`. `Content-Length` is then the compressed size.
pub(crate) fn echo_negotiated(req: &Request, text: &str, resp: &mut Response) -> Handled {
    let Some(encoding) = Encoding::negotiate(req.header("Accept-Encoding")) else {
        return echo(text, resp);
    };

    match encoding.encode(text.as_bytes()) {
        Ok(body) => resp
            .status(StatusCode::Ok)
            .header("Content-Type", TEXT_PLAIN)
            .header("Content-Encoding", encoding.as_str())
            .body(body),
        Err(e) => {
            error!(error = %e, encoding = encoding.as_str(), "Failed to encode response body");
            internal_error(resp)
        }
    }
}

#[inline]
pub(crate) fn user_agent(req: &Request, resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok)
        .header("Content-Type", TEXT_PLAIN)
        .body(req.header("User-Agent").unwrap_or_default())
}

pub(crate) async fn file_read(store: Option<&FileStore>, name: &str, resp: &mut Response) -> Handled {
    let Some(store) = store else {
        info!(file = name, "File requested but no directory is configured");
        return missing_file(resp);
    };

    match store.read(name).await {
        Ok(data) => resp
            .status(StatusCode::Ok)
            .header("Content-Type", OCTET_STREAM)
            .body(data),
        Err(StoreError::NotFound | StoreError::InvalidName) => {
            info!(file = name, "File not found");
            missing_file(resp)
        }
        Err(e) => {
            error!(file = name, error = %e, "Failed to read file");
            internal_error(resp)
        }
    }
}

pub(crate) async fn file_write(
    store: Option<&FileStore>,
    name: &str,
    data: &[u8],
    resp: &mut Response,
) -> Handled {
    let Some(store) = store else {
        info!(file = name, "Upload rejected, no directory is configured");
        return missing_file(resp);
    };

    match store.write(name, data).await {
        Ok(()) => {
            info!(file = name, bytes = data.len(), "File stored");
            resp.status(StatusCode::Created)
                .header("Content-Type", TEXT_PLAIN)
                .body("")
        }
        Err(StoreError::NotFound | StoreError::InvalidName) => {
            info!(file = name, "Upload rejected, invalid file name");
            missing_file(resp)
        }
        Err(e) => {
            error!(file = name, error = %e, "Failed to write file");
            internal_error(resp)
        }
    }
}

#[inline]
pub(crate) fn root(resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok).end()
}

#[inline]
pub(crate) fn not_found(resp: &mut Response) -> Handled {
    resp.status(StatusCode::NotFound).end()
}

#[inline]
fn missing_file(resp: &mut Response) -> Handled {
    resp.status(StatusCode::NotFound)
        .header("Content-Type", TEXT_PLAIN)
        .body("")
}

#[inline]
fn internal_error(resp: &mut Response) -> Handled {
    resp.status(StatusCode::InternalServerError)
        .header("Content-Type", TEXT_PLAIN)
        .body("")
}

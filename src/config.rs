//! Command-line and environment configuration
//!
//! ```bash
//! minihttpd --directory /tmp/files --port 4221
//! MINIHTTPD_DIRECTORY=/tmp/files MINIHTTPD_HOST=0.0.0.0 minihttpd -v
//! ```

use crate::{
    limits::{ConnLimits, ReqLimits},
    store::FileStore,
};
use clap::{ArgAction, Parser, ValueEnum};
use std::{path::PathBuf, time::Duration};

/// Minimal HTTP/1.1 server
#[derive(Debug, Clone, Parser)]
#[command(name = "minihttpd", version, about)]
pub struct Config {
    /// Directory served and written by the `/files/` routes
    ///
    /// Without it every `/files/` request is answered with 404.
    #[arg(long, value_name = "DIR", env = "MINIHTTPD_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Host name or IP to listen on
    #[arg(long, default_value = "localhost", env = "MINIHTTPD_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 4221, env = "MINIHTTPD_PORT")]
    pub port: u16,

    /// Seconds to wait on each socket read
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "MINIHTTPD_READ_TIMEOUT"
    )]
    pub read_timeout: u64,

    /// Seconds to wait for the response write
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "MINIHTTPD_WRITE_TIMEOUT"
    )]
    pub write_timeout: u64,

    /// Receive size and maximum request head size, in bytes
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = 1024,
        value_parser = clap::value_parser!(u32).range(16..),
        env = "MINIHTTPD_BUFFER_SIZE"
    )]
    pub buffer_size: u32,

    /// Largest accepted `Content-Length`, in bytes
    #[arg(long, value_name = "BYTES", default_value_t = 1024 * 1024, env = "MINIHTTPD_MAX_BODY_SIZE")]
    pub max_body_size: usize,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "MINIHTTPD_LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    #[inline]
    pub fn connection_limits(&self) -> ConnLimits {
        ConnLimits {
            socket_read_timeout: Duration::from_secs(self.read_timeout),
            socket_write_timeout: Duration::from_secs(self.write_timeout),
            ..ConnLimits::default()
        }
    }

    #[inline]
    pub fn request_limits(&self) -> ReqLimits {
        ReqLimits {
            buffer_size: self.buffer_size as usize,
            body_size: self.max_body_size,
            ..ReqLimits::default()
        }
    }

    #[inline]
    pub fn file_store(&self) -> Option<FileStore> {
        self.directory.as_ref().map(FileStore::new)
    }
}

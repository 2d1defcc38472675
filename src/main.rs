use clap::Parser;
use minihttpd::{
    config::{Config, LogFormat},
    Router, Server,
};
use std::{io, process::ExitCode};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(config.verbose, config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> io::Result<()> {
    let addr = minihttpd::resolve(&config.host, config.port).await?;
    let listener = minihttpd::bind(addr)?;

    match config.file_store() {
        Some(store) => info!(directory = %store.root().display(), "Serving files"),
        None => info!("No --directory given, /files/ routes answer 404"),
    }

    let server = Server::builder()
        .listener(listener)
        .handler(Router::new(config.file_store()))
        .connection_limits(config.connection_limits())
        .request_limits(config.request_limits())
        .build()?;

    tokio::select! {
        result = server.launch() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let level = match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => subscriber.try_init(),
        LogFormat::Json => subscriber.json().try_init(),
    };
}

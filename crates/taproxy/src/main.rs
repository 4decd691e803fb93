use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taproxy::audit::AuditLog;
use taproxy::config::Config;
use taproxy::proxy::ProxyServer;

/// Single-upstream HTTP reverse proxy with a full request/response audit log.
#[derive(Parser, Debug)]
#[command(name = "taproxy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address and port to listen on
    #[arg(short, long, default_value = ":8090", env = "TAPROXY_LISTEN")]
    listen: String,

    /// Target server address to forward requests to
    #[arg(short, long, default_value = "http://example.com", env = "TAPROXY_TARGET")]
    target: String,

    /// Path to the audit log file
    #[arg(long, default_value = "proxy.log", env = "TAPROXY_LOG")]
    log: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Bare invocation prints usage instead of quietly proxying to the
    // default target.
    if std::env::args().len() <= 1 {
        Args::command().print_long_help()?;
        return Ok(());
    }

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taproxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new(&args.listen, &args.target, args.log)?;
    let audit = AuditLog::open(&config.log_path)
        .await
        .with_context(|| format!("failed to open audit log {}", config.log_path.display()))?;

    let server = ProxyServer::new(config, audit)?;
    server.run().await
}

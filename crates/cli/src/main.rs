use clap::Parser;
use ember_dns_domain::{ServerConfig, DEFAULT_UPSTREAM};
use ember_dns_infrastructure::logging::{self, LogLevel};
use ember_dns_infrastructure::{DnsCache, ThreadPool, UdpListener};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bootstrap;

/// How long an idle pool worker sleeps between queue polls.
const WORKER_POLL_LATENCY: Duration = Duration::from_micros(100);

#[derive(Parser)]
#[command(name = "ember-dns")]
#[command(version)]
#[command(about = "Caching forwarding DNS server for A-record queries")]
struct Cli {
    /// UDP port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Hosts file the cache is hydrated from (created if absent)
    hosts_file: PathBuf,

    /// Forward server as addr:port (default: 8.8.8.8:53)
    #[arg(value_parser = parse_upstream)]
    forward: Option<SocketAddr>,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Log level: warning, error, info or debug
    #[arg(long, default_value = "debug", value_parser = parse_log_level)]
    log_level: LogLevel,

    /// Log file path
    #[arg(long, default_value = "ember-dns.log")]
    log_file: PathBuf,
}

fn parse_upstream(s: &str) -> Result<SocketAddr, String> {
    let addr: SocketAddr = s
        .parse()
        .map_err(|_| format!("invalid forward server address: {s}"))?;
    if addr.port() == 0 {
        return Err("forward server port must be in [1, 65535]".into());
    }
    Ok(addr)
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    bootstrap::init_logging(cli.log_file.clone(), cli.log_level);
    bootstrap::install_signal_handlers()?;

    let mut config = ServerConfig::new(
        cli.port,
        cli.hosts_file.clone(),
        cli.forward.unwrap_or(DEFAULT_UPSTREAM),
    );
    config.workers = cli.workers;

    info!("starting ember-dns v{}", env!("CARGO_PKG_VERSION"));

    let cache = Arc::new(DnsCache::open(&config.hosts_path)?);
    info!(
        entries = cache.len(),
        must_persist = cache.must_persist(),
        "cache hydrated"
    );

    let pool = match config.workers {
        Some(workers) => ThreadPool::with_threads(workers, WORKER_POLL_LATENCY)?,
        None => ThreadPool::new(WORKER_POLL_LATENCY)?,
    };
    let listener = UdpListener::bind(config.port, config.upstream)?;

    logging::info(format!(
        "DNS server initialized. Listening on port {}. Forward server: {} ({} workers)",
        config.port,
        config.upstream,
        pool.worker_count(),
    ));

    listener.run(&pool, Arc::clone(&cache), bootstrap::shutdown_flag());

    logging::info("DNS server shutting down");
    // Join the workers and drain the task queue before the cache goes away.
    drop(pool);
    drop(listener);
    // Last reference: persists to the hosts file when it was created at
    // startup.
    drop(cache);
    logging::shutdown();
    Ok(())
}

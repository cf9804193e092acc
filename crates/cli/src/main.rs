use clap::Parser;
use labelns_domain::CliOverrides;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod di;
mod server;

use server::ServerGroup;

#[derive(Parser, Debug)]
#[command(name = "labelns")]
#[command(version)]
#[command(about = "labelns - authoritative DNS server answering from the labels of the query name")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Address for the UDP and TCP listeners
    #[arg(short = 'l', long, value_name = "ADDR")]
    listen: Option<String>,

    /// Also serve on a Unix stream socket at this path
    #[arg(long, value_name = "PATH")]
    unix_socket: Option<String>,

    /// Served zone (repeatable)
    #[arg(short = 'z', long = "zone", value_name = "ZONE")]
    zones: Vec<String>,

    /// Default IPv4 answer
    #[arg(long)]
    ipv4: Option<Ipv4Addr>,

    /// Default IPv6 answer
    #[arg(long)]
    ipv6: Option<Ipv6Addr>,

    /// TTL of synthesized records, in seconds
    #[arg(long)]
    ttl: Option<u32>,

    /// How long a built pipeline is reused, in seconds
    #[arg(long, value_name = "SECS")]
    sticky_ttl: Option<u64>,

    /// Answer with the default address when a pipeline produces nothing
    #[arg(long, value_name = "BOOL")]
    use_default: Option<bool>,

    /// Upstream resolver for the proxy handler
    #[arg(short = 'u', long, value_name = "ADDR")]
    upstream: Option<String>,

    /// Disable the proxy handler
    #[arg(long)]
    no_proxy: bool,

    /// Enable notification channels and their HTTP API
    #[arg(long)]
    notify: bool,

    /// Bind address of the HTTP API
    #[arg(long, value_name = "ADDR")]
    web_bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            listen: self.listen.clone(),
            unix_socket: self.unix_socket.clone(),
            zones: self.zones.clone(),
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            ttl: self.ttl,
            sticky_ttl_secs: self.sticky_ttl,
            use_default: self.use_default,
            upstream: self.upstream.clone(),
            no_proxy: self.no_proxy,
            notify: self.notify,
            web_bind: self.web_bind.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    bootstrap::init_logging(&config);
    bootstrap::log_loaded_config(cli.config.as_deref(), &config);

    info!("Starting labelns v{}", env!("CARGO_PKG_VERSION"));

    let services = di::Services::new(&config)?;

    let mut group = ServerGroup::new(Duration::from_secs(config.server.shutdown_timeout_secs));
    server::start_dns_listeners(&mut group, &config, &services).await?;

    if let Some(state) = services.app_state() {
        let web_addr = labelns_domain::config::parse_socket_addr(
            "notify.web_bind",
            &config.notify.web_bind,
        )?;
        server::start_web_server(&mut group, web_addr, state).await?;
    }

    info!(listeners = group.len(), "labelns ready");

    let shutdown = group.shutdown_token();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        shutdown.cancel();
    });

    group.run().await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

use labelns_api::AppState;
use labelns_application::pipeline::{HandlerContext, HandlerRegistry};
use labelns_application::ports::{NotificationHub, UpstreamResolver};
use labelns_application::use_cases::ResolveQueryUseCase;
use labelns_domain::config::parse_socket_addr;
use labelns_domain::Config;
use labelns_infrastructure::dns::{CachedResolver, CoreResolver, DnsServerHandler, TcpTransport};
use labelns_infrastructure::notify::InMemoryNotificationHub;
use std::sync::Arc;
use tracing::info;

/// Everything the listeners and the web API share.
pub struct Services {
    pub resolve_query: Arc<ResolveQueryUseCase>,
    pub dns_handler: Arc<DnsServerHandler>,
    pub hub: Option<Arc<dyn NotificationHub>>,
}

impl Services {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let dns = Arc::new(config.dns.clone());
        let mut context = HandlerContext::new(Arc::clone(&dns));

        if config.upstream.proxy_enabled {
            let upstream_addr = parse_socket_addr("upstream.address", &config.upstream.address)?;
            let core = CoreResolver::new(Arc::new(TcpTransport::new(upstream_addr)));
            let cached: Arc<dyn UpstreamResolver> =
                Arc::new(CachedResolver::new(Arc::new(core), config.upstream.cache_size));
            context = context.with_upstream(cached);
            info!(upstream = %upstream_addr, cache_size = config.upstream.cache_size, "Proxy handler enabled");
        } else {
            info!("Proxy handler disabled");
        }

        let hub: Option<Arc<dyn NotificationHub>> = if config.notify.enabled {
            let hub: Arc<dyn NotificationHub> = Arc::new(InMemoryNotificationHub::new(
                config.notify.history_size,
                config.notify.max_channels,
            ));
            context = context.with_hub(Arc::clone(&hub));
            Some(hub)
        } else {
            None
        };

        let registry = Arc::new(HandlerRegistry::with_builtin_handlers(&context));
        info!(tags = ?registry.tags(), "Handler registry ready");

        let resolve_query = Arc::new(ResolveQueryUseCase::new(dns, registry));
        let dns_handler = Arc::new(DnsServerHandler::new(Arc::clone(&resolve_query)));

        Ok(Self {
            resolve_query,
            dns_handler,
            hub,
        })
    }

    /// `None` when notifications are disabled, and with them the web API.
    pub fn app_state(&self) -> Option<AppState> {
        self.hub
            .as_ref()
            .map(|hub| AppState::new(Arc::clone(hub), Arc::clone(&self.resolve_query)))
    }
}

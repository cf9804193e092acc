use super::group::{ServerError, ServerGroup};
use axum::Router;
use labelns_api::{create_api_routes, AppState};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Event streams never end on their own; they get this long after shutdown.
const WEB_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn start_web_server(
    group: &mut ServerGroup,
    bind_addr: SocketAddr,
    state: AppState,
) -> anyhow::Result<()> {
    info!(
        bind_address = %bind_addr,
        api_url = format!("http://{}/api", bind_addr),
        "Starting web server"
    );

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: format!("http://{}", bind_addr),
            source,
        })?;

    group.spawn(
        "web",
        serve_web(listener, bind_addr, create_app(state), group.shutdown_token()),
    );
    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn serve_web(
    listener: TcpListener,
    bind_addr: SocketAddr,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

    tokio::select! {
        result = server => result.map_err(|source| ServerError::Web { addr: bind_addr, source }),
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(WEB_DRAIN_TIMEOUT).await;
        } => {
            info!("Closing remaining web connections");
            Ok(())
        }
    }
}

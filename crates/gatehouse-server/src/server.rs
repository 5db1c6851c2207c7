use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{FromRef, State},
    http::Request,
    routing::{any, get, post},
};
use gatehouse_auth::middleware::{AuthState, BearerAuth};
use gatehouse_auth::token::TokenCodec;
use gatehouse_directory::{CacheBackend, MemoryUserStore, UserDirectory};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, error::GatewayError, handlers, proxy, registry::ServiceRegistry};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub directory: UserDirectory,
    pub registry: Arc<ServiceRegistry>,
    pub http: reqwest::Client,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> AuthState {
        state.auth.clone()
    }
}

/// Builds application state from configuration.
///
/// The outbound client carries no global timeout; each proxy request
/// applies its service's own.
pub fn build_state(cfg: &AppConfig, cache: CacheBackend) -> Result<AppState, String> {
    let registry = ServiceRegistry::from_config(&cfg.server.api_prefix, &cfg.services)?;
    let codec = Arc::new(TokenCodec::new(&cfg.auth));
    let store = Arc::new(MemoryUserStore::new());
    let directory = UserDirectory::with_ttl(store, cache, cfg.user_cache_ttl());
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| format!("http client build error: {e}"))?;

    Ok(AppState {
        auth: AuthState::new(codec),
        directory,
        registry: Arc::new(registry),
        http,
    })
}

/// Builds the full router: gateway surface plus one pair of proxy routes
/// per configured service.
pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let mut api = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/users", get(handlers::protected::list_users))
        .route("/profile", get(handlers::protected::profile))
        .route("/dashboard", get(handlers::protected::dashboard));

    // Routes only exist for services known at startup, so the proxy
    // engine never sees an unconfigured name.
    for name in state.registry.names() {
        let service = name.to_string();
        let handler = move |State(state): State<AppState>,
                            BearerAuth(claims): BearerAuth,
                            request: Request<Body>| {
            let service = service.clone();
            async move {
                let descriptor = state
                    .registry
                    .get(&service)
                    .ok_or_else(|| GatewayError::internal(format!("unregistered service {service}")))?;
                proxy::forward(&state.http, descriptor, Some(&claims), request).await
            }
        };
        api = api
            .route(&format!("/{name}"), any(handler.clone()))
            .route(&format!("/{name}/{{*path}}"), any(handler));
    }

    Router::new()
        .route("/health", get(handlers::system::health))
        .nest(&cfg.server.api_prefix, api)
        .fallback(handlers::system::not_found)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct GatehouseServer {
    addr: SocketAddr,
    app: Router,
}

impl GatehouseServer {
    pub fn new(addr: SocketAddr, app: Router) -> Self {
        Self { addr, app }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

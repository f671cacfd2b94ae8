#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod cors;
mod health;
mod orders;
mod rate_limit;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use memetee_config::Config;
use memetee_ratelimit::Limiters;
use tower_http::trace::TraceLayer;

pub use health::ServiceFlags;

/// How often the in-memory rate limit store evicts idle clients
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Must run inside a Tokio runtime: the rate limit sweeper is
    /// spawned here.
    ///
    /// # Errors
    ///
    /// Returns an error if subsystem initialization or rate-limiter
    /// construction fails
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        // Feature states
        let memegen_state = memetee_memegen::build_server(&config)?;
        let mockup_state = memetee_mockup::build_server(&config);
        let contact_state = memetee_contact::build_server(&config)?;
        let service_flags = Arc::new(health::ServiceFlags::from_config(&config));

        // One limiter per guarded resource, sharing a single store
        let limiters = Limiters::from_config(&config.server.rate_limit)?;
        limiters.spawn_sweeper(SWEEP_INTERVAL);

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.merge(
                Router::new()
                    .route(&config.server.health.path, get(health::health_handler))
                    .with_state(Arc::clone(&service_flags)),
            );
        }

        // Meme generation
        let meme_limiter = Arc::clone(&limiters.meme);
        app = app.merge(
            memetee_memegen::endpoint_router(&memegen_state)
                .with_state(memegen_state)
                .route_layer(axum::middleware::from_fn(move |req, next| {
                    let limiter = Arc::clone(&meme_limiter);
                    async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
                })),
        );

        // T-shirt mockups
        let mockup_limiter = Arc::clone(&limiters.mockup);
        app = app.merge(
            memetee_mockup::endpoint_router()
                .with_state(mockup_state)
                .route_layer(axum::middleware::from_fn(move |req, next| {
                    let limiter = Arc::clone(&mockup_limiter);
                    async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
                })),
        );

        // Contact form
        let contact_limiter = Arc::clone(&limiters.contact);
        app = app.merge(
            memetee_contact::endpoint_router()
                .with_state(contact_state)
                .route_layer(axum::middleware::from_fn(move |req, next| {
                    let limiter = Arc::clone(&contact_limiter);
                    async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
                })),
        );

        // Order stub
        app = app.route("/process-order", post(orders::process_order_handler));

        // Apply middleware layers (innermost first)

        // Request context (client IP for rate limiting and contact mail)
        app = app.layer(axum::middleware::from_fn(
            request_context::request_context_middleware,
        ));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS; the landing page is served from a different origin, so
        // the layer is always on and defaults to permissive
        let cors_config = config.server.cors.clone().unwrap_or_default();
        app = app.layer(cors::cors_layer(&cors_config));

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

        Ok(())
    }
}

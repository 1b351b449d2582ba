//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{AlertDispatcher, BroadcastRelay, FramePipeline, SessionRegistry};
use crate::config::Settings;
use crate::domain::{AlertNotifier, DetectionOracle};
use crate::infrastructure::notifier::build_notifier;
use crate::infrastructure::oracle::OracleAdapter;
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FramePipeline>,
    pub oracle: Arc<dyn DetectionOracle>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the shared components together. Spawns the alert delivery
    /// worker, so it must be called inside a Tokio runtime.
    pub fn new(
        settings: Settings,
        oracle: Arc<dyn DetectionOracle>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            settings.detection.alert_consecutive_frames,
        ));
        let relay = Arc::new(BroadcastRelay::new(settings.relay.subscriber_buffer));
        let (dispatcher, _worker) = AlertDispatcher::spawn(notifier, settings.notifier.queue_capacity);

        let pipeline = Arc::new(FramePipeline::new(
            registry,
            relay,
            oracle.clone(),
            dispatcher,
            &settings.detection,
        ));

        Self {
            pipeline,
            oracle,
            settings: Arc::new(settings),
        }
    }
}

/// Router with all routes and middleware applied
pub fn build_router(state: AppState) -> Router {
    let cors_layer = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors_layer)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // A detector that cannot be reached leaves the service up but degraded
        let oracle: Arc<dyn DetectionOracle> =
            Arc::new(OracleAdapter::connect(&settings.detection).await);
        let notifier = build_notifier(&settings.notifier);

        let addr = settings.server_addr();
        let state = AppState::new(settings, oracle, notifier);
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

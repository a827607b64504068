//! HTTP server for the slash-command bot.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub and handles them before responding
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

use crate::config::BotConfig;
use crate::github::ClientFactory;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. It is
/// immutable; deliveries share nothing else.
#[derive(Clone)]
pub struct AppState<C> {
    inner: Arc<AppStateInner<C>>,
}

struct AppStateInner<C> {
    config: BotConfig,

    /// Hands out a GitHub client per delivery.
    clients: C,
}

impl<C: ClientFactory> AppState<C> {
    pub fn new(config: BotConfig, clients: C) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { config, clients }),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    pub fn clients(&self) -> &C {
        &self.inner.clients
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C: ClientFactory>(app_state: AppState<C>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<C>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

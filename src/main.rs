//! PESRON Member Registration Portal
//!
//! Serves the registration form, the member roster and the form builder as JSON screens, backed by
//! a remote backend that owns all persistent state.

mod api;
mod auth;
mod collaborator;
mod config;
mod errors;
mod form;
mod models;
mod registration;
mod roster;
mod session;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use collaborator::{Collaborator, HttpCollaborator, InMemoryCollaborator};
use config::{Config, LogFormat};
use form::FormBuilder;
use registration::RegistrationScreen;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub collaborator: Arc<dyn Collaborator>,
    pub registrations: Arc<SessionStore<RegistrationScreen>>,
    pub builders: Arc<SessionStore<FormBuilder>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            collaborator,
            registrations: Arc::new(SessionStore::new(config.session_ttl)),
            builders: Arc::new(SessionStore::new(config.session_ttl)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting PESRON registration portal");
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (PESRON_API_PSK). Authentication is disabled!");
    }

    let collaborator: Arc<dyn Collaborator> = match &config.backend_url {
        Some(url) => {
            tracing::info!("Remote backend: {}", url);
            Arc::new(HttpCollaborator::new(url, config.backend_timeout)?)
        }
        None => {
            let backend = InMemoryCollaborator::with_admins(config.dev_admins.clone());
            tracing::warn!(
                "No backend configured (PESRON_BACKEND_URL). Using in-memory backend with {} admin(s); data is lost on restart!",
                backend.admins().await.len()
            );
            Arc::new(backend)
        }
    };

    let state = AppState::new(config.clone(), collaborator);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Caller
        .route("/session", get(api::get_session))
        .route("/profile", put(api::save_profile))
        .route("/profiles/{principal}", get(api::get_user_profile))
        .route("/role", get(api::get_role))
        .route("/role", put(api::assign_role))
        // Registration form
        .route("/registrations", post(api::open_registration))
        .route("/registrations/{id}", get(api::get_registration))
        .route("/registrations/{id}", delete(api::close_registration))
        .route("/registrations/{id}/values", patch(api::edit_registration))
        .route("/registrations/{id}/submit", post(api::submit_registration))
        .route(
            "/registrations/{id}/error",
            delete(api::dismiss_registration_error),
        )
        .route("/registrations/{id}/reset", post(api::reset_registration))
        // Roster
        .route("/admin/members", get(api::list_members))
        // Form builder
        .route("/admin/form-builder", post(api::open_form_builder))
        .route("/admin/form-builder/{id}", get(api::get_form_builder))
        .route(
            "/admin/form-builder/{id}/preview",
            get(api::preview_form_builder),
        )
        .route("/admin/form-builder/{id}/fields", post(api::append_field))
        .route(
            "/admin/form-builder/{id}/fields/{index}",
            delete(api::remove_field),
        )
        .route(
            "/admin/form-builder/{id}/fields/{index}/move",
            post(api::move_field),
        )
        .route("/admin/form-builder/{id}/save", post(api::save_form_builder))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

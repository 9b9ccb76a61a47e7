//! Foresight Web Server
//!
//! Axum-based REST API over the forecasting engine.
//!
//! Security features:
//! - Bearer API-key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (simulation horizon, history window)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use foresight_core::{Database, EngineConfig, ForecastService, NarrativeBackend};

mod handlers;

/// Longest horizon accepted by the simulate endpoint
pub const MAX_SIMULATION_MONTHS: u32 = 120;

/// Longest history window accepted by the forecast endpoint
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "FORESIGHT_API_KEYS";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Accepted API keys, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Read API keys from `FORESIGHT_API_KEYS`
    pub fn with_env_api_keys(mut self) -> Self {
        self.api_keys = std::env::var(API_KEYS_ENV)
            .map(|v| parse_api_keys(&v))
            .unwrap_or_default();
        self
    }
}

/// Split a comma-separated key list, dropping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub service: ForecastService,
    pub config: ServerConfig,
}

/// Authentication middleware - validates bearer API keys
///
/// Keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
///
/// Narrative enrichment is configured from the environment.
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let engine = EngineConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load engine config, using defaults: {}", e);
        EngineConfig::default()
    });
    let service = ForecastService::from_env(engine);
    if !service.has_narrator() {
        info!("ℹ️  Narrative backend not configured (set OLLAMA_HOST to enable narratives)");
    }
    create_router_with_service(db, service, config)
}

/// Create the application router around an existing service (for testing)
pub fn create_router_with_service(
    db: Database,
    service: ForecastService,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        db,
        service,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Forecasts
        .route(
            "/forecast/expenses",
            get(handlers::stored_expense_forecast).post(handlers::expense_forecast),
        )
        .route("/goals/projection", post(handlers::goal_projection))
        // Plans
        .route(
            "/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route(
            "/plans/:id",
            get(handlers::get_plan)
                .put(handlers::update_plan)
                .delete(handlers::delete_plan),
        )
        .route(
            "/plans/:id/contributions",
            post(handlers::add_contribution),
        )
        .route("/plans/:id/forecast", get(handlers::plan_forecast))
        // Scenarios
        .route("/scenarios/simulate", post(handlers::simulate));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default().with_env_api_keys()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!(
            "⚠️  Authentication required but no API keys configured ({}) - all requests will be rejected",
            API_KEYS_ENV
        );
    }

    let app = create_router(db, config);
    check_narrative_backend().await;

    let addr = format!("{}:{}", host, port);
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log narrative backend connection status
async fn check_narrative_backend() {
    match foresight_core::AIClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Narrative backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Narrative backend configured but not responding: {} - narratives will use the fallback text",
                    client.host()
                );
            }
        }
        None => {
            info!("ℹ️  Narrative backend not configured");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Engine errors that describe the request rather than a server fault
        if let Some(core) = err.downcast_ref::<foresight_core::Error>() {
            match core {
                foresight_core::Error::InsufficientData { required, actual } => {
                    return Self::unprocessable(&format!(
                        "Not enough data yet: need at least {} month(s) of history, have {}",
                        required, actual
                    ));
                }
                foresight_core::Error::NotFound(what) => {
                    return Self::not_found(&format!("{} not found", what));
                }
                foresight_core::Error::InvalidData(msg) => return Self::bad_request(msg),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;

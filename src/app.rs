use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full HTTP router over the given state
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest(
            "/api",
            auth_public_routes().merge(protected_routes(state.clone())),
        )
        .fallback(not_found)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                )),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{profile, transactions};

    Router::new()
        .route("/profile", get(profile::get))
        .route(
            "/transactions",
            get(transactions::collection_get).post(transactions::collection_post),
        )
        .route("/transactions/summary", get(transactions::summary_get))
        .route(
            "/transactions/:id",
            put(transactions::record_put).delete(transactions::record_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "Ledger API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Personal income and expense tracking",
        "environment": state.config.environment,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/api/register, /api/login (public - token acquisition)",
            "profile": "/api/profile (protected)",
            "transactions": "/api/transactions[/:id] (protected)",
            "summary": "/api/transactions/summary (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.repositories.backend_name();

    match state.repositories.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": backend
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": backend,
                    "error": "database unavailable"
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

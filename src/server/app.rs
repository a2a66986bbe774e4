//! Application setup and router wiring.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::token_auth_middleware;
use crate::server::routes::{admin, auth, chat, children, health, injuries, reminders, upload};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub secure_cookies: bool,
}

/// Build the Axum application router
pub fn build_app(
    deps: Arc<ServerDeps>,
    allowed_origins: &[String],
    secure_cookies: bool,
    upload_dir: &str,
) -> Router {
    let state = AppState {
        deps: deps.clone(),
        secure_cookies,
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, COOKIE])
        .allow_credentials(true);

    let jwt = deps.jwt.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        // Account lifecycle
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/auth/verify-email", post(auth::verify_email_handler))
        .route(
            "/api/auth/forgot-password",
            post(auth::forgot_password_handler),
        )
        .route(
            "/api/auth/reset-password",
            post(auth::reset_password_handler),
        )
        // Children
        .route(
            "/api/children",
            get(children::list_handler).post(children::create_handler),
        )
        .route(
            "/api/children/:id",
            get(children::get_handler)
                .put(children::update_handler)
                .delete(children::delete_handler),
        )
        .route("/api/children/:id/export", get(children::export_handler))
        // Injuries
        .route(
            "/api/injuries",
            get(injuries::list_handler).post(injuries::create_handler),
        )
        .route(
            "/api/injuries/:id",
            get(injuries::get_handler)
                .put(injuries::update_handler)
                .delete(injuries::delete_handler),
        )
        // Admin (read-only)
        .route("/api/admin/stats", get(admin::stats_handler))
        .route("/api/admin/users", get(admin::users_handler))
        .route(
            "/api/admin/export/children",
            get(admin::export_children_handler),
        )
        .route(
            "/api/admin/export/injuries",
            get(admin::export_injuries_handler),
        )
        // Photos, reminders, assistant
        .route("/api/upload", post(upload::upload_handler))
        .route("/api/reminders/send", post(reminders::send_handler))
        .route("/api/ai/chat", post(chat::chat_handler))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(middleware::from_fn(move |request, next| {
            let jwt = jwt.clone();
            async move { token_auth_middleware(jwt, request, next).await }
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
}

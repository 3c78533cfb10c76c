use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::api::handlers;
use crate::ledger::Ledger;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub jwt_secret: Arc<Vec<u8>>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, jwt_secret: Vec<u8>) -> Self {
        Self {
            ledger,
            jwt_secret: Arc::new(jwt_secret),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/quotes", get(handlers::list_quotes))
        .route("/quotes/search", get(handlers::search_quotes))
        .route("/quotes/{symbol}", get(handlers::get_quote))
        .route("/account", get(handlers::get_account))
        .route("/account/value", get(handlers::get_account_value))
        .route("/positions", get(handlers::get_positions))
        .route("/transactions", get(handlers::get_transactions))
        .route("/trades", post(handlers::place_trade))
        .route(
            "/admin/users",
            get(handlers::admin_list_users).post(handlers::admin_create_user),
        )
        .route("/admin/users/{id}/status", put(handlers::admin_set_status))
        .route("/admin/users/{id}", delete(handlers::admin_delete_user))
        .route("/admin/transactions", get(handlers::admin_transactions))
        .route("/admin/stats", get(handlers::admin_stats))
        .with_state(state)
}

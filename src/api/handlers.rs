use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::auth::{AdminUser, AuthUser, create_token};
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::types::account::{AccountStatus, AccountSummary, NewAccount};
use crate::types::order::OrderRequest;
use crate::types::quote::Quote;
use crate::types::transaction::Transaction;
use crate::valuation::{AccountValue, PlatformStats, PositionValuation};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AccountStatus,
}

pub async fn health() -> &'static str {
    "healthy"
}

/// # POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let account = state
        .ledger
        .create_account(NewAccount::new(body.email, body.name, body.password))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: account.id,
            email: account.email,
            name: account.name,
        }),
    ))
}

/// # POST /auth/login
/// Blocked accounts authenticate (and are counted) but get no token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .ledger
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    if account.status == AccountStatus::Blocked {
        tracing::warn!(user_id = %account.id, "login refused for blocked account");
        return Err(ApiError::Forbidden("account is blocked".to_string()));
    }

    let token = create_token(&state.jwt_secret, account.id)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    Ok(Json(LoginResponse {
        token,
        user_id: account.id,
        name: account.name,
    }))
}

/// # GET /quotes
pub async fn list_quotes(State(state): State<AppState>) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(state.ledger.list_quotes().await?))
}

/// # GET /quotes/search?q=
pub async fn search_quotes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(state.ledger.search_quotes(&params.q).await?))
}

/// # GET /quotes/{symbol}
pub async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    Ok(Json(state.ledger.quote(&symbol).await?))
}

/// # GET /account
pub async fn get_account(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AccountSummary>, ApiError> {
    let account = state.ledger.get_account(user.user_id).await?;
    Ok(Json(AccountSummary::from(&account)))
}

/// # GET /account/value
pub async fn get_account_value(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AccountValue>, ApiError> {
    Ok(Json(state.ledger.get_account_value(user.user_id).await?))
}

/// # GET /positions
pub async fn get_positions(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PositionValuation>>, ApiError> {
    Ok(Json(state.ledger.get_position_valuations(user.user_id).await?))
}

/// # GET /transactions
pub async fn get_transactions(
    user: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Transaction>> {
    Json(state.ledger.get_transactions(user.user_id).await)
}

/// # POST /trades
pub async fn place_trade(
    user: AuthUser,
    State(state): State<AppState>,
    Json(order): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let tx = state
        .ledger
        .settle_trade(user.user_id, &order.symbol, order.side, order.shares)
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// # GET /admin/users
pub async fn admin_list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<Vec<AccountSummary>> {
    let accounts = state.ledger.list_accounts().await;
    Json(accounts.iter().map(AccountSummary::from).collect())
}

/// # POST /admin/users
/// Accepts an optional `status` and `role` on top of the registration fields.
pub async fn admin_create_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(profile): Json<NewAccount>,
) -> Result<(StatusCode, Json<AccountSummary>), ApiError> {
    let account = state.ledger.create_account(profile).await?;
    tracing::info!(admin_id = %admin.user_id, user_id = %account.id, "admin created account");
    Ok((StatusCode::CREATED, Json(AccountSummary::from(&account))))
}

/// # PUT /admin/users/{id}/status
pub async fn admin_set_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<AccountSummary>, ApiError> {
    let account = state.ledger.set_account_status(id, body.status).await?;
    Ok(Json(AccountSummary::from(&account)))
}

/// # DELETE /admin/users/{id}
pub async fn admin_delete_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.ledger.delete_account(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("account {id} not found")))
    }
}

/// # GET /admin/transactions
pub async fn admin_transactions(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<Vec<Transaction>> {
    Json(state.ledger.get_all_transactions().await)
}

/// # GET /admin/stats
pub async fn admin_stats(_admin: AdminUser, State(state): State<AppState>) -> Json<PlatformStats> {
    Json(state.ledger.get_platform_stats().await)
}

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::error::LedgerError;
use crate::types::account::{AccountRole, AccountStatus};

/// JWT claims: `sub` = account id (Uuid as string), `exp` (expiry), `iat` (issued at).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Caller resolved from a Bearer token to a live, non-blocked account.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: AccountRole,
}

/// An `AuthUser` whose account has the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

const JWT_EXPIRY_HOURS: i64 = 24;

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp();
        Self {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(secret: &[u8], user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user_id);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let claims = decode_token(&state.jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))?;

        let account = match state.ledger.get_account(user_id).await {
            Ok(account) => account,
            Err(LedgerError::AccountNotFound(_)) => {
                return Err(ApiError::Unauthorized("account no longer exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if account.status == AccountStatus::Blocked {
            return Err(ApiError::Forbidden("account is blocked".to_string()));
        }

        Ok(AuthUser {
            user_id,
            role: account.role,
        })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != AccountRole::Admin {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

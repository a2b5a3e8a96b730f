//! Token issuance, verification and role checks

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wsp_core::{AuthenticatedUser, RequestContext, Role, UserRecord};

use crate::error::ApiError;
use crate::state::AppState;

/// Roles allowed to read measurements
pub const READERS: &[Role] = &[Role::Read, Role::Write];
/// Roles allowed to append measurements
pub const WRITERS: &[Role] = &[Role::Write];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("role '{0}' is not allowed to access this resource")]
    Forbidden(Role),
    #[error("user '{0}' not found")]
    UnknownUser(String),
    #[error("wrong password")]
    WrongPassword,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Token(jsonwebtoken::errors::Error),
    #[error("hashing task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub login: String,
    pub role: Role,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user: TokenUser,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub hash_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "123456".to_string(),
            token_ttl_secs: 86_400,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// HS256 signer/verifier built once from the configured secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(settings.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, user: &UserRecord) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user.login.clone(),
            user: TokenUser {
                login: user.login.clone(),
                role: user.role,
            },
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Token)
    }

    /// Checks signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Caller authenticated by a bearer token, with the request context
/// updated to carry their identity
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: AuthenticatedUser,
    pub ctx: RequestContext,
}

impl AuthUser {
    /// 403 unless the caller's role is in `allowed`
    pub fn require(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.user.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(self.user.role))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.tokens().verify(token)?;

        let user = AuthenticatedUser {
            login: claims.user.login,
            role: claims.user.role,
        };
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext::new(crate::context::new_request_id()))
            .with_user(user.clone());

        Ok(AuthUser { user, ctx })
    }
}

//! Authentication middleware.

use std::sync::Arc;

use auth::{Claims, JwtManager};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use study_store::StudyStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// The account a request acts as.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    /// Account ID.
    pub id: Uuid,
    /// Nickname at the time the token was issued.
    pub nickname: String,
}

impl TryFrom<Claims> for CurrentAccount {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.account_id()?,
            nickname: claims.nickname,
        })
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Resolves the current account from a token.
fn resolve_account(jwt_manager: &JwtManager, token: &str) -> Result<CurrentAccount, auth::AuthError> {
    let claims = jwt_manager.validate_token(token)?;
    CurrentAccount::try_from(claims)
}

/// Authentication middleware.
///
/// Validates the bearer token and stores the `CurrentAccount` in the request
/// extensions.
pub async fn auth_middleware<S: StudyStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ServerError::AuthenticationRequired.into_response();
    };

    match resolve_account(&state.jwt_manager, token) {
        Ok(account) => {
            request.extensions_mut().insert(account);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected access token");
            return ServerError::Auth(e).into_response();
        }
    }

    next.run(request).await
}

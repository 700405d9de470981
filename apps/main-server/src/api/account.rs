//! Sign-up and login endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use entities::Account;
use forms::{
    AccountView, LoginForm, SignUpForm, SignUpFormValidator, SignUpResponse, TokenResponse, Validator,
};
use study_store::StudyStore;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

fn issue_token<S: StudyStore>(state: &AppState<S>, account: &Account) -> ServerResult<TokenResponse> {
    let token = state.jwt_manager.generate_token(account.id, &account.nickname)?;
    Ok(TokenResponse::bearer(token, state.jwt_manager.expiration_seconds()))
}

/// Creates an account and returns an access token for it.
pub async fn sign_up<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(form): Json<SignUpForm>,
) -> ServerResult<(StatusCode, Json<SignUpResponse>)> {
    SignUpFormValidator.check(&form).map_err(ServerError::Validation)?;

    let account = state.accounts().make_account(&form).await?;
    let token = issue_token(&state, &account)?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            account: AccountView::from(&account),
            token,
        }),
    ))
}

/// Exchanges credentials for an access token.
pub async fn login<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(form): Json<LoginForm>,
) -> ServerResult<Json<TokenResponse>> {
    let account = state
        .accounts()
        .authenticate(&form.username, &form.password)
        .await?;

    tracing::info!(account_id = %account.id, "Logged in");

    Ok(Json(issue_token(&state, &account)?))
}

//! API endpoints.

pub mod account;
pub mod event;
pub mod settings;
pub mod study;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use entities::Account;
use study_store::StudyStore;

use crate::error::{ServerError, ServerResult};
use crate::middleware::{auth_middleware, CurrentAccount};
use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: StudyStore + 'static>(state: Arc<AppState<S>>) -> Router<Arc<AppState<S>>> {
    let authenticated = Router::new()
        // Settings endpoints
        .route(
            "/settings/profile",
            get(settings::profile_form::<S>).post(settings::update_profile::<S>),
        )
        .route(
            "/settings/password",
            get(settings::password_form::<S>).post(settings::update_password::<S>),
        )
        .route("/settings/tags", get(settings::tags_form::<S>))
        .route("/settings/tags/add", post(settings::add_tag::<S>))
        .route("/settings/tags/remove", post(settings::remove_tag::<S>))
        .route("/settings/zones", get(settings::zones_form::<S>))
        .route("/settings/zones/add", post(settings::add_zone::<S>))
        .route("/settings/zones/remove", post(settings::remove_zone::<S>))
        // Study endpoints
        .route("/new-study", post(study::create_study::<S>))
        .route("/studies", get(study::list_studies::<S>))
        .route("/study/:url", get(study::get_study::<S>))
        .route("/study/:url/join", post(study::join_study::<S>))
        .route("/study/:url/leave", post(study::leave_study::<S>))
        // Event endpoints
        .route("/study/:url/new-event", post(event::create_event::<S>))
        .route("/study/:url/events", get(event::list_events::<S>))
        .route(
            "/study/:url/events/:id",
            get(event::get_event::<S>).delete(event::delete_event::<S>),
        )
        .route("/study/:url/events/:id/edit", post(event::update_event::<S>))
        .route("/study/:url/events/:id/enroll", post(event::enroll::<S>))
        .route("/study/:url/events/:id/disenroll", post(event::disenroll::<S>))
        .route(
            "/study/:url/events/:id/enrollments/:enrollment_id/accept",
            post(event::accept_enrollment::<S>),
        )
        .route(
            "/study/:url/events/:id/enrollments/:enrollment_id/reject",
            post(event::reject_enrollment::<S>),
        )
        .route(
            "/study/:url/events/:id/enrollments/:enrollment_id/checkin",
            post(event::check_in::<S>),
        )
        .route(
            "/study/:url/events/:id/enrollments/:enrollment_id/cancel-checkin",
            post(event::cancel_check_in::<S>),
        )
        .route_layer(from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        // Account endpoints
        .route("/sign-up", post(account::sign_up::<S>))
        .route("/login", post(account::login::<S>))
        .merge(authenticated)
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Loads the account behind the request's token.
pub(crate) async fn load_account<S: StudyStore>(
    state: &AppState<S>,
    current: &CurrentAccount,
) -> ServerResult<Account> {
    state
        .store
        .get_account(current.id)
        .await?
        .ok_or(ServerError::AuthenticationRequired)
}

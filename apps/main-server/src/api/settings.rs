//! Account settings endpoints.
//!
//! Profile and password posts are form submissions: success redirects back to
//! the page with a flash message and a rejected form answers 200 with the
//! view model and its field errors. Tags and zones are edited through JSON.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use forms::{
    view_names, AccountView, PasswordForm, PasswordFormValidator, PasswordModel, ProfileForm,
    ProfileFormValidator, ProfileModel, TagForm, TagsModel, Validator, View, ZoneForm, ZonesModel,
};
use study_store::StudyStore;

use crate::api::load_account;
use crate::error::ServerResult;
use crate::middleware::CurrentAccount;
use crate::state::AppState;

pub const PROFILE_UPDATED: &str = "Profile updated.";
pub const PASSWORD_UPDATED: &str = "Password updated.";

// ============================================================================
// Profile
// ============================================================================

pub async fn profile_form<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
) -> ServerResult<Json<View<ProfileModel>>> {
    let account = load_account(&state, &current).await?;
    let message = state.take_flash(account.id).await;

    let model = ProfileModel {
        account: AccountView::from(&account),
        profile: ProfileForm::from_account(&account),
    };

    Ok(Json(View::new(view_names::SETTINGS_PROFILE, model).with_message(message)))
}

pub async fn update_profile<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Form(form): Form<ProfileForm>,
) -> ServerResult<Response> {
    let mut account = load_account(&state, &current).await?;

    if let Err(errors) = ProfileFormValidator.check(&form) {
        let model = ProfileModel {
            account: AccountView::from(&account),
            profile: form,
        };
        let view = View::new(view_names::SETTINGS_PROFILE, model).with_errors(errors);
        return Ok(Json(view).into_response());
    }

    state.accounts().update_profile(&mut account, form).await?;
    state.flash(account.id, PROFILE_UPDATED).await;

    Ok(Redirect::to("/settings/profile").into_response())
}

// ============================================================================
// Password
// ============================================================================

pub async fn password_form<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
) -> ServerResult<Json<View<PasswordModel>>> {
    let account = load_account(&state, &current).await?;
    let message = state.take_flash(account.id).await;

    let model = PasswordModel {
        account: AccountView::from(&account),
        password_form: PasswordForm::default(),
    };

    Ok(Json(View::new(view_names::SETTINGS_PASSWORD, model).with_message(message)))
}

pub async fn update_password<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Form(form): Form<PasswordForm>,
) -> ServerResult<Response> {
    let mut account = load_account(&state, &current).await?;

    if let Err(errors) = PasswordFormValidator.check(&form) {
        let model = PasswordModel {
            account: AccountView::from(&account),
            password_form: PasswordForm::default(),
        };
        let view = View::new(view_names::SETTINGS_PASSWORD, model).with_errors(errors);
        return Ok(Json(view).into_response());
    }

    state
        .accounts()
        .update_password(&mut account, &form.new_password)
        .await?;
    state.flash(account.id, PASSWORD_UPDATED).await;

    Ok(Redirect::to("/settings/password").into_response())
}

// ============================================================================
// Tags
// ============================================================================

pub async fn tags_form<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
) -> ServerResult<Json<View<TagsModel>>> {
    let account = load_account(&state, &current).await?;
    let whitelist = state
        .store
        .list_tags()
        .await?
        .into_iter()
        .map(|tag| tag.title)
        .collect();

    let model = TagsModel {
        account: AccountView::from(&account),
        tags: account.tag_titles(),
        whitelist,
    };

    Ok(Json(View::new(view_names::SETTINGS_TAGS, model)))
}

/// Adds a tag to the account, creating the tag on first use.
pub async fn add_tag<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Json(form): Json<TagForm>,
) -> ServerResult<StatusCode> {
    let mut account = load_account(&state, &current).await?;
    let accounts = state.accounts();

    let tag = accounts.find_or_create_tag(&form.tag_title).await?;
    accounts.add_tag(&mut account, tag).await?;

    Ok(StatusCode::OK)
}

/// Removes a tag from the account. Unknown titles are a bad request.
pub async fn remove_tag<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Json(form): Json<TagForm>,
) -> ServerResult<StatusCode> {
    let mut account = load_account(&state, &current).await?;
    let accounts = state.accounts();

    let tag = accounts.find_tag(&form.tag_title).await?;
    accounts.remove_tag(&mut account, &tag).await?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Zones
// ============================================================================

pub async fn zones_form<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
) -> ServerResult<Json<View<ZonesModel>>> {
    let account = load_account(&state, &current).await?;
    let whitelist = state
        .store
        .list_zones()
        .await?
        .iter()
        .map(ToString::to_string)
        .collect();

    let model = ZonesModel {
        account: AccountView::from(&account),
        zones: account.zone_names(),
        whitelist,
    };

    Ok(Json(View::new(view_names::SETTINGS_ZONES, model)))
}

pub async fn add_zone<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Json(form): Json<ZoneForm>,
) -> ServerResult<StatusCode> {
    let mut account = load_account(&state, &current).await?;
    let accounts = state.accounts();

    let zone = accounts.find_zone(&form).await?;
    accounts.add_zone(&mut account, zone).await?;

    Ok(StatusCode::OK)
}

pub async fn remove_zone<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Json(form): Json<ZoneForm>,
) -> ServerResult<StatusCode> {
    let mut account = load_account(&state, &current).await?;
    let accounts = state.accounts();

    let zone = accounts.find_zone(&form).await?;
    accounts.remove_zone(&mut account, &zone).await?;

    Ok(StatusCode::OK)
}

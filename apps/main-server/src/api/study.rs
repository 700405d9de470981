//! Study endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use forms::{StudyForm, StudyFormValidator, StudyView, Validator};
use study_store::StudyStore;

use crate::api::load_account;
use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentAccount;
use crate::state::AppState;

/// Creates a study managed by the current account.
pub async fn create_study<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Json(form): Json<StudyForm>,
) -> ServerResult<(StatusCode, Json<StudyView>)> {
    let account = load_account(&state, &current).await?;
    StudyFormValidator.check(&form).map_err(ServerError::Validation)?;

    let study = state.studies().create_study(&account, form).await?;

    Ok((StatusCode::CREATED, Json(StudyView::from(&study))))
}

pub async fn list_studies<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<StudyView>>> {
    let studies = state.studies().list_studies().await?;
    Ok(Json(studies.iter().map(StudyView::from).collect()))
}

pub async fn get_study<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(url): Path<String>,
) -> ServerResult<Json<StudyView>> {
    let study = state.studies().get_study(&url).await?;
    Ok(Json(StudyView::from(&study)))
}

pub async fn join_study<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(url): Path<String>,
) -> ServerResult<Json<StudyView>> {
    let account = load_account(&state, &current).await?;
    let studies = state.studies();

    let study = studies.get_study(&url).await?;
    let study = studies.join(study, &account).await?;

    Ok(Json(StudyView::from(&study)))
}

pub async fn leave_study<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(url): Path<String>,
) -> ServerResult<Json<StudyView>> {
    let account = load_account(&state, &current).await?;
    let studies = state.studies();

    let study = studies.get_study(&url).await?;
    let study = studies.leave(study, &account).await?;

    Ok(Json(StudyView::from(&study)))
}

//! Event and enrollment endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use entities::{Account, Study};
use forms::{EventForm, EventFormValidator, EventView, Validator};
use study_store::StudyStore;
use uuid::Uuid;

use crate::api::load_account;
use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentAccount;
use crate::state::AppState;

/// Loads the current account and a study it manages.
async fn load_managed_study<S: StudyStore>(
    state: &AppState<S>,
    current: &CurrentAccount,
    url: &str,
) -> ServerResult<(Account, Study)> {
    let account = load_account(state, current).await?;
    let studies = state.studies();
    let study = studies.get_study(url).await?;
    studies.ensure_manager(&study, &account)?;
    Ok((account, study))
}

pub async fn create_event<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(url): Path<String>,
    Json(form): Json<EventForm>,
) -> ServerResult<(StatusCode, Json<EventView>)> {
    let (account, study) = load_managed_study(&state, &current, &url).await?;
    EventFormValidator::new(Utc::now())
        .check(&form)
        .map_err(ServerError::Validation)?;

    let event = state.events().create_event(&study, &account, form).await?;

    Ok((StatusCode::CREATED, Json(EventView::from(&event))))
}

pub async fn list_events<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(url): Path<String>,
) -> ServerResult<Json<Vec<EventView>>> {
    let study = state.studies().get_study(&url).await?;
    let events = state.events().list_events(&study).await?;
    Ok(Json(events.iter().map(EventView::from).collect()))
}

pub async fn get_event<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((url, event_id)): Path<(String, Uuid)>,
) -> ServerResult<Json<EventView>> {
    let study = state.studies().get_study(&url).await?;
    let event = state.events().get_event(&study, event_id).await?;
    Ok(Json(EventView::from(&event)))
}

pub async fn update_event<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path((url, event_id)): Path<(String, Uuid)>,
    Json(form): Json<EventForm>,
) -> ServerResult<Json<EventView>> {
    let (_, study) = load_managed_study(&state, &current, &url).await?;
    EventFormValidator::new(Utc::now())
        .check(&form)
        .map_err(ServerError::Validation)?;

    let events = state.events();
    let event = events.get_event(&study, event_id).await?;
    let event = events.update_event(&event, form).await?;

    Ok(Json(EventView::from(&event)))
}

pub async fn delete_event<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path((url, event_id)): Path<(String, Uuid)>,
) -> ServerResult<StatusCode> {
    let (_, study) = load_managed_study(&state, &current, &url).await?;

    let events = state.events();
    let event = events.get_event(&study, event_id).await?;
    events.delete_event(&event).await?;

    Ok(StatusCode::OK)
}

pub async fn enroll<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path((url, event_id)): Path<(String, Uuid)>,
) -> ServerResult<Json<EventView>> {
    let account = load_account(&state, &current).await?;
    let study = state.studies().get_study(&url).await?;

    let events = state.events();
    let event = events.get_event(&study, event_id).await?;
    let event = events.enroll(event.id, account.id, Utc::now()).await?;

    Ok(Json(EventView::from(&event)))
}

pub async fn disenroll<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path((url, event_id)): Path<(String, Uuid)>,
) -> ServerResult<Json<EventView>> {
    let account = load_account(&state, &current).await?;
    let study = state.studies().get_study(&url).await?;

    let events = state.events();
    let event = events.get_event(&study, event_id).await?;
    let event = events.disenroll(event.id, account.id, Utc::now()).await?;

    Ok(Json(EventView::from(&event)))
}

/// Enrollment management actions available to study managers.
#[derive(Debug, Clone, Copy)]
enum EnrollmentAction {
    Accept,
    Reject,
    CheckIn,
    CancelCheckIn,
}

async fn manage_enrollment<S: StudyStore>(
    state: &AppState<S>,
    current: &CurrentAccount,
    (url, event_id, enrollment_id): (String, Uuid, Uuid),
    action: EnrollmentAction,
) -> ServerResult<Json<EventView>> {
    let (_, study) = load_managed_study(state, current, &url).await?;

    let events = state.events();
    let event = events.get_event(&study, event_id).await?;
    let event = match action {
        EnrollmentAction::Accept => events.accept(event.id, enrollment_id).await?,
        EnrollmentAction::Reject => events.reject(event.id, enrollment_id).await?,
        EnrollmentAction::CheckIn => events.check_in(event.id, enrollment_id).await?,
        EnrollmentAction::CancelCheckIn => events.cancel_check_in(event.id, enrollment_id).await?,
    };

    Ok(Json(EventView::from(&event)))
}

pub async fn accept_enrollment<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(path): Path<(String, Uuid, Uuid)>,
) -> ServerResult<Json<EventView>> {
    manage_enrollment(&state, &current, path, EnrollmentAction::Accept).await
}

pub async fn reject_enrollment<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(path): Path<(String, Uuid, Uuid)>,
) -> ServerResult<Json<EventView>> {
    manage_enrollment(&state, &current, path, EnrollmentAction::Reject).await
}

pub async fn check_in<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(path): Path<(String, Uuid, Uuid)>,
) -> ServerResult<Json<EventView>> {
    manage_enrollment(&state, &current, path, EnrollmentAction::CheckIn).await
}

pub async fn cancel_check_in<S: StudyStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentAccount>,
    Path(path): Path<(String, Uuid, Uuid)>,
) -> ServerResult<Json<EventView>> {
    manage_enrollment(&state, &current, path, EnrollmentAction::CancelCheckIn).await
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::api::test_support::{body_json, empty_request, json_request, TestApp};

    fn event_body(event_type: &str, limit: u32) -> serde_json::Value {
        let now = Utc::now();
        json!({
            "title": "Reading club",
            "eventType": event_type,
            "limitOfEnrollments": limit,
            "endEnrollmentDateTime": now + Duration::days(1),
            "startDateTime": now + Duration::days(2),
            "endDateTime": now + Duration::days(2) + Duration::hours(2),
        })
    }

    /// Creates `spring-study` and one event in it, returning the event id.
    async fn setup_event(app: &TestApp, event_type: &str, limit: u32) -> String {
        app.send(json_request(
            Method::POST,
            "/new-study",
            Some(&app.token),
            json!({ "url": "spring-study", "title": "Spring", "shortNote": "Learn Spring" }),
        ))
        .await;

        let response = app
            .send(json_request(
                Method::POST,
                "/study/spring-study/new-event",
                Some(&app.token),
                event_body(event_type, limit),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_and_list_events() {
        let app = TestApp::new().await;
        let event_id = setup_event(&app, "first_come_first_served", 2).await;

        let body = body_json(app.call(Method::GET, "/study/spring-study/events").await).await;
        assert_eq!(body[0]["id"], event_id);

        let uri = format!("/study/spring-study/events/{event_id}");
        let body = body_json(app.call(Method::GET, &uri).await).await;
        assert_eq!(body["remainingSpots"], 2);
    }

    #[tokio::test]
    async fn test_create_event_with_invalid_form() {
        let app = TestApp::new().await;
        setup_event(&app, "first_come_first_served", 2).await;

        let response = app
            .send(json_request(
                Method::POST,
                "/study/spring-study/new-event",
                Some(&app.token),
                event_body("first_come_first_served", 1),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["fields"][0]["field"], "limitOfEnrollments");
    }

    #[tokio::test]
    async fn test_only_managers_create_events() {
        let app = TestApp::new().await;
        setup_event(&app, "first_come_first_served", 2).await;
        let (_, token) = app.another_account("member").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/study/spring-study/new-event",
                Some(&token),
                event_body("first_come_first_served", 2),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_enroll_wait_list_and_promotion() {
        let app = TestApp::new().await;
        let event_id = setup_event(&app, "first_come_first_served", 2).await;
        let enroll = format!("/study/spring-study/events/{event_id}/enroll");
        let disenroll = format!("/study/spring-study/events/{event_id}/disenroll");

        let mut tokens = Vec::new();
        for nickname in ["first", "second", "third"] {
            let (_, token) = app.another_account(nickname).await;
            let response = app.send(empty_request(Method::POST, &enroll, Some(&token))).await;
            assert_eq!(response.status(), StatusCode::OK);
            tokens.push(token);
        }

        let response = app.send(empty_request(Method::POST, &enroll, Some(&tokens[0]))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .send(empty_request(Method::POST, &disenroll, Some(&tokens[0])))
            .await;
        let body = body_json(response).await;
        let statuses: Vec<&str> = body["enrollments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["accepted", "accepted"]);
    }

    #[tokio::test]
    async fn test_confirmative_accept_and_check_in() {
        let app = TestApp::new().await;
        let event_id = setup_event(&app, "confirmative_acceptance", 2).await;
        let (_, token) = app.another_account("member").await;

        let response = app
            .send(empty_request(
                Method::POST,
                &format!("/study/spring-study/events/{event_id}/enroll"),
                Some(&token),
            ))
            .await;
        let body = body_json(response).await;
        assert_eq!(body["enrollments"][0]["status"], "pending");
        let enrollment_id = body["enrollments"][0]["id"].as_str().unwrap().to_string();
        let base = format!("/study/spring-study/events/{event_id}/enrollments/{enrollment_id}");

        // Members cannot manage enrollments.
        let response = app
            .send(empty_request(Method::POST, &format!("{base}/accept"), Some(&token)))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(app.call(Method::POST, &format!("{base}/accept")).await).await;
        assert_eq!(body["enrollments"][0]["status"], "accepted");

        let body = body_json(app.call(Method::POST, &format!("{base}/checkin")).await).await;
        assert_eq!(body["enrollments"][0]["attended"], true);

        let response = app.call(Method::POST, &format!("{base}/reject")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(app.call(Method::POST, &format!("{base}/cancel-checkin")).await).await;
        assert_eq!(body["enrollments"][0]["attended"], false);
    }

    #[tokio::test]
    async fn test_edit_and_delete_event() {
        let app = TestApp::new().await;
        let event_id = setup_event(&app, "first_come_first_served", 2).await;
        let uri = format!("/study/spring-study/events/{event_id}");

        let mut body = event_body("first_come_first_served", 5);
        body["title"] = json!("Renamed");
        let response = app
            .send(json_request(
                Method::POST,
                &format!("{uri}/edit"),
                Some(&app.token),
                body,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "Renamed");
        assert_eq!(body["limitOfEnrollments"], 5);

        assert_eq!(app.call(Method::DELETE, &uri).await.status(), StatusCode::OK);
        assert_eq!(app.call(Method::GET, &uri).await.status(), StatusCode::NOT_FOUND);
    }
}

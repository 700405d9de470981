//! Response and view types.

use chrono::{DateTime, Utc};
use entities::{Account, Enrollment, EnrollmentStatus, Event, EventType, Study};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Errors, PasswordForm, ProfileForm};

// ============================================================================
// View Names
// ============================================================================

pub mod view_names {
    pub const SETTINGS_PROFILE: &str = "settings/profile";
    pub const SETTINGS_PASSWORD: &str = "settings/password";
    pub const SETTINGS_TAGS: &str = "settings/tags";
    pub const SETTINGS_ZONES: &str = "settings/zones";
}

/// Stand-in for a rendered page: the view that would be rendered, its model,
/// a one-time flash message and any field errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View<M> {
    pub view: String,
    pub model: M,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Errors::is_empty")]
    pub errors: Errors,
}

impl<M> View<M> {
    pub fn new(view: impl Into<String>, model: M) -> Self {
        Self {
            view: view.into(),
            model,
            message: None,
            errors: Errors::new(),
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_errors(mut self, errors: Errors) -> Self {
        self.errors = errors;
        self
    }
}

// ============================================================================
// Account Views
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub bio: Option<String>,
    pub url: Option<String>,
    pub occupation: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub zones: Vec<String>,
    pub joined_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            nickname: account.nickname.clone(),
            email: account.email.clone(),
            bio: account.bio.clone(),
            url: account.url.clone(),
            occupation: account.occupation.clone(),
            location: account.location.clone(),
            tags: account.tag_titles(),
            zones: account.zone_names(),
            joined_at: account.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub account: AccountView,
    pub token: TokenResponse,
}

// ============================================================================
// Settings Models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileModel {
    pub account: AccountView,
    pub profile: ProfileForm,
}

/// The password form is always sent back blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordModel {
    pub account: AccountView,
    pub password_form: PasswordForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsModel {
    pub account: AccountView,
    /// Titles of the account's tags.
    pub tags: Vec<String>,
    /// Titles of every known tag, for autocompletion.
    pub whitelist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesModel {
    pub account: AccountView,
    /// Display names of the account's zones.
    pub zones: Vec<String>,
    /// Display names of every known zone.
    pub whitelist: Vec<String>,
}

// ============================================================================
// Study Views
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyView {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub short_note: String,
    pub long_note: Option<String>,
    pub managers: Vec<Uuid>,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Study> for StudyView {
    fn from(study: &Study) -> Self {
        let mut managers: Vec<Uuid> = study.managers.iter().copied().collect();
        managers.sort();
        let mut members: Vec<Uuid> = study.members.iter().copied().collect();
        members.sort();
        Self {
            id: study.id,
            url: study.url.clone(),
            title: study.title.clone(),
            short_note: study.short_note.clone(),
            long_note: study.long_note.clone(),
            managers,
            members,
            created_at: study.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub id: Uuid,
    pub account_id: Uuid,
    pub status: EnrollmentStatus,
    pub attended: bool,
    pub enrolled_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentView {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.id,
            account_id: enrollment.account_id,
            status: enrollment.status,
            attended: enrollment.attended,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub study_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub limit_of_enrollments: Option<u32>,
    pub remaining_spots: Option<u32>,
    pub created_date_time: DateTime<Utc>,
    pub end_enrollment_date_time: DateTime<Utc>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub enrollments: Vec<EnrollmentView>,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            study_id: event.study_id,
            created_by: event.created_by,
            title: event.title.clone(),
            description: event.description.clone(),
            event_type: event.event_type,
            limit_of_enrollments: event.limit_of_enrollments,
            remaining_spots: event.remaining_spots(),
            created_date_time: event.created_at,
            end_enrollment_date_time: event.end_enrollment_at,
            start_date_time: event.start_at,
            end_date_time: event.end_at,
            enrollments: event.enrollments.iter().map(EnrollmentView::from).collect(),
        }
    }
}

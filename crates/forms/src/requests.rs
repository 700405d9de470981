//! Request forms accepted at the web boundary.

use chrono::{DateTime, Utc};
use entities::{Account, EventType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Account Forms
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpForm {
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub password_repeat: String,
}

/// Credentials for obtaining an access token. `username` is a nickname or
/// an email address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Settings Forms
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub bio: Option<String>,
    pub url: Option<String>,
    pub occupation: Option<String>,
    pub location: Option<String>,
}

impl ProfileForm {
    /// Pre-fills the form from the account's current profile.
    pub fn from_account(account: &Account) -> Self {
        Self {
            bio: account.bio.clone(),
            url: account.url.clone(),
            occupation: account.occupation.clone(),
            location: account.location.clone(),
        }
    }
}

/// Missing fields deserialize as empty strings so that an incomplete post is
/// reported as a field error instead of a malformed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordForm {
    pub new_password: String,
    pub new_password_repeat: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagForm {
    pub tag_title: String,
}

/// A zone in its display form, `part1(part2)/part3`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneForm {
    pub zone_name: String,
}

impl ZoneForm {
    /// Splits the display form into its three parts.
    pub fn parts(&self) -> Option<(&str, &str, &str)> {
        let (part1, rest) = self.zone_name.split_once('(')?;
        let (part2, part3) = rest.split_once(")/")?;
        Some((part1, part2, part3))
    }

    pub fn part1(&self) -> Option<&str> {
        self.parts().map(|(part1, _, _)| part1)
    }

    pub fn part2(&self) -> Option<&str> {
        self.parts().map(|(_, part2, _)| part2)
    }

    pub fn part3(&self) -> Option<&str> {
        self.parts().map(|(_, _, part3)| part3)
    }
}

// ============================================================================
// Study Forms
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyForm {
    pub url: String,
    pub title: String,
    pub short_note: String,
    pub long_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub limit_of_enrollments: Option<u32>,
    pub end_enrollment_date_time: DateTime<Utc>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_form_parts() {
        let form = ZoneForm {
            zone_name: "Andong(안동시)/North Gyeongsang".to_string(),
        };

        assert_eq!(form.part1(), Some("Andong"));
        assert_eq!(form.part2(), Some("안동시"));
        assert_eq!(form.part3(), Some("North Gyeongsang"));
    }

    #[test]
    fn test_zone_form_round_trips_display() {
        let zone = entities::Zone::new("A", "B", "C");
        let form = ZoneForm {
            zone_name: zone.to_string(),
        };

        assert_eq!(form.parts(), Some(("A", "B", "C")));
    }

    #[test]
    fn test_malformed_zone_name() {
        let form = ZoneForm {
            zone_name: "Seoul".to_string(),
        };
        assert_eq!(form.parts(), None);
    }

    #[test]
    fn test_tag_form_wire_name() {
        let form: TagForm = serde_json::from_str(r#"{"tagTitle":"newTag"}"#).unwrap();
        assert_eq!(form.tag_title, "newTag");
    }

    #[test]
    fn test_password_form_missing_field_defaults_to_empty() {
        let form: PasswordForm =
            serde_urlencoded::from_str("newPasword=11223344&newPasswordRepeat=22334455").unwrap();

        assert_eq!(form.new_password, "");
        assert_eq!(form.new_password_repeat, "22334455");
    }

    #[test]
    fn test_event_form_defaults() {
        let form: EventForm = serde_json::from_str(
            r#"{
                "title": "Reading",
                "endEnrollmentDateTime": "2030-01-01T00:00:00Z",
                "startDateTime": "2030-01-02T00:00:00Z",
                "endDateTime": "2030-01-02T02:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(form.event_type, EventType::FirstComeFirstServed);
        assert!(form.limit_of_enrollments.is_none());
        assert!(form.description.is_none());
    }
}

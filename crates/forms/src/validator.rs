//! Form validators.
//!
//! A validator inspects a form and records field errors into an [`Errors`]
//! collector. Validators never mutate the form and hold no per-call state,
//! so one instance can be reused for any number of validations.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{Errors, EventForm, PasswordForm, ProfileForm, SignUpForm, StudyForm};

/// Maximum length of a profile bio, in characters.
pub const BIO_MAX_LENGTH: usize = 35;
/// Maximum length of the other profile fields, in characters.
pub const PROFILE_FIELD_MAX_LENGTH: usize = 50;
/// Accepted password length range, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 50;
/// Maximum length of study and event titles and of a study short note.
pub const TITLE_MAX_LENGTH: usize = 50;
/// Smallest allowed enrollment limit.
pub const MIN_LIMIT_OF_ENROLLMENTS: u32 = 2;

pub const PASSWORD_MISMATCH_MESSAGE: &str = "passwords do not match";

static NICKNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ㄱ-ㅎ가-힣a-z0-9_-]{3,20}$").expect("NICKNAME_REGEX: invalid regex pattern")
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

static STUDY_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{5,20}$").expect("STUDY_URL_REGEX: invalid regex pattern")
});

/// Validates forms of type `T`.
pub trait Validator<T: ?Sized> {
    /// Records every rejected field of `target` into `errors`.
    fn validate(&self, target: &T, errors: &mut Errors);

    /// Validates `target` into a fresh collector.
    fn check(&self, target: &T) -> Result<(), Errors> {
        let mut errors = Errors::new();
        self.validate(target, &mut errors);
        errors.into_result()
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn reject_if_longer(errors: &mut Errors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| char_len(v) > max) {
        errors.reject_value(
            field,
            "length",
            format!("must be at most {max} characters"),
        );
    }
}

fn reject_if_blank(errors: &mut Errors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.reject_value(field, "not_blank", "must not be blank");
        return true;
    }
    false
}

fn validate_password_length(errors: &mut Errors, field: &str, password: &str) {
    let len = char_len(password);
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len) {
        errors.reject_value(
            field,
            "length",
            format!(
                "must be between {PASSWORD_MIN_LENGTH} and {PASSWORD_MAX_LENGTH} characters"
            ),
        );
    }
}

/// Checks that the two new-password fields are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordFormValidator;

impl Validator<PasswordForm> for PasswordFormValidator {
    fn validate(&self, target: &PasswordForm, errors: &mut Errors) {
        if target.new_password != target.new_password_repeat {
            errors.reject_value(
                "newPassword",
                "invalid.newPassword",
                PASSWORD_MISMATCH_MESSAGE,
            );
            return;
        }
        validate_password_length(errors, "newPassword", &target.new_password);
    }
}

/// Checks profile field lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFormValidator;

impl Validator<ProfileForm> for ProfileFormValidator {
    fn validate(&self, target: &ProfileForm, errors: &mut Errors) {
        reject_if_longer(errors, "bio", target.bio.as_deref(), BIO_MAX_LENGTH);
        reject_if_longer(errors, "url", target.url.as_deref(), PROFILE_FIELD_MAX_LENGTH);
        reject_if_longer(
            errors,
            "occupation",
            target.occupation.as_deref(),
            PROFILE_FIELD_MAX_LENGTH,
        );
        reject_if_longer(
            errors,
            "location",
            target.location.as_deref(),
            PROFILE_FIELD_MAX_LENGTH,
        );
    }
}

/// Checks the shape of a sign-up form. Uniqueness of nickname and email is
/// checked against the store when the account is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignUpFormValidator;

impl Validator<SignUpForm> for SignUpFormValidator {
    fn validate(&self, target: &SignUpForm, errors: &mut Errors) {
        if !reject_if_blank(errors, "nickname", &target.nickname)
            && !NICKNAME_REGEX.is_match(&target.nickname)
        {
            errors.reject_value(
                "nickname",
                "pattern",
                "3 to 20 lowercase letters, digits, '_' or '-'",
            );
        }

        if !reject_if_blank(errors, "email", &target.email) && !EMAIL_REGEX.is_match(&target.email)
        {
            errors.reject_value("email", "email", "not a valid email address");
        }

        validate_password_length(errors, "password", &target.password);
        if target.password != target.password_repeat {
            errors.reject_value(
                "passwordRepeat",
                "invalid.passwordRepeat",
                PASSWORD_MISMATCH_MESSAGE,
            );
        }
    }
}

/// Checks a study form.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudyFormValidator;

impl Validator<StudyForm> for StudyFormValidator {
    fn validate(&self, target: &StudyForm, errors: &mut Errors) {
        if !STUDY_URL_REGEX.is_match(&target.url) {
            errors.reject_value(
                "url",
                "pattern",
                "5 to 20 letters, digits, '_' or '-'",
            );
        }
        if !reject_if_blank(errors, "title", &target.title) {
            reject_if_longer(errors, "title", Some(&target.title), TITLE_MAX_LENGTH);
        }
        if !reject_if_blank(errors, "shortNote", &target.short_note) {
            reject_if_longer(
                errors,
                "shortNote",
                Some(&target.short_note),
                TITLE_MAX_LENGTH,
            );
        }
    }
}

/// Checks an event form against the current time.
#[derive(Debug, Clone, Copy)]
pub struct EventFormValidator {
    now: DateTime<Utc>,
}

impl EventFormValidator {
    /// Creates a validator that treats `now` as the current time.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for EventFormValidator {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Validator<EventForm> for EventFormValidator {
    fn validate(&self, target: &EventForm, errors: &mut Errors) {
        if !reject_if_blank(errors, "title", &target.title) {
            reject_if_longer(errors, "title", Some(&target.title), TITLE_MAX_LENGTH);
        }

        if target
            .limit_of_enrollments
            .is_some_and(|limit| limit < MIN_LIMIT_OF_ENROLLMENTS)
        {
            errors.reject_value(
                "limitOfEnrollments",
                "min",
                format!("must be at least {MIN_LIMIT_OF_ENROLLMENTS}"),
            );
        }

        if target.end_enrollment_date_time <= self.now {
            errors.reject_value(
                "endEnrollmentDateTime",
                "wrong.datetime",
                "enrollment must end in the future",
            );
        }
        if target.start_date_time < target.end_enrollment_date_time {
            errors.reject_value(
                "startDateTime",
                "wrong.datetime",
                "event must start after enrollment ends",
            );
        }
        if target.end_date_time < target.start_date_time {
            errors.reject_value(
                "endDateTime",
                "wrong.datetime",
                "event must end after it starts",
            );
        }
    }
}

//! Study-related entity definitions.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A study group. Events belong to a study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    /// Unique identifier.
    pub id: Uuid,
    /// URL slug, unique across studies.
    pub url: String,
    /// Study title.
    pub title: String,
    /// One-line summary.
    pub short_note: String,
    /// Full description.
    pub long_note: Option<String>,
    /// Accounts allowed to manage the study and its events.
    pub managers: HashSet<Uuid>,
    /// Accounts that joined the study.
    pub members: HashSet<Uuid>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped by the store on every update.
    pub version: u64,
}

impl Study {
    /// Creates a new study managed by `manager_id`.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        short_note: impl Into<String>,
        manager_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title: title.into(),
            short_note: short_note.into(),
            long_note: None,
            managers: HashSet::from([manager_id]),
            members: HashSet::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Returns true if the account manages this study.
    pub fn is_manager(&self, account_id: Uuid) -> bool {
        self.managers.contains(&account_id)
    }

    /// Returns true if the account is a plain member of this study.
    pub fn is_member(&self, account_id: Uuid) -> bool {
        self.members.contains(&account_id)
    }

    /// Adds a member. Managers are never added as members.
    pub fn add_member(&mut self, account_id: Uuid) -> bool {
        if self.is_manager(account_id) {
            return false;
        }
        let added = self.members.insert(account_id);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    /// Removes a member.
    pub fn remove_member(&mut self, account_id: Uuid) -> bool {
        let removed = self.members.remove(&account_id);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

impl PartialEq for Study {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Study {}

impl Hash for Study {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_creation() {
        let manager = Uuid::new_v4();
        let mut study = Study::new("spring-jpa", "Spring JPA", "Weekly JPA reading", manager);
        study.long_note = Some("We read one chapter a week.".to_string());

        assert_eq!(study.url, "spring-jpa");
        assert!(study.is_manager(manager));
        assert!(!study.is_member(manager));
        assert_eq!(
            study.long_note,
            Some("We read one chapter a week.".to_string())
        );
    }

    #[test]
    fn test_membership() {
        let manager = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut study = Study::new("spring-jpa", "Spring JPA", "Weekly", manager);

        assert!(!study.add_member(manager));
        assert!(study.add_member(member));
        assert!(!study.add_member(member));
        assert!(study.is_member(member));

        assert!(study.remove_member(member));
        assert!(!study.remove_member(member));
    }
}

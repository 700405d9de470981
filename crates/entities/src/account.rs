//! Account-related entity definitions.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Tag, Zone};

/// A member of the community.
///
/// The account is the consistency boundary for its interest tags and zones.
/// Both relations hold shared [`Tag`] and [`Zone`] values by reference;
/// removing one from an account never deletes the tag or zone itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique nickname.
    pub nickname: String,
    /// Unique email address.
    pub email: String,
    /// Hashed password (PHC string).
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Short self-introduction.
    pub bio: Option<String>,
    /// Personal homepage.
    pub url: Option<String>,
    /// Occupation.
    pub occupation: Option<String>,
    /// Free-form location.
    pub location: Option<String>,
    /// Interest tags.
    pub tags: HashSet<Tag>,
    /// Zones of interest.
    pub zones: HashSet<Zone>,
    /// When the account signed up.
    pub joined_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped by the store on every update.
    pub version: u64,
}

impl Account {
    /// Creates a new account with an already hashed password.
    pub fn new(
        nickname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            bio: None,
            url: None,
            occupation: None,
            location: None,
            tags: HashSet::new(),
            zones: HashSet::new(),
            joined_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Adds a tag. Returns false if the account already had it.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    /// Removes a tag. Returns false if the account did not have it.
    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        self.tags.remove(tag)
    }

    /// Returns true if the account has the given tag.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Adds a zone. Returns false if the account already had it.
    pub fn add_zone(&mut self, zone: Zone) -> bool {
        self.zones.insert(zone)
    }

    /// Removes a zone. Returns false if the account did not have it.
    pub fn remove_zone(&mut self, zone: &Zone) -> bool {
        self.zones.remove(zone)
    }

    /// Returns true if the account has the given zone.
    pub fn has_zone(&self, zone: &Zone) -> bool {
        self.zones.contains(zone)
    }

    /// Tag titles in sorted order.
    pub fn tag_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.tags.iter().map(|t| t.title.clone()).collect();
        titles.sort();
        titles
    }

    /// Zone display names in sorted order.
    pub fn zone_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.zones.iter().map(Zone::to_string).collect();
        names.sort();
        names
    }

    /// Marks the record as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gyuwon() -> Account {
        Account::new("gyuwon", "google@google.com", "hash")
    }

    #[test]
    fn test_account_creation() {
        let account = gyuwon();

        assert_eq!(account.nickname, "gyuwon");
        assert_eq!(account.email, "google@google.com");
        assert!(account.bio.is_none());
        assert!(account.tags.is_empty());
        assert!(account.zones.is_empty());
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let mut account = gyuwon();
        let tag = Tag::new("newTag");

        assert!(account.add_tag(tag.clone()));
        assert!(!account.add_tag(tag.clone()));
        assert_eq!(account.tags.len(), 1);
        assert!(account.has_tag(&tag));
    }

    #[test]
    fn test_add_then_remove_tag_restores_prior_state() {
        let mut account = gyuwon();
        let existing = Tag::new("spring");
        account.add_tag(existing.clone());
        let before = account.tags.clone();

        let tag = Tag::new("newTag");
        account.add_tag(tag.clone());
        assert!(account.remove_tag(&tag));

        assert_eq!(account.tags, before);
        assert!(!account.remove_tag(&tag));
    }

    #[test]
    fn test_zone_round_trip() {
        let mut account = gyuwon();
        let zone = Zone::new("A", "B", "C");

        assert!(account.add_zone(zone.clone()));
        assert!(!account.add_zone(zone.clone()));
        assert_eq!(account.zone_names(), vec!["A(B)/C".to_string()]);

        assert!(account.remove_zone(&zone));
        assert!(!account.has_zone(&zone));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = gyuwon();
        let json = serde_json::to_value(&account).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["nickname"], "gyuwon");
    }
}

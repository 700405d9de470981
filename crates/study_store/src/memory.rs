//! In-memory store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{Account, Event, Study, Tag, Zone};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{StoreError, StoreResult, StudyStore};

/// In-memory store backed by one locked map per table.
#[derive(Debug, Default)]
pub struct MemoryStudyStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    tags: Arc<RwLock<HashMap<Uuid, Tag>>>,
    zones: Arc<RwLock<HashMap<Uuid, Zone>>>,
    studies: Arc<RwLock<HashMap<Uuid, Study>>>,
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl MemoryStudyStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fails if another account already uses the nickname or email of `account`.
fn check_account_unique(accounts: &HashMap<Uuid, Account>, account: &Account) -> StoreResult<()> {
    for other in accounts.values().filter(|a| a.id != account.id) {
        if other.nickname == account.nickname {
            return Err(StoreError::already_exists("Account", account.nickname.clone()));
        }
        if other.email == account.email {
            return Err(StoreError::already_exists("Account", account.email.clone()));
        }
    }
    Ok(())
}

#[async_trait]
impl StudyStore for MemoryStudyStore {
    // =========================================================================
    // Account operations
    // =========================================================================

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(StoreError::already_exists("Account", account.id.to_string()));
        }
        check_account_unique(&accounts, &account)?;
        accounts.insert(account.id, account.clone());
        tracing::debug!(account_id = %account.id, "Account stored");
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn get_account_by_nickname(&self, nickname: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.nickname == nickname).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn update_account(&self, mut account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let stored_version = match accounts.get(&account.id) {
            Some(stored) => stored.version,
            None => return Err(StoreError::not_found("Account", account.id.to_string())),
        };
        if stored_version != account.version {
            return Err(StoreError::conflict(
                "Account",
                account.id.to_string(),
                account.version,
                stored_version,
            ));
        }
        check_account_unique(&accounts, &account)?;
        account.touch();
        account.version += 1;
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.remove(&id).is_none() {
            return Err(StoreError::not_found("Account", id.to_string()));
        }
        Ok(())
    }

    async fn delete_all_accounts(&self) -> StoreResult<()> {
        self.accounts.write().await.clear();
        Ok(())
    }

    // =========================================================================
    // Tag operations
    // =========================================================================

    async fn create_tag(&self, tag: Tag) -> StoreResult<Tag> {
        let mut tags = self.tags.write().await;
        if tags.values().any(|t| t.title == tag.title) {
            return Err(StoreError::already_exists("Tag", tag.title.clone()));
        }
        tags.insert(tag.id, tag.clone());
        tracing::debug!(tag_id = %tag.id, title = %tag.title, "Tag stored");
        Ok(tag)
    }

    async fn get_tag_by_title(&self, title: &str) -> StoreResult<Option<Tag>> {
        let tags = self.tags.read().await;
        Ok(tags.values().find(|t| t.title == title).cloned())
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let tags = self.tags.read().await;
        let mut result: Vec<Tag> = tags.values().cloned().collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(result)
    }

    async fn delete_tag(&self, id: Uuid) -> StoreResult<()> {
        let mut tags = self.tags.write().await;
        if tags.remove(&id).is_none() {
            return Err(StoreError::not_found("Tag", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Zone operations
    // =========================================================================

    async fn create_zone(&self, zone: Zone) -> StoreResult<Zone> {
        let mut zones = self.zones.write().await;
        if zones.values().any(|z| z.matches(&zone.part1, &zone.part3)) {
            return Err(StoreError::already_exists("Zone", zone.to_string()));
        }
        zones.insert(zone.id, zone.clone());
        Ok(zone)
    }

    async fn get_zone_by_parts(&self, part1: &str, part3: &str) -> StoreResult<Option<Zone>> {
        let zones = self.zones.read().await;
        Ok(zones.values().find(|z| z.matches(part1, part3)).cloned())
    }

    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        let zones = self.zones.read().await;
        let mut result: Vec<Zone> = zones.values().cloned().collect();
        result.sort_by_key(|z| z.to_string());
        Ok(result)
    }

    async fn delete_all_zones(&self) -> StoreResult<()> {
        self.zones.write().await.clear();
        Ok(())
    }

    // =========================================================================
    // Study operations
    // =========================================================================

    async fn create_study(&self, study: Study) -> StoreResult<Study> {
        let mut studies = self.studies.write().await;
        if studies.values().any(|s| s.url == study.url) {
            return Err(StoreError::already_exists("Study", study.url.clone()));
        }
        studies.insert(study.id, study.clone());
        Ok(study)
    }

    async fn get_study(&self, id: Uuid) -> StoreResult<Option<Study>> {
        let studies = self.studies.read().await;
        Ok(studies.get(&id).cloned())
    }

    async fn get_study_by_url(&self, url: &str) -> StoreResult<Option<Study>> {
        let studies = self.studies.read().await;
        Ok(studies.values().find(|s| s.url == url).cloned())
    }

    async fn list_studies(&self) -> StoreResult<Vec<Study>> {
        let studies = self.studies.read().await;
        let mut result: Vec<Study> = studies.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_study(&self, mut study: Study) -> StoreResult<Study> {
        let mut studies = self.studies.write().await;
        let stored_version = match studies.get(&study.id) {
            Some(stored) => stored.version,
            None => return Err(StoreError::not_found("Study", study.id.to_string())),
        };
        if stored_version != study.version {
            return Err(StoreError::conflict(
                "Study",
                study.id.to_string(),
                study.version,
                stored_version,
            ));
        }
        if studies
            .values()
            .any(|s| s.id != study.id && s.url == study.url)
        {
            return Err(StoreError::already_exists("Study", study.url.clone()));
        }
        study.updated_at = chrono::Utc::now();
        study.version += 1;
        studies.insert(study.id, study.clone());
        Ok(study)
    }

    // =========================================================================
    // Event operations
    // =========================================================================

    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(StoreError::already_exists("Event", event.id.to_string()));
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn list_events(&self, study_id: Uuid) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut result: Vec<Event> = events
            .values()
            .filter(|e| e.study_id == study_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.start_at.cmp(&b.start_at));
        Ok(result)
    }

    async fn update_event(&self, mut event: Event) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        let stored_version = match events.get(&event.id) {
            Some(stored) => stored.version,
            None => return Err(StoreError::not_found("Event", event.id.to_string())),
        };
        if stored_version != event.version {
            return Err(StoreError::conflict(
                "Event",
                event.id.to_string(),
                event.version,
                stored_version,
            ));
        }
        event.version += 1;
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        let mut events = self.events.write().await;
        if events.remove(&id).is_none() {
            return Err(StoreError::not_found("Event", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use entities::{EventSchedule, EventType};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn sample_event(study_id: Uuid, created_by: Uuid) -> Event {
        let now = Utc::now();
        let schedule = EventSchedule::new(
            now + Duration::days(1),
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(2),
        )
        .unwrap();
        Event::new(study_id, created_by, "Reading", EventType::FirstComeFirstServed, schedule)
    }

    #[tokio::test]
    async fn test_account_crud() {
        let store = MemoryStudyStore::new();

        // Create
        let account = Account::new("gyuwon", "google@google.com", "hash");
        let created = assert_ok!(store.create_account(account).await);

        // Get
        let fetched = store.get_account(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.nickname, "gyuwon");
        let by_nickname = store.get_account_by_nickname("gyuwon").await.unwrap();
        assert_eq!(by_nickname.map(|a| a.id), Some(created.id));
        let by_email = store.get_account_by_email("google@google.com").await.unwrap();
        assert_eq!(by_email.map(|a| a.id), Some(created.id));

        // Update
        let mut changed = fetched.clone();
        changed.bio = Some("hello".to_string());
        assert_ok!(store.update_account(changed).await);
        let fetched = store.get_account(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.bio.as_deref(), Some("hello"));

        // Delete
        assert_ok!(store.delete_account(created.id).await);
        assert!(store.get_account(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_uniqueness() {
        let store = MemoryStudyStore::new();
        store
            .create_account(Account::new("gyuwon", "google@google.com", "hash"))
            .await
            .unwrap();

        let same_nickname = Account::new("gyuwon", "other@google.com", "hash");
        let err = assert_err!(store.create_account(same_nickname).await);
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let same_email = Account::new("other", "google@google.com", "hash");
        assert_err!(store.create_account(same_email).await);

        let mut renamed = Account::new("another", "another@google.com", "hash");
        renamed = store.create_account(renamed).await.unwrap();
        renamed.nickname = "gyuwon".to_string();
        assert_err!(store.update_account(renamed).await);
    }

    #[tokio::test]
    async fn test_delete_all_accounts() {
        let store = MemoryStudyStore::new();
        store
            .create_account(Account::new("one", "one@example.com", "hash"))
            .await
            .unwrap();
        store
            .create_account(Account::new("two", "two@example.com", "hash"))
            .await
            .unwrap();

        assert_ok!(store.delete_all_accounts().await);
        assert!(store.get_account_by_nickname("one").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tag_titles_are_unique_and_case_sensitive() {
        let store = MemoryStudyStore::new();
        assert_ok!(store.create_tag(Tag::new("spring")).await);
        assert_err!(store.create_tag(Tag::new("spring")).await);
        assert_ok!(store.create_tag(Tag::new("Spring")).await);

        let titles: Vec<String> = store
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Spring".to_string(), "spring".to_string()]);
        assert!(store.get_tag_by_title("SPRING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zone_lookup_by_parts() {
        let store = MemoryStudyStore::new();
        let zone = store.create_zone(Zone::new("A", "B", "C")).await.unwrap();

        let found = store.get_zone_by_parts("A", "C").await.unwrap();
        assert_eq!(found.map(|z| z.id), Some(zone.id));
        assert!(store.get_zone_by_parts("A", "B").await.unwrap().is_none());

        assert_ok!(store.delete_all_zones().await);
        assert!(store.list_zones().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_study_url_is_unique() {
        let store = MemoryStudyStore::new();
        let manager = Uuid::new_v4();
        let study = store
            .create_study(Study::new("spring-study", "Spring", "Learn Spring", manager))
            .await
            .unwrap();

        let duplicate = Study::new("spring-study", "Other", "Other", manager);
        assert_err!(store.create_study(duplicate).await);

        let fetched = store.get_study_by_url("spring-study").await.unwrap().unwrap();
        assert_eq!(fetched.id, study.id);
    }

    #[tokio::test]
    async fn test_stale_account_update_conflicts() {
        let store = MemoryStudyStore::new();
        let account = store
            .create_account(Account::new("gyuwon", "google@google.com", "hash"))
            .await
            .unwrap();
        let mut first = account.clone();
        let mut second = account;

        first.bio = Some("first".to_string());
        let saved = assert_ok!(store.update_account(first).await);
        assert_eq!(saved.version, 1);

        second.location = Some("Seoul".to_string());
        let err = assert_err!(store.update_account(second).await);
        assert!(err.is_conflict());

        let stored = store.get_account(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.bio.as_deref(), Some("first"));
        assert!(stored.location.is_none());
    }

    #[tokio::test]
    async fn test_stale_study_update_conflicts() {
        let store = MemoryStudyStore::new();
        let study = store
            .create_study(Study::new("spring-study", "Spring", "Learn Spring", Uuid::new_v4()))
            .await
            .unwrap();
        let mut first = study.clone();
        let mut second = study;

        first.add_member(Uuid::new_v4());
        let saved = assert_ok!(store.update_study(first).await);
        assert_eq!(saved.version, 1);

        second.add_member(Uuid::new_v4());
        let err = assert_err!(store.update_study(second).await);
        assert!(err.is_conflict());
        assert_eq!(store.get_study(saved.id).await.unwrap().unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_update_event_bumps_version() {
        let store = MemoryStudyStore::new();
        let event = store
            .create_event(sample_event(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(event.version, 0);

        let updated = store.update_event(event).await.unwrap();
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_stale_event_update_conflicts() {
        let store = MemoryStudyStore::new();
        let event = store
            .create_event(sample_event(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        let first = event.clone();
        let second = event;

        assert_ok!(store.update_event(first).await);
        let err = assert_err!(store.update_event(second).await);
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_list_events_by_study() {
        let store = MemoryStudyStore::new();
        let study_id = Uuid::new_v4();
        let creator = Uuid::new_v4();
        store.create_event(sample_event(study_id, creator)).await.unwrap();
        store.create_event(sample_event(study_id, creator)).await.unwrap();
        store
            .create_event(sample_event(Uuid::new_v4(), creator))
            .await
            .unwrap();

        assert_eq!(store.list_events(study_id).await.unwrap().len(), 2);

        let event = store.list_events(study_id).await.unwrap().remove(0);
        assert_ok!(store.delete_event(event.id).await);
        assert_eq!(store.list_events(study_id).await.unwrap().len(), 1);
    }
}

//! Store trait definitions.

use async_trait::async_trait;
use entities::{Account, Event, Study, Tag, Zone};
use uuid::Uuid;

use crate::StoreResult;

/// Trait for StudyHub storage operations.
///
/// Lookups return `Ok(None)` for missing rows. Writes that would break a
/// unique field fail with `StoreError::AlreadyExists`.
#[async_trait]
pub trait StudyStore: Send + Sync {
    // =========================================================================
    // Account operations
    // =========================================================================

    /// Creates a new account. Nickname and email must be unused.
    async fn create_account(&self, account: Account) -> StoreResult<Account>;

    /// Gets an account by ID.
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Gets an account by nickname.
    async fn get_account_by_nickname(&self, nickname: &str) -> StoreResult<Option<Account>>;

    /// Gets an account by email.
    async fn get_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Saves an account if its version matches the stored one.
    ///
    /// The returned account carries the bumped version. A stale version fails
    /// with `StoreError::Conflict`.
    async fn update_account(&self, account: Account) -> StoreResult<Account>;

    /// Deletes an account.
    async fn delete_account(&self, id: Uuid) -> StoreResult<()>;

    /// Deletes every account.
    async fn delete_all_accounts(&self) -> StoreResult<()>;

    // =========================================================================
    // Tag operations
    // =========================================================================

    /// Creates a new tag. Titles are unique and case-sensitive.
    async fn create_tag(&self, tag: Tag) -> StoreResult<Tag>;

    /// Gets a tag by title.
    async fn get_tag_by_title(&self, title: &str) -> StoreResult<Option<Tag>>;

    /// Lists all tags ordered by title.
    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;

    /// Deletes a tag.
    async fn delete_tag(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Zone operations
    // =========================================================================

    /// Creates a new zone.
    async fn create_zone(&self, zone: Zone) -> StoreResult<Zone>;

    /// Gets a zone by its first and third parts.
    async fn get_zone_by_parts(&self, part1: &str, part3: &str) -> StoreResult<Option<Zone>>;

    /// Lists all zones ordered by display name.
    async fn list_zones(&self) -> StoreResult<Vec<Zone>>;

    /// Deletes every zone.
    async fn delete_all_zones(&self) -> StoreResult<()>;

    // =========================================================================
    // Study operations
    // =========================================================================

    /// Creates a new study. The url must be unused.
    async fn create_study(&self, study: Study) -> StoreResult<Study>;

    /// Gets a study by ID.
    async fn get_study(&self, id: Uuid) -> StoreResult<Option<Study>>;

    /// Gets a study by url.
    async fn get_study_by_url(&self, url: &str) -> StoreResult<Option<Study>>;

    /// Lists all studies, newest first.
    async fn list_studies(&self) -> StoreResult<Vec<Study>>;

    /// Saves a study if its version matches the stored one.
    async fn update_study(&self, study: Study) -> StoreResult<Study>;

    // =========================================================================
    // Event operations
    // =========================================================================

    /// Creates a new event.
    async fn create_event(&self, event: Event) -> StoreResult<Event>;

    /// Gets an event by ID.
    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Lists the events of a study ordered by start time.
    async fn list_events(&self, study_id: Uuid) -> StoreResult<Vec<Event>>;

    /// Saves an event if its version matches the stored one.
    ///
    /// The returned event carries the bumped version. A stale version fails
    /// with `StoreError::Conflict`.
    async fn update_event(&self, event: Event) -> StoreResult<Event>;

    /// Deletes an event.
    async fn delete_event(&self, id: Uuid) -> StoreResult<()>;
}

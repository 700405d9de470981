//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use auth::{Argon2Hasher, JwtManager};
use study_store::StudyStore;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::services::{AccountService, EventService, StudyService};

/// One-time messages shown by the next settings page an account loads.
#[derive(Debug, Default)]
pub struct FlashMessages {
    /// Map of account ID to its pending message.
    messages: HashMap<Uuid, String>,
}

impl FlashMessages {
    /// Creates an empty message store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a message for an account, replacing any pending one.
    pub fn put(&mut self, account_id: Uuid, message: impl Into<String>) {
        self.messages.insert(account_id, message.into());
    }

    /// Removes and returns the pending message of an account.
    pub fn take(&mut self, account_id: &Uuid) -> Option<String> {
        self.messages.remove(account_id)
    }
}

/// Shared application state.
pub struct AppState<S: StudyStore> {
    /// Server configuration.
    pub config: Config,
    /// Study store.
    pub store: S,
    /// Access token manager.
    pub jwt_manager: JwtManager,
    /// Password hasher.
    pub hasher: Argon2Hasher,
    /// Flash messages.
    pub flash_messages: RwLock<FlashMessages>,
}

impl<S: StudyStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        Self {
            config,
            store,
            jwt_manager,
            hasher: Argon2Hasher::new(),
            flash_messages: RwLock::new(FlashMessages::new()),
        }
    }

    pub fn accounts(&self) -> AccountService<'_, S> {
        AccountService::new(&self.store, &self.hasher)
    }

    pub fn studies(&self) -> StudyService<'_, S> {
        StudyService::new(&self.store)
    }

    pub fn events(&self) -> EventService<'_, S> {
        EventService::new(&self.store)
    }

    /// Stores a flash message for an account.
    pub async fn flash(&self, account_id: Uuid, message: impl Into<String>) {
        self.flash_messages.write().await.put(account_id, message);
    }

    /// Consumes the flash message of an account.
    pub async fn take_flash(&self, account_id: Uuid) -> Option<String> {
        self.flash_messages.write().await.take(&account_id)
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config, store and token manager.
pub fn create_shared_state<S: StudyStore>(
    config: Config,
    store: S,
    jwt_manager: JwtManager,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, jwt_manager))
}

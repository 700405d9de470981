//! Account aggregate operations.

use auth::{AuthError, PasswordHasher};
use entities::{Account, Tag, Zone};
use forms::{ProfileForm, SignUpForm, ZoneForm};
use study_store::{StoreError, StudyStore};

use crate::error::{ServerError, ServerResult};
use crate::services::MAX_UPDATE_ATTEMPTS;

/// Mutations of the account aggregate.
///
/// Every mutation is committed with the version the account was loaded at.
/// When another request saved the account first, the change is re-applied to
/// the stored copy. On success the caller's copy matches the store.
pub struct AccountService<'a, S: StudyStore> {
    store: &'a S,
    hasher: &'a dyn PasswordHasher,
}

impl<'a, S: StudyStore> AccountService<'a, S> {
    pub fn new(store: &'a S, hasher: &'a dyn PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Creates an account from a validated sign-up form.
    pub async fn make_account(&self, form: &SignUpForm) -> ServerResult<Account> {
        if self.store.get_account_by_nickname(&form.nickname).await?.is_some() {
            return Err(ServerError::field(
                "nickname",
                "duplicate.nickname",
                "nickname is already in use",
            ));
        }
        if self.store.get_account_by_email(&form.email).await?.is_some() {
            return Err(ServerError::field(
                "email",
                "duplicate.email",
                "email is already in use",
            ));
        }

        let password_hash = self.hasher.hash(&form.password)?;
        let account = self
            .store
            .create_account(Account::new(&form.nickname, &form.email, password_hash))
            .await?;

        tracing::info!(account_id = %account.id, nickname = %account.nickname, "Account created");

        Ok(account)
    }

    /// Checks credentials. `username` is a nickname or an email address.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServerResult<Account> {
        let account = match self.store.get_account_by_nickname(username).await? {
            Some(account) => Some(account),
            None => self.store.get_account_by_email(username).await?,
        };
        let account = account.ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &account.password_hash)? {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(account)
    }

    /// Returns the tag with the given title, creating it on first use.
    pub async fn find_or_create_tag(&self, title: &str) -> ServerResult<Tag> {
        if title.trim().is_empty() {
            return Err(ServerError::InvalidRequest("Tag title must not be blank".to_string()));
        }
        if let Some(tag) = self.store.get_tag_by_title(title).await? {
            return Ok(tag);
        }

        match self.store.create_tag(Tag::new(title)).await {
            Ok(tag) => {
                tracing::info!(tag_id = %tag.id, title = %tag.title, "Tag created");
                Ok(tag)
            }
            // Created concurrently by another request.
            Err(StoreError::AlreadyExists { .. }) => self
                .store
                .get_tag_by_title(title)
                .await?
                .ok_or_else(|| ServerError::Internal(format!("Tag {title} vanished"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns an existing tag. Unknown titles are rejected.
    pub async fn find_tag(&self, title: &str) -> ServerResult<Tag> {
        self.store
            .get_tag_by_title(title)
            .await?
            .ok_or_else(|| ServerError::InvalidRequest(format!("Unknown tag: {title}")))
    }

    /// Resolves a zone from its display name. Zones are never created here.
    pub async fn find_zone(&self, form: &ZoneForm) -> ServerResult<Zone> {
        let (part1, _, part3) = form
            .parts()
            .ok_or_else(|| ServerError::InvalidRequest(format!("Malformed zone: {}", form.zone_name)))?;

        self.store
            .get_zone_by_parts(part1, part3)
            .await?
            .ok_or_else(|| ServerError::InvalidRequest(format!("Unknown zone: {}", form.zone_name)))
    }

    pub async fn add_tag(&self, account: &mut Account, tag: Tag) -> ServerResult<()> {
        let tag_id = tag.id;
        self.modify(account, |account| {
            account.add_tag(tag.clone());
        })
        .await?;
        tracing::info!(account_id = %account.id, tag_id = %tag_id, "Tag added");
        Ok(())
    }

    /// Removes a tag from the account. The tag itself is kept.
    pub async fn remove_tag(&self, account: &mut Account, tag: &Tag) -> ServerResult<()> {
        self.modify(account, |account| {
            account.remove_tag(tag);
        })
        .await?;
        tracing::info!(account_id = %account.id, tag_id = %tag.id, "Tag removed");
        Ok(())
    }

    pub async fn add_zone(&self, account: &mut Account, zone: Zone) -> ServerResult<()> {
        let zone_id = zone.id;
        self.modify(account, |account| {
            account.add_zone(zone.clone());
        })
        .await?;
        tracing::info!(account_id = %account.id, zone_id = %zone_id, "Zone added");
        Ok(())
    }

    pub async fn remove_zone(&self, account: &mut Account, zone: &Zone) -> ServerResult<()> {
        self.modify(account, |account| {
            account.remove_zone(zone);
        })
        .await?;
        tracing::info!(account_id = %account.id, zone_id = %zone.id, "Zone removed");
        Ok(())
    }

    /// Copies a validated profile form onto the account.
    pub async fn update_profile(&self, account: &mut Account, form: ProfileForm) -> ServerResult<()> {
        self.modify(account, |account| {
            account.bio = form.bio.clone();
            account.url = form.url.clone();
            account.occupation = form.occupation.clone();
            account.location = form.location.clone();
        })
        .await?;
        tracing::info!(account_id = %account.id, "Profile updated");
        Ok(())
    }

    pub async fn update_password(&self, account: &mut Account, new_password: &str) -> ServerResult<()> {
        let password_hash = self.hasher.hash(new_password)?;
        self.modify(account, |account| {
            account.password_hash = password_hash.clone();
        })
        .await?;
        tracing::info!(account_id = %account.id, "Password updated");
        Ok(())
    }

    /// Applies `change` to the caller's copy and saves it, reloading and
    /// re-applying on version conflicts.
    async fn modify<F>(&self, account: &mut Account, mut change: F) -> ServerResult<()>
    where
        F: FnMut(&mut Account) + Send,
    {
        let account_id = account.id;
        let mut current = account.clone();

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            change(&mut current);

            match self.store.update_account(current).await {
                Ok(saved) => {
                    *account = saved;
                    return Ok(());
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(account_id = %account_id, attempt, "Account changed concurrently, retrying");
                    current = self.store.get_account(account_id).await?.ok_or_else(|| {
                        ServerError::NotFound(format!("Account not found: {account_id}"))
                    })?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServerError::Conflict(format!(
            "Account {account_id} changed concurrently {MAX_UPDATE_ATTEMPTS} times"
        )))
    }
}

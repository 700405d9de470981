//! Study operations.

use entities::{Account, Study};
use forms::StudyForm;
use study_store::{StoreError, StudyStore};

use crate::error::{ServerError, ServerResult};
use crate::services::MAX_UPDATE_ATTEMPTS;

pub struct StudyService<'a, S: StudyStore> {
    store: &'a S,
}

impl<'a, S: StudyStore> StudyService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Creates a study managed by `account` from a validated form.
    pub async fn create_study(&self, account: &Account, form: StudyForm) -> ServerResult<Study> {
        let mut study = Study::new(form.url, form.title, form.short_note, account.id);
        study.long_note = form.long_note;

        let study = match self.store.create_study(study).await {
            Ok(study) => study,
            Err(StoreError::AlreadyExists { .. }) => {
                return Err(ServerError::field(
                    "url",
                    "duplicate.url",
                    "study url is already in use",
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(study_id = %study.id, url = %study.url, manager_id = %account.id, "Study created");

        Ok(study)
    }

    pub async fn get_study(&self, url: &str) -> ServerResult<Study> {
        self.store
            .get_study_by_url(url)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("Study not found: {url}")))
    }

    pub async fn list_studies(&self) -> ServerResult<Vec<Study>> {
        Ok(self.store.list_studies().await?)
    }

    /// Adds the account to the members. Managers are already part of the study.
    pub async fn join(&self, study: Study, account: &Account) -> ServerResult<Study> {
        let account_id = account.id;
        let (study, changed) = self
            .modify(study, |study| study.add_member(account_id))
            .await?;
        if changed {
            tracing::info!(study_id = %study.id, account_id = %account_id, "Member joined");
        }
        Ok(study)
    }

    pub async fn leave(&self, study: Study, account: &Account) -> ServerResult<Study> {
        let account_id = account.id;
        let (study, changed) = self
            .modify(study, |study| study.remove_member(account_id))
            .await?;
        if changed {
            tracing::info!(study_id = %study.id, account_id = %account_id, "Member left");
        }
        Ok(study)
    }

    /// Fails unless the account manages the study.
    pub fn ensure_manager(&self, study: &Study, account: &Account) -> ServerResult<()> {
        if study.is_manager(account.id) {
            Ok(())
        } else {
            Err(ServerError::PermissionDenied(format!(
                "{} does not manage {}",
                account.nickname, study.url
            )))
        }
    }

    /// Applies `change` and commits the study with the version it was loaded
    /// at, reloading and re-applying on conflicts. `change` returns false when
    /// there is nothing to write.
    async fn modify<F>(&self, study: Study, mut change: F) -> ServerResult<(Study, bool)>
    where
        F: FnMut(&mut Study) -> bool + Send,
    {
        let study_id = study.id;
        let mut study = study;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            if !change(&mut study) {
                return Ok((study, false));
            }

            match self.store.update_study(study).await {
                Ok(saved) => return Ok((saved, true)),
                Err(e) if e.is_conflict() => {
                    tracing::warn!(study_id = %study_id, attempt, "Study changed concurrently, retrying");
                    study = self
                        .store
                        .get_study(study_id)
                        .await?
                        .ok_or_else(|| ServerError::NotFound(format!("Study not found: {study_id}")))?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServerError::Conflict(format!(
            "Study {study_id} changed concurrently {MAX_UPDATE_ATTEMPTS} times"
        )))
    }
}

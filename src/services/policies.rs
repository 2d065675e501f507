//! Policy service
//!
//! Loads and persists per-library policy values for the settings screens.
//! Policies gate no circulation transition client-side; fines and limits
//! are display and settings concerns.

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::policy::Policy,
    remote::RemoteApi,
};

#[derive(Clone)]
pub struct PolicyService {
    remote: RemoteApi,
}

impl PolicyService {
    pub fn new(remote: RemoteApi) -> Self {
        Self { remote }
    }

    /// Fetch the current policy for a library.
    ///
    /// Absence is not an error; it signals "create on first save".
    pub async fn load(&self, library_id: Uuid) -> AppResult<Option<Policy>> {
        self.remote.policies.find_by_library(library_id).await
    }

    /// Persist a policy: update in place when it already has an id,
    /// otherwise insert and capture the server-assigned id.
    pub async fn save(&self, policy: &Policy) -> AppResult<Policy> {
        policy
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        match policy.policy_id {
            Some(_) => self.remote.policies.update(policy).await,
            None => {
                let saved = self.remote.policies.insert(policy).await?;
                tracing::info!(library = %saved.library_id, "policy created");
                Ok(saved)
            }
        }
    }
}

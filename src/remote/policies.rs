//! Policies API client

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::policy::Policy,
};

use super::HttpClient;

/// Port for the policy endpoints of the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoliciesApi: Send + Sync {
    /// Fetch the policy for a library. `None` when no policy exists yet.
    async fn find_by_library(&self, library_id: Uuid) -> AppResult<Option<Policy>>;
    async fn insert(&self, policy: &Policy) -> AppResult<Policy>;
    async fn update(&self, policy: &Policy) -> AppResult<Policy>;
}

#[derive(Clone)]
pub struct PoliciesClient {
    http: HttpClient,
}

impl PoliciesClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PoliciesApi for PoliciesClient {
    async fn find_by_library(&self, library_id: Uuid) -> AppResult<Option<Policy>> {
        self.http
            .get_optional(&format!("/policies?library_id={}", library_id))
            .await
    }

    async fn insert(&self, policy: &Policy) -> AppResult<Policy> {
        self.http.post("/policies", policy, None).await
    }

    async fn update(&self, policy: &Policy) -> AppResult<Policy> {
        let id = policy
            .policy_id
            .ok_or_else(|| AppError::Validation("policy has no id".to_string()))?;
        self.http.put(&format!("/policies/{}", id), policy).await
    }
}

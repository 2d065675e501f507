//! Libraries API client

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::AppResult, models::library::Library};

use super::HttpClient;

/// Port for the library metadata endpoint of the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibrariesApi: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Library>;
}

#[derive(Clone)]
pub struct LibrariesClient {
    http: HttpClient,
}

impl LibrariesClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl LibrariesApi for LibrariesClient {
    async fn get(&self, id: Uuid) -> AppResult<Library> {
        self.http.get(&format!("/libraries/{}", id)).await
    }
}

//! Library metadata service

use uuid::Uuid;

use crate::{error::AppResult, models::library::Library, remote::RemoteApi};

#[derive(Clone)]
pub struct LibraryService {
    remote: RemoteApi,
}

impl LibraryService {
    pub fn new(remote: RemoteApi) -> Self {
        Self { remote }
    }

    /// Fetch library metadata for display
    pub async fn get(&self, id: Uuid) -> AppResult<Library> {
        self.remote.libraries.get(id).await
    }
}

//! Borrows API client

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::record::{Borrow, CreateBorrow},
};

use super::HttpClient;

/// Port for the borrow endpoints of the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowsApi: Send + Sync {
    /// List borrows for the operator's library
    async fn list(&self) -> AppResult<Vec<Borrow>>;
    /// Create a borrow from a reservation (check-out)
    async fn create(&self, request: &CreateBorrow, idempotency_key: Uuid) -> AppResult<Borrow>;
    /// Mark a borrow returned (check-in)
    async fn mark_returned(&self, id: Uuid, idempotency_key: Uuid) -> AppResult<Borrow>;
    /// Extend the due date of an active borrow
    async fn renew(&self, id: Uuid) -> AppResult<Borrow>;
    /// Reject a pending borrow request
    async fn cancel(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BorrowsClient {
    http: HttpClient,
}

impl BorrowsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BorrowsApi for BorrowsClient {
    async fn list(&self) -> AppResult<Vec<Borrow>> {
        self.http.get("/borrows").await
    }

    async fn create(&self, request: &CreateBorrow, idempotency_key: Uuid) -> AppResult<Borrow> {
        self.http
            .post("/borrows", request, Some(idempotency_key))
            .await
    }

    async fn mark_returned(&self, id: Uuid, idempotency_key: Uuid) -> AppResult<Borrow> {
        self.http
            .post_empty(&format!("/borrows/{}/return", id), Some(idempotency_key))
            .await
    }

    async fn renew(&self, id: Uuid) -> AppResult<Borrow> {
        self.http
            .post_empty(&format!("/borrows/{}/renew", id), None)
            .await
    }

    async fn cancel(&self, id: Uuid) -> AppResult<()> {
        self.http.delete(&format!("/borrows/{}", id)).await
    }
}

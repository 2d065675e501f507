//! Reservations API client

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::AppResult, models::record::Reservation};

use super::HttpClient;

/// Port for the reservation endpoints of the remote API.
///
/// The server is assumed to return only active, unexpired reservations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationsApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Reservation>>;
    async fn cancel(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct ReservationsClient {
    http: HttpClient,
}

impl ReservationsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReservationsApi for ReservationsClient {
    async fn list(&self) -> AppResult<Vec<Reservation>> {
        self.http.get("/reservations").await
    }

    async fn cancel(&self, id: Uuid) -> AppResult<()> {
        self.http.delete(&format!("/reservations/{}", id)).await
    }
}

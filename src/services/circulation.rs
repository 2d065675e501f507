//! Transition dispatcher
//!
//! Performs the state-changing remote calls. Every dispatch is validated
//! against the circulation state machine before any request is issued, and
//! is a single attempt: failures are reported to the caller and the record
//! is left untouched so the operator can retry manually.

use crate::{
    error::AppResult,
    models::{
        record::{CirculationRecord, CreateBorrow, RecordKind},
        status::CirculationAction,
        Borrow,
    },
    remote::RemoteApi,
};

#[derive(Clone)]
pub struct CirculationService {
    remote: RemoteApi,
}

impl CirculationService {
    pub fn new(remote: RemoteApi) -> Self {
        Self { remote }
    }

    /// Check out a reserved book: create a borrow from the reservation.
    ///
    /// The record's id doubles as the idempotency key: a manual retry after
    /// a timeout carries the same key.
    pub async fn check_out(&self, record: &CirculationRecord) -> AppResult<Borrow> {
        record.status.apply(CirculationAction::CheckOut)?;

        let request = CreateBorrow {
            book_id: record.book_id,
            user_id: record.user_id,
            reservation_id: Some(record.id),
        };

        tracing::info!(record = %record.id, user = %record.user_id, "checking out");
        self.remote.borrows.create(&request, record.id).await
    }

    /// Check in a borrowed book. Overdue borrows go through the same path;
    /// overdue is informational, not blocking.
    pub async fn check_in(&self, record: &CirculationRecord) -> AppResult<Borrow> {
        record.status.apply(CirculationAction::CheckIn)?;

        tracing::info!(record = %record.id, "checking in");
        self.remote.borrows.mark_returned(record.id, record.id).await
    }

    /// Extend the due date of an active borrow.
    pub async fn renew(&self, record: &CirculationRecord) -> AppResult<Borrow> {
        record.status.apply(CirculationAction::Renew)?;

        tracing::info!(record = %record.id, "renewing");
        self.remote.borrows.renew(record.id).await
    }

    /// Reject a pending reservation or borrow request.
    pub async fn reject(&self, record: &CirculationRecord) -> AppResult<()> {
        record.status.apply(CirculationAction::Cancel)?;

        tracing::info!(record = %record.id, kind = ?record.kind, "rejecting");
        match record.kind {
            RecordKind::Reservation => self.remote.reservations.cancel(record.id).await,
            RecordKind::Borrow => self.remote.borrows.cancel(record.id).await,
        }
    }
}

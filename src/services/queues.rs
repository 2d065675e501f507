//! Request list aggregator
//!
//! Produces the two queues shown to an operator: "check out" (pending
//! reservations) and "check in" (active, non-returned borrows), and runs
//! each submission through the verification gate, the dispatcher, and the
//! optimistic removal from its queue.
//!
//! Queue state is scoped to a screen's lifetime and mutated only through
//! `&mut self` from the embedding application's single cooperative context.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{record::CirculationRecord, status::CirculationStatus, Borrow},
    remote::RemoteApi,
};

use super::{
    circulation::CirculationService,
    verification::{self, Verification},
};

/// Result of a submission against a queued record.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The transition was committed remotely and the record dequeued.
    Completed(Borrow),
    /// The record's book has no catalogued ISBN; the operator must confirm
    /// proceeding without verification, then resubmit.
    OverrideRequired,
}

/// Display counters for the desk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub pending_check_out: usize,
    pub pending_check_in: usize,
    pub overdue: usize,
}

pub struct QueueService {
    remote: RemoteApi,
    circulation: CirculationService,
    check_out: Vec<CirculationRecord>,
    check_in: Vec<CirculationRecord>,
}

impl QueueService {
    pub fn new(remote: RemoteApi) -> Self {
        Self {
            circulation: CirculationService::new(remote.clone()),
            remote,
            check_out: Vec::new(),
            check_in: Vec::new(),
        }
    }

    /// Re-fetch both queues and replace the in-memory arrays wholesale.
    ///
    /// Insertion order is whatever the remote fetch returned; no client-side
    /// sort is applied.
    pub async fn refresh(&mut self) -> AppResult<()> {
        let reservations = self.remote.reservations.list().await?;
        let borrows = self.remote.borrows.list().await?;

        self.check_out = reservations
            .into_iter()
            .map(TryInto::try_into)
            .collect::<AppResult<_>>()?;
        self.check_in = borrows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<AppResult<_>>()?;

        tracing::debug!(
            reservations = self.check_out.len(),
            borrows = self.check_in.len(),
            "queues refreshed"
        );
        Ok(())
    }

    /// Pending reservations, unfiltered: the server returns only active,
    /// unexpired reservations.
    pub fn check_out_queue(&self) -> &[CirculationRecord] {
        &self.check_out
    }

    /// Active borrows awaiting return, optionally narrowed by a
    /// case-insensitive substring match on title, ISBN or description.
    pub fn check_in_queue(&self, search: Option<&str>) -> Vec<&CirculationRecord> {
        self.check_in
            .iter()
            .filter(|r| r.status != CirculationStatus::Returned)
            .filter(|r| search.map(|term| r.matches_search(term)).unwrap_or(true))
            .collect()
    }

    pub fn stats(&self, now: DateTime<Utc>) -> QueueStats {
        let pending_check_in = self.check_in_queue(None);
        QueueStats {
            pending_check_out: self.check_out.len(),
            pending_check_in: pending_check_in.len(),
            overdue: pending_check_in.iter().filter(|r| r.is_overdue(now)).count(),
        }
    }

    /// Check out a queued reservation after verifying the entered code.
    ///
    /// On success the reservation is removed optimistically; on failure it
    /// stays queued for a manual retry.
    pub async fn submit_check_out(
        &mut self,
        record_id: Uuid,
        entered_code: &str,
        override_confirmed: bool,
    ) -> AppResult<DispatchOutcome> {
        let record = Self::find(&self.check_out, record_id, "reservation")?.clone();

        if !Self::cleared(&record, entered_code, override_confirmed)? {
            return Ok(DispatchOutcome::OverrideRequired);
        }

        let borrow = self.circulation.check_out(&record).await?;
        self.check_out.retain(|r| r.id != record_id);
        Ok(DispatchOutcome::Completed(borrow))
    }

    /// Check in a queued borrow after verifying the entered code.
    pub async fn submit_check_in(
        &mut self,
        record_id: Uuid,
        entered_code: &str,
        override_confirmed: bool,
    ) -> AppResult<DispatchOutcome> {
        let record = Self::find(&self.check_in, record_id, "borrow")?.clone();

        if !Self::cleared(&record, entered_code, override_confirmed)? {
            return Ok(DispatchOutcome::OverrideRequired);
        }

        let borrow = self.circulation.check_in(&record).await?;
        self.check_in.retain(|r| r.id != record_id);
        Ok(DispatchOutcome::Completed(borrow))
    }

    /// Reject a pending reservation or borrow request.
    pub async fn reject(&mut self, record_id: Uuid) -> AppResult<()> {
        if let Ok(record) = Self::find(&self.check_out, record_id, "reservation") {
            let record = record.clone();
            self.circulation.reject(&record).await?;
            self.check_out.retain(|r| r.id != record_id);
            return Ok(());
        }

        let record = Self::find(&self.check_in, record_id, "record")?.clone();
        self.circulation.reject(&record).await?;
        self.check_in.retain(|r| r.id != record_id);
        Ok(())
    }

    /// Renew a queued borrow and merge the authoritative updated record
    /// back into the queue.
    pub async fn renew(&mut self, record_id: Uuid) -> AppResult<Borrow> {
        let record = Self::find(&self.check_in, record_id, "borrow")?.clone();
        let updated = self.circulation.renew(&record).await?;

        if let Some(slot) = self.check_in.iter_mut().find(|r| r.id == record_id) {
            *slot = updated.clone().try_into()?;
        }
        Ok(updated)
    }

    fn find<'a>(
        queue: &'a [CirculationRecord],
        record_id: Uuid,
        kind: &str,
    ) -> AppResult<&'a CirculationRecord> {
        queue
            .iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| AppError::NotFound(format!("{} {} is not queued", kind, record_id)))
    }

    /// Run the verification gate. `Ok(true)` means dispatch may proceed,
    /// `Ok(false)` means operator confirmation is still required.
    fn cleared(
        record: &CirculationRecord,
        entered_code: &str,
        override_confirmed: bool,
    ) -> AppResult<bool> {
        let code = verification::sanitize_code(entered_code);
        let has_isbn = record
            .book
            .as_ref()
            .and_then(|b| b.isbn.as_deref())
            .is_some();

        if has_isbn && code.is_empty() {
            return Err(AppError::Validation(
                "enter the item code before submitting".to_string(),
            ));
        }

        match verification::verify(&code, record.book.as_ref())? {
            Verification::Verified => Ok(true),
            Verification::OverrideRequired => Ok(override_confirmed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use crate::models::record::{BookSummary, Reservation};
    use crate::remote::{
        borrows::MockBorrowsApi, libraries::MockLibrariesApi, policies::MockPoliciesApi,
        reservations::MockReservationsApi,
    };

    use super::*;

    fn remote(borrows: MockBorrowsApi, reservations: MockReservationsApi) -> RemoteApi {
        RemoteApi {
            borrows: Arc::new(borrows),
            reservations: Arc::new(reservations),
            policies: Arc::new(MockPoliciesApi::new()),
            libraries: Arc::new(MockLibrariesApi::new()),
        }
    }

    fn book(isbn: Option<&str>, title: &str) -> BookSummary {
        BookSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            isbn: isbn.map(|s| s.to_string()),
            description: None,
            available_copies: Some(1),
        }
    }

    fn reservation(isbn: Option<&str>) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            status: CirculationStatus::Reserved,
            reserved_at: Utc::now(),
            expires_at: None,
            book: Some(book(isbn, "Dune")),
        }
    }

    fn borrow(status: CirculationStatus, due_in_days: i64, title: &str) -> Borrow {
        let now = Utc::now();
        Borrow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            status,
            borrow_date: now - Duration::days(14),
            return_date: Some(now + Duration::days(due_in_days)),
            book: Some(book(Some("9780441013593"), title)),
        }
    }

    fn created_borrow(reservation: &Reservation) -> Borrow {
        Borrow {
            id: Uuid::new_v4(),
            user_id: reservation.user_id,
            book_id: reservation.book_id,
            status: CirculationStatus::Borrowed,
            borrow_date: Utc::now(),
            return_date: Some(Utc::now() + Duration::days(14)),
            book: reservation.book.clone(),
        }
    }

    async fn service_with(
        reservations: Vec<Reservation>,
        borrows: Vec<Borrow>,
        mut borrows_api: MockBorrowsApi,
    ) -> QueueService {
        let mut reservations_api = MockReservationsApi::new();
        reservations_api
            .expect_list()
            .returning(move || Ok(reservations.clone()));
        borrows_api.expect_list().returning(move || Ok(borrows.clone()));

        let mut service = QueueService::new(remote(borrows_api, reservations_api));
        service.refresh().await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_successful_check_out_removes_reservation() {
        let reservation = reservation(Some("123"));
        let created = created_borrow(&reservation);

        let mut borrows_api = MockBorrowsApi::new();
        let expected_key = reservation.id;
        borrows_api
            .expect_create()
            .withf(move |req, key| req.reservation_id == Some(expected_key) && *key == expected_key)
            .times(1)
            .returning(move |_, _| Ok(created.clone()));

        let record_id = reservation.id;
        let mut service = service_with(vec![reservation], vec![], borrows_api).await;
        assert_eq!(service.check_out_queue().len(), 1);

        let outcome = service.submit_check_out(record_id, "123", false).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Completed(_)));
        assert!(service.check_out_queue().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_code_leaves_reservation_queued() {
        let reservation = reservation(Some("123"));
        let record_id = reservation.id;

        // No create expectation: any dispatch would panic the mock
        let mut service = service_with(vec![reservation], vec![], MockBorrowsApi::new()).await;

        let err = service.submit_check_out(record_id, "124", false).await.unwrap_err();
        assert!(err.to_string().contains("123"));
        assert_eq!(service.check_out_queue().len(), 1);
    }

    #[tokio::test]
    async fn test_override_path_dispatches_exactly_once() {
        let reservation = reservation(None);
        let created = created_borrow(&reservation);

        let mut borrows_api = MockBorrowsApi::new();
        borrows_api
            .expect_create()
            .times(1)
            .returning(move |_, _| Ok(created.clone()));

        let record_id = reservation.id;
        let mut service = service_with(vec![reservation], vec![], borrows_api).await;

        // Without confirmation, nothing is dispatched
        let outcome = service.submit_check_out(record_id, "", false).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::OverrideRequired));
        assert_eq!(service.check_out_queue().len(), 1);

        // Confirmed: exactly one dispatch, record dequeued
        let outcome = service.submit_check_out(record_id, "", true).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Completed(_)));
        assert!(service.check_out_queue().is_empty());
    }

    #[tokio::test]
    async fn test_empty_code_with_known_isbn_is_rejected_before_the_gate() {
        let reservation = reservation(Some("123"));
        let record_id = reservation.id;
        let mut service = service_with(vec![reservation], vec![], MockBorrowsApi::new()).await;

        let err = service.submit_check_out(record_id, "", false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_overdue_borrow_checks_in_through_the_same_path() {
        let overdue = borrow(CirculationStatus::Borrowed, -3, "Dune");
        let record_id = overdue.id;
        let mut returned = overdue.clone();
        returned.status = CirculationStatus::Returned;

        let mut borrows_api = MockBorrowsApi::new();
        borrows_api
            .expect_mark_returned()
            .withf(move |id, key| *id == record_id && *key == record_id)
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let mut service = service_with(vec![], vec![overdue], borrows_api).await;
        assert_eq!(service.stats(Utc::now()).overdue, 1);

        let outcome = service
            .submit_check_in(record_id, "9780441013593", false)
            .await
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::Completed(_)));
        assert!(service.check_in_queue(None).is_empty());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent_without_server_changes() {
        let reservations = vec![reservation(Some("111")), reservation(Some("222"))];
        let borrows = vec![
            borrow(CirculationStatus::Borrowed, 5, "Dune"),
            borrow(CirculationStatus::Returned, 5, "Neuromancer"),
        ];

        let mut service = service_with(reservations, borrows, MockBorrowsApi::new()).await;

        let first_out: Vec<_> = service.check_out_queue().to_vec();
        let first_in: Vec<_> = service.check_in_queue(None).into_iter().cloned().collect();

        service.refresh().await.unwrap();

        assert_eq!(service.check_out_queue(), first_out.as_slice());
        let second_in: Vec<_> = service.check_in_queue(None).into_iter().cloned().collect();
        assert_eq!(second_in, first_in);
        // Returned borrows never appear in the check-in queue
        assert_eq!(second_in.len(), 1);
    }

    #[tokio::test]
    async fn test_check_in_queue_search_filter() {
        let borrows = vec![
            borrow(CirculationStatus::Borrowed, 5, "Dune"),
            borrow(CirculationStatus::Borrowed, 5, "Neuromancer"),
        ];
        let service = service_with(vec![], borrows, MockBorrowsApi::new()).await;

        assert_eq!(service.check_in_queue(Some("dune")).len(), 1);
        assert_eq!(service.check_in_queue(Some("9780441")).len(), 2);
        assert_eq!(service.check_in_queue(Some("cooking")).len(), 0);
    }

    #[tokio::test]
    async fn test_failed_dispatch_leaves_record_queued() {
        let reservation = reservation(Some("123"));
        let record_id = reservation.id;

        let mut borrows_api = MockBorrowsApi::new();
        borrows_api.expect_create().times(1).returning(|_, _| {
            Err(AppError::Api {
                status: reqwest::StatusCode::CONFLICT,
                message: "book no longer available".to_string(),
            })
        });

        let mut service = service_with(vec![reservation], vec![], borrows_api).await;

        let err = service.submit_check_out(record_id, "123", false).await.unwrap_err();
        assert!(matches!(err, AppError::Api { .. }));
        assert_eq!(service.check_out_queue().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_reservation_routes_to_reservation_endpoint() {
        let reservation = reservation(Some("123"));
        let record_id = reservation.id;

        let mut reservations_api = MockReservationsApi::new();
        let listed = vec![reservation];
        reservations_api
            .expect_list()
            .returning(move || Ok(listed.clone()));
        reservations_api
            .expect_cancel()
            .withf(move |id| *id == record_id)
            .times(1)
            .returning(|_| Ok(()));

        let mut borrows_api = MockBorrowsApi::new();
        borrows_api.expect_list().returning(|| Ok(vec![]));

        let mut service = QueueService::new(remote(borrows_api, reservations_api));
        service.refresh().await.unwrap();

        service.reject(record_id).await.unwrap();
        assert!(service.check_out_queue().is_empty());
    }

    #[tokio::test]
    async fn test_reject_active_borrow_is_blocked_by_the_state_machine() {
        let active = borrow(CirculationStatus::Borrowed, 5, "Dune");
        let record_id = active.id;
        let mut service = service_with(vec![], vec![active], MockBorrowsApi::new()).await;

        let err = service.reject(record_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(service.check_in_queue(None).len(), 1);
    }

    #[tokio::test]
    async fn test_renew_merges_updated_record_back() {
        let active = borrow(CirculationStatus::Borrowed, 2, "Dune");
        let record_id = active.id;
        let mut renewed = active.clone();
        renewed.return_date = Some(Utc::now() + Duration::days(16));

        let renewed_clone = renewed.clone();
        let mut borrows_api = MockBorrowsApi::new();
        borrows_api
            .expect_renew()
            .times(1)
            .returning(move |_| Ok(renewed_clone.clone()));

        let mut service = service_with(vec![], vec![active], MockBorrowsApi::new()).await;
        // Re-wire with the renew expectation while keeping queue state
        service.circulation =
            CirculationService::new(remote(borrows_api, MockReservationsApi::new()));

        let updated = service.renew(record_id).await.unwrap();
        assert_eq!(updated.return_date, renewed.return_date);

        let queued = service.check_in_queue(None);
        assert_eq!(queued[0].due_at, renewed.return_date);
    }
}

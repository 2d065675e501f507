//! Circulation records: borrows, reservations and their shared shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, NoneAsEmptyString};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::status::CirculationStatus;

/// Denormalized book snapshot attached to a record at fetch time.
///
/// May be stale relative to server truth; never the source of truth for
/// availability counts. The catalogue reports books without an ISBN as a
/// null, empty or absent field; all three decode to `None` here.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available_copies: Option<i32>,
}

/// Borrow record from the remote API.
///
/// Id decoding precedence: canonical `id`, then the legacy `borrow_id` key
/// still emitted by older server versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrow {
    #[serde(alias = "borrow_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: CirculationStatus,
    pub borrow_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub book: Option<BookSummary>,
}

/// Reservation record from the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(alias = "reservation_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: CirculationStatus,
    pub reserved_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub book: Option<BookSummary>,
}

/// Create borrow request (check-out of a reservation)
#[derive(Debug, Clone, Serialize)]
pub struct CreateBorrow {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub reservation_id: Option<Uuid>,
}

/// Which remote collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Reservation,
    Borrow,
}

/// The shape shared by borrows and reservations, as handled by the desk.
#[derive(Debug, Clone, PartialEq)]
pub struct CirculationRecord {
    pub id: Uuid,
    pub kind: RecordKind,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: CirculationStatus,
    pub created_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub book: Option<BookSummary>,
}

impl CirculationRecord {
    /// A borrowed record past its due date is implicitly overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            CirculationStatus::Overdue => true,
            CirculationStatus::Borrowed => self.due_at.map(|due| due < now).unwrap_or(false),
            _ => false,
        }
    }

    /// Case-insensitive substring match against title, ISBN or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let Some(book) = &self.book else {
            return false;
        };
        book.title.to_lowercase().contains(&term)
            || book
                .isbn
                .as_deref()
                .map(|isbn| isbn.to_lowercase().contains(&term))
                .unwrap_or(false)
            || book
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false)
    }

    fn validate_dates(self) -> AppResult<Self> {
        if let Some(due) = self.due_at {
            if due <= self.created_at {
                return Err(AppError::Validation(format!(
                    "record {} has due date {} not after creation date {}",
                    self.id, due, self.created_at
                )));
            }
        }
        Ok(self)
    }
}

impl TryFrom<Borrow> for CirculationRecord {
    type Error = AppError;

    fn try_from(borrow: Borrow) -> AppResult<Self> {
        CirculationRecord {
            id: borrow.id,
            kind: RecordKind::Borrow,
            user_id: borrow.user_id,
            book_id: borrow.book_id,
            status: borrow.status,
            created_at: borrow.borrow_date,
            due_at: borrow.return_date,
            book: borrow.book,
        }
        .validate_dates()
    }
}

impl TryFrom<Reservation> for CirculationRecord {
    type Error = AppError;

    fn try_from(reservation: Reservation) -> AppResult<Self> {
        CirculationRecord {
            id: reservation.id,
            kind: RecordKind::Reservation,
            user_id: reservation.user_id,
            book_id: reservation.book_id,
            status: reservation.status,
            created_at: reservation.reserved_at,
            due_at: reservation.expires_at,
            book: reservation.book,
        }
        .validate_dates()
    }
}

//! Per-library circulation policy

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Circulation policy for one library.
///
/// One policy per library, upsert-by-library semantics: `policy_id` stays
/// empty until the first save, after which updates mutate in place.
/// `fine_per_day` is a fixed-point decimal carried as a string on the wire
/// so monetary values never pass through binary floating point.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Policy {
    #[serde(default, alias = "id")]
    pub policy_id: Option<Uuid>,
    pub library_id: Uuid,
    pub max_borrow_days: u32,
    #[validate(custom(function = non_negative_amount))]
    pub fine_per_day: Decimal,
    pub max_books_per_user: u32,
    pub reservation_expiry_days: u32,
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

impl Policy {
    /// Fine accrued over a number of overdue days.
    pub fn fine_for(&self, days: u32) -> Decimal {
        self.fine_per_day * Decimal::from(days)
    }

    /// Due date for a borrow starting at `start`.
    pub fn due_date_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::days(i64::from(self.max_borrow_days))
    }

    /// Expiry date for a reservation placed at `start`.
    pub fn reservation_expiry_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::days(i64::from(self.reservation_expiry_days))
    }
}

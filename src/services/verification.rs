//! ISBN verification gate
//!
//! Decides whether a check-in/check-out action may proceed. Comparison is
//! literal string equality against the record's book snapshot: no
//! partial match, no checksum, no ISBN-10/13 normalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::record::BookSummary,
};

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("valid regex"));

/// Scanned codes are digits only, at most ISBN-13 length.
pub const MAX_CODE_LEN: usize = 13;

/// Outcome of the verification gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The entered code matches the catalogued ISBN.
    Verified,
    /// The book has no catalogued ISBN; the operator may explicitly
    /// confirm proceeding without verification. Books without ISBNs must
    /// not be permanently blocked from circulation.
    OverrideRequired,
}

/// Strip non-digits from a scanned/typed code and cap it at ISBN-13 length.
pub fn sanitize_code(raw: &str) -> String {
    let digits = NON_DIGITS.replace_all(raw, "");
    digits.chars().take(MAX_CODE_LEN).collect()
}

/// Check an entered code against the record's book snapshot.
///
/// A mismatch fails with an error naming the expected ISBN; a missing
/// snapshot or missing ISBN yields the override path, never an error.
pub fn verify(entered: &str, book: Option<&BookSummary>) -> AppResult<Verification> {
    let expected = book
        .and_then(|b| b.isbn.as_deref())
        .filter(|isbn| !isbn.is_empty());

    match expected {
        None => Ok(Verification::OverrideRequired),
        Some(expected) if entered == expected => Ok(Verification::Verified),
        Some(expected) => Err(AppError::IsbnMismatch {
            expected: expected.to_string(),
            entered: entered.to_string(),
        }),
    }
}

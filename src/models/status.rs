//! Circulation state machine

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Lifecycle state of a circulation record, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CirculationStatus {
    Requested,
    Reserved,
    Borrowed,
    Returned,
    Overdue,
    Cancelled,
}

/// Action requested by the operator against a circulation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirculationAction {
    Approve,
    CheckOut,
    CheckIn,
    Renew,
    MarkOverdue,
    Cancel,
}

impl CirculationStatus {
    /// Apply an action to the current state.
    ///
    /// This is the single transition chokepoint: any pair outside the
    /// allowed set is rejected here, before any remote call is issued.
    /// Transitions only move forward; `cancelled` and `overdue` are
    /// side-exits.
    pub fn apply(self, action: CirculationAction) -> AppResult<CirculationStatus> {
        use CirculationAction::*;
        use CirculationStatus::*;

        match (self, action) {
            (Requested, Approve) => Ok(Reserved),
            (Requested, Cancel) => Ok(Cancelled),
            (Reserved, CheckOut) => Ok(Borrowed),
            (Reserved, Cancel) => Ok(Cancelled),
            (Borrowed, CheckIn) => Ok(Returned),
            // Renewal keeps the loan active with a later due date
            (Borrowed, Renew) => Ok(Borrowed),
            (Borrowed, MarkOverdue) => Ok(Overdue),
            (Overdue, CheckIn) => Ok(Returned),
            (from, action) => Err(AppError::InvalidTransition { from, action }),
        }
    }

    /// Whether the record has left circulation for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, CirculationStatus::Returned | CirculationStatus::Cancelled)
    }
}

impl std::fmt::Display for CirculationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CirculationStatus::Requested => "requested",
            CirculationStatus::Reserved => "reserved",
            CirculationStatus::Borrowed => "borrowed",
            CirculationStatus::Returned => "returned",
            CirculationStatus::Overdue => "overdue",
            CirculationStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

impl std::fmt::Display for CirculationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CirculationAction::Approve => "approve",
            CirculationAction::CheckOut => "check-out",
            CirculationAction::CheckIn => "check-in",
            CirculationAction::Renew => "renew",
            CirculationAction::MarkOverdue => "mark-overdue",
            CirculationAction::Cancel => "cancel",
        };
        write!(f, "{}", label)
    }
}

//! Library metadata

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Library record, fetched for display on the operator's screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

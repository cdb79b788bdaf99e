//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user on whose behalf a ledger change is made
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub user_name: String,
}

impl Actor {
    pub fn new(user_id: Option<Uuid>, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }

    /// Actor used for changes the service makes on its own
    pub fn system() -> Self {
        Self {
            user_id: None,
            user_name: "system".to_string(),
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

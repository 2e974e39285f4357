use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row predicate applied by every store read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
    Any,
}

impl Availability {
    pub fn matches(self, available: bool) -> bool {
        match self {
            Availability::Available => available,
            Availability::Unavailable => !available,
            Availability::Any => true,
        }
    }

    /// Bind value for `($n::BOOLEAN IS NULL OR available = $n)`.
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Availability::Available => Some(true),
            Availability::Unavailable => Some(false),
            Availability::Any => None,
        }
    }
}

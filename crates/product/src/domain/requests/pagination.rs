use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use validator::Validate;

use crate::domain::response::pagination::PaginationMeta;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FindAllProducts {
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, message = "Limit must be a positive integer"))]
    pub limit: Option<i64>,
}

/// A resolved page window. Both fields are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Result<Self, ServiceError> {
        let mut errors = Vec::new();
        if page < 1 {
            errors.push("page: Page must be a positive integer".to_string());
        }
        if limit < 1 {
            errors.push("limit: Limit must be a positive integer".to_string());
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(ServiceError::Validation(errors))
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn resolve(&self, total: i64) -> PaginationMeta {
        let total = total.max(0);
        let last_page = total / self.limit + i64::from(total % self.limit != 0);

        PaginationMeta {
            page: self.page,
            limit: self.limit,
            total,
            last_page,
        }
    }
}

impl TryFrom<&FindAllProducts> for PageRequest {
    type Error = ServiceError;

    fn try_from(req: &FindAllProducts) -> Result<Self, Self::Error> {
        PageRequest::new(
            req.page.unwrap_or(DEFAULT_PAGE),
            req.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }
}

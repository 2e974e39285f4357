use crate::domain::response::pagination::PaginationMeta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponsePagination<T> {
    pub status: String,
    pub message: String,
    pub data: T,
    pub meta: PaginationMeta,
}

/// A listing window as sent to callers: the rows plus their page metadata.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Paginated<T> {
    pub data: T,
    pub meta: PaginationMeta,
}

impl<T> From<ApiResponsePagination<T>> for Paginated<T> {
    fn from(response: ApiResponsePagination<T>) -> Self {
        Self {
            data: response.data,
            meta: response.meta,
        }
    }
}

use crate::model::product::{Availability, Product as ProductModel};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;

/// Read side of the product store. Every read is scoped by an
/// [`Availability`] predicate; ordered results are ascending by id.
#[async_trait]
pub trait ProductQueryRepositoryTrait {
    async fn count(&self, filter: Availability) -> Result<i64, RepositoryError>;
    async fn scan(
        &self,
        filter: Availability,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn find_by_id(
        &self,
        id: i32,
        filter: Availability,
    ) -> Result<Option<ProductModel>, RepositoryError>;
    async fn find_by_ids(
        &self,
        ids: &[i32],
        filter: Availability,
    ) -> Result<Vec<ProductModel>, RepositoryError>;
}

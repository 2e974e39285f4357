use crate::{
    domain::requests::product::{CreateProductRequest, ProductChanges},
    model::product::Product as ProductModel,
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ProductCommandRepositoryTrait {
    /// Inserts an available product; id and timestamps come from the store.
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError>;
    /// Applies `changes` regardless of availability.
    /// Fails with [`RepositoryError::NotFound`] when `id` does not exist.
    async fn update_fields(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<ProductModel, RepositoryError>;
}

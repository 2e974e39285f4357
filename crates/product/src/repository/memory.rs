use crate::{
    abstract_trait::product::repository::{
        ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
    },
    domain::requests::product::{CreateProductRequest, ProductChanges},
    model::product::{Availability, Product as ProductModel},
};
use async_trait::async_trait;
use chrono::Utc;
use shared::errors::RepositoryError;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, ProductModel>,
    last_id: i32,
}

/// Product store kept in process memory.
///
/// Rows are keyed by id in a `BTreeMap`, so scans come back in id order just
/// like the Postgres adapter. Ids come from a counter and are never reused.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a row as-is, bumping the id counter past it.
    pub async fn insert(&self, product: ProductModel) {
        let mut table = self.table.write().await;
        table.last_id = table.last_id.max(product.id);
        table.rows.insert(product.id, product);
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for InMemoryProductRepository {
    async fn count(&self, filter: Availability) -> Result<i64, RepositoryError> {
        let table = self.table.read().await;
        let total = table
            .rows
            .values()
            .filter(|p| filter.matches(p.available))
            .count();

        i64::try_from(total).map_err(|e| RepositoryError::Custom(e.to_string()))
    }

    async fn scan(
        &self,
        filter: Availability,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| filter.matches(p.available))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: i32,
        filter: Availability,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|p| filter.matches(p.available))
            .cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[i32],
        filter: Availability,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| ids.contains(&p.id) && filter.matches(p.available))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for InMemoryProductRepository {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut table = self.table.write().await;

        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Custom("product id sequence exhausted".into()))?;
        let now = Utc::now().naive_utc();

        let product = ProductModel {
            id,
            name: req.name.clone(),
            price: req.price,
            available: true,
            created_at: now,
            updated_at: now,
        };

        table.last_id = id;
        table.rows.insert(id, product.clone());

        info!("✅ Created product ID {} ({}) in memory", product.id, product.name);
        Ok(product)
    }

    async fn update_fields(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<ProductModel, RepositoryError> {
        let mut table = self.table.write().await;
        let product = table.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(name) = &changes.name {
            product.name = name.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(available) = changes.available {
            product.available = available;
        }
        product.updated_at = Utc::now().naive_utc();

        Ok(product.clone())
    }
}

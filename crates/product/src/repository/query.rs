use crate::{
    abstract_trait::product::repository::ProductQueryRepositoryTrait,
    model::product::{Availability, Product as ProductModel},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

#[derive(Clone)]
pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn count(&self, filter: Availability) -> Result<i64, RepositoryError> {
        info!("🔢 Counting products with filter: {:?}", filter);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::BOOLEAN IS NULL OR available = $1)
            "#,
        )
        .bind(filter.as_flag())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to count products: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(total)
    }

    async fn scan(
        &self,
        filter: Availability,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        info!(
            "🔍 Scanning products | filter: {:?}, offset: {}, limit: {}",
            filter, offset, limit
        );

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let products = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE ($1::BOOLEAN IS NULL OR available = $1)
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.as_flag())
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch products: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(products)
    }

    async fn find_by_id(
        &self,
        id: i32,
        filter: Availability,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("🆔 Fetching product by ID: {} ({:?})", id, filter);

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = $1
              AND ($2::BOOLEAN IS NULL OR available = $2)
            "#,
        )
        .bind(id)
        .bind(filter.as_flag())
        .fetch_optional(&mut *conn)
        .await
        .map_err(RepositoryError::from)?;

        Ok(result)
    }

    async fn find_by_ids(
        &self,
        ids: &[i32],
        filter: Availability,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        info!("📦 Fetching {} products by ID ({:?})", ids.len(), filter);

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let products = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = ANY($1)
              AND ($2::BOOLEAN IS NULL OR available = $2)
            ORDER BY id ASC
            "#,
        )
        .bind(ids)
        .bind(filter.as_flag())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch products by ID: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(products)
    }
}

use crate::{
    abstract_trait::product::repository::ProductCommandRepositoryTrait,
    domain::requests::product::{CreateProductRequest, ProductChanges},
    model::product::Product as ProductModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

#[derive(Clone)]
pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, ProductModel>(
            r#"
            INSERT INTO products (name, price, available, created_at, updated_at)
            VALUES ($1, $2, TRUE, current_timestamp, current_timestamp)
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(&req.name)
        .bind(req.price)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create product {}: {:?}", req.name, err);
            RepositoryError::from(err)
        })?;

        info!("✅ Created product ID {} ({})", result.id, result.name);
        Ok(result)
    }

    async fn update_fields(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                available = COALESCE($4, available),
                updated_at = current_timestamp
            WHERE id = $1
            RETURNING id, name, price, available, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.price)
        .bind(changes.available)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to update product ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?
        .ok_or_else(|| {
            error!("❌ Product ID {} does not exist", id);
            RepositoryError::NotFound
        })?;

        info!("🔄 Updated product ID {}", result.id);
        Ok(result)
    }
}

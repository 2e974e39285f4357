use crate::{
    abstract_trait::product::{
        repository::{DynProductCommandRepository, DynProductQueryRepository},
        service::ProductCommandServiceTrait,
    },
    domain::{
        requests::product::{CreateProductRequest, ProductChanges, UpdateProductRequest},
        response::{api::ApiResponse, product::ProductResponse},
    },
    model::product::{Availability, Product as ProductModel},
    service::PRODUCT_NOT_FOUND,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, OperationTracer, TracingContext},
};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ProductCommandService {
    pub query: DynProductQueryRepository,
    pub command: DynProductCommandRepository,
    tracer: OperationTracer,
}

impl ProductCommandService {
    pub fn new(
        query: DynProductQueryRepository,
        command: DynProductCommandRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_command_service");

        Self {
            query,
            command,
            tracer: OperationTracer::new("product-command-service", metrics),
        }
    }

    /// Mutations only apply to products a reader could still see.
    async fn ensure_available(
        &self,
        id: i32,
        tracing_ctx: &TracingContext,
        method: &Method,
    ) -> Result<ProductModel, ServiceError> {
        match self.query.find_by_id(id, Availability::Available).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => {
                warn!("❌ Product not found with ID: {id}");
                self.tracer
                    .complete_error(tracing_ctx, method.clone(), PRODUCT_NOT_FOUND);
                Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))
            }
            Err(e) => {
                error!("❌ Database error while finding product ID {id}: {e:?}");
                self.tracer
                    .complete_error(tracing_ctx, method.clone(), "Database error");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn apply_changes(
        &self,
        id: i32,
        changes: &ProductChanges,
        tracing_ctx: &TracingContext,
        method: &Method,
    ) -> Result<ProductModel, ServiceError> {
        match self.command.update_fields(id, changes).await {
            Ok(product) => Ok(product),
            Err(RepositoryError::NotFound) => {
                warn!("❌ Product ID {id} vanished before update");
                self.tracer
                    .complete_error(tracing_ctx, method.clone(), PRODUCT_NOT_FOUND);
                Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))
            }
            Err(e) => {
                error!("❌ Failed to update product ID {id}: {e:?}");
                self.tracer
                    .complete_error(tracing_ctx, method.clone(), "Database error");
                Err(ServiceError::Repo(e))
            }
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🏗️ Creating new product: {}", req.name);

        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "product_create",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "create"),
                KeyValue::new("product.name", req.name.clone()),
            ],
        );

        let product = match self.command.create_product(req).await {
            Ok(product) => product,
            Err(e) => {
                error!("❌ Failed to create product '{}': {e:?}", req.name);
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create product");
                return Err(ServiceError::Repo(e));
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Product created");
        info!("✅ Product created: '{}' (ID: {})", product.name, product.id);

        Ok(ApiResponse::success(
            "Product created successfully",
            ProductResponse::from(product),
        ))
    }

    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🔄 Updating product ID: {}", req.id);

        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "product_update",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "update"),
                KeyValue::new("product.id", i64::from(req.id)),
            ],
        );

        self.ensure_available(req.id, &tracing_ctx, &method).await?;

        let product = self
            .apply_changes(
                req.id,
                &ProductChanges::details(req),
                &tracing_ctx,
                &method,
            )
            .await?;

        self.tracer
            .complete_success(&tracing_ctx, method, "Product updated");
        info!("✅ Product updated: '{}' (ID: {})", product.name, product.id);

        Ok(ApiResponse::success(
            "Product updated successfully",
            ProductResponse::from(product),
        ))
    }

    async fn remove_product(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🗑️ Removing product ID: {id}");

        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "product_remove",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "remove"),
                KeyValue::new("product.id", i64::from(id)),
            ],
        );

        self.ensure_available(id, &tracing_ctx, &method).await?;

        let product = self
            .apply_changes(
                id,
                &ProductChanges::mark_unavailable(),
                &tracing_ctx,
                &method,
            )
            .await?;

        self.tracer
            .complete_success(&tracing_ctx, method, "Product removed");
        info!("✅ Product ID {id} marked unavailable");

        Ok(ApiResponse::success(
            "Product removed successfully",
            ProductResponse::from(product),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::product::repository::{
            ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
        },
        repository::memory::InMemoryProductRepository,
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    fn service(repo: &InMemoryProductRepository) -> ProductCommandService {
        ProductCommandService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            &mut Registry::default(),
        )
    }

    fn create(name: &str, price: f64) -> CreateProductRequest {
        CreateProductRequest {
            name: name.into(),
            price,
        }
    }

    #[tokio::test]
    async fn create_returns_available_product() {
        let repo = InMemoryProductRepository::new();

        let created = service(&repo)
            .create_product(&create("Desk", 120.0))
            .await
            .unwrap();

        assert_eq!(created.status, "success");
        assert_eq!(created.data.id, 1);
        assert_eq!(created.data.name, "Desk");
        assert_eq!(created.data.price, 120.0);
        assert!(created.data.available);
    }

    #[tokio::test]
    async fn duplicate_names_are_allowed() {
        let repo = InMemoryProductRepository::new();
        let svc = service(&repo);

        let a = svc.create_product(&create("Chair", 10.0)).await.unwrap();
        let b = svc.create_product(&create("Chair", 10.0)).await.unwrap();

        assert_ne!(a.data.id, b.data.id);
    }

    #[tokio::test]
    async fn update_changes_only_name_and_price() {
        let repo = InMemoryProductRepository::new();
        let svc = service(&repo);
        svc.create_product(&create("Cable", 4.0)).await.unwrap();

        let updated = svc
            .update_product(&UpdateProductRequest {
                id: 1,
                name: Some("USB Cable".into()),
                price: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.data.name, "USB Cable");
        assert_eq!(updated.data.price, 4.0);
        assert!(updated.data.available);
    }

    #[tokio::test]
    async fn remove_is_soft_and_one_way() {
        let repo = InMemoryProductRepository::new();
        let svc = service(&repo);
        svc.create_product(&create("Tape", 2.0)).await.unwrap();

        let removed = svc.remove_product(1).await.unwrap();
        assert!(!removed.data.available);

        let row = repo.find_by_id(1, Availability::Any).await.unwrap();
        assert!(row.is_some_and(|p| !p.available));

        let again = svc.remove_product(1).await.unwrap_err();
        assert!(matches!(again, ServiceError::NotFound(ref m) if m == PRODUCT_NOT_FOUND));

        let update = svc
            .update_product(&UpdateProductRequest {
                id: 1,
                name: None,
                price: Some(3.0),
            })
            .await
            .unwrap_err();
        assert!(matches!(update, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = InMemoryProductRepository::new();

        let err = service(&repo).remove_product(42).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    struct FailingStore;

    #[async_trait]
    impl ProductQueryRepositoryTrait for FailingStore {
        async fn count(&self, _: Availability) -> Result<i64, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
        async fn scan(
            &self,
            _: Availability,
            _: i64,
            _: i64,
        ) -> Result<Vec<ProductModel>, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(
            &self,
            _: i32,
            _: Availability,
        ) -> Result<Option<ProductModel>, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_ids(
            &self,
            _: &[i32],
            _: Availability,
        ) -> Result<Vec<ProductModel>, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
    }

    #[async_trait]
    impl ProductCommandRepositoryTrait for FailingStore {
        async fn create_product(
            &self,
            _: &CreateProductRequest,
        ) -> Result<ProductModel, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
        async fn update_fields(
            &self,
            _: i32,
            _: &ProductChanges,
        ) -> Result<ProductModel, RepositoryError> {
            Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let store = Arc::new(FailingStore);
        let svc = ProductCommandService::new(store.clone(), store, &mut Registry::default());

        let create = svc.create_product(&create("Bag", 9.0)).await.unwrap_err();
        let remove = svc.remove_product(1).await.unwrap_err();

        assert!(matches!(create, ServiceError::Repo(RepositoryError::Sqlx(_))));
        assert!(matches!(remove, ServiceError::Repo(RepositoryError::Sqlx(_))));
    }
}

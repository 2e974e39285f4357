use crate::{
    abstract_trait::product::{
        repository::DynProductQueryRepository, service::ProductQueryServiceTrait,
    },
    domain::{
        requests::pagination::{FindAllProducts, PageRequest},
        response::{
            api::{ApiResponse, ApiResponsePagination},
            product::ProductResponse,
        },
    },
    model::product::{Availability, Product as ProductModel},
    service::{PRODUCT_NOT_FOUND, PRODUCTS_NOT_AVAILABLE},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, OperationTracer},
};
use std::collections::{HashMap, HashSet};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ProductQueryService {
    pub query: DynProductQueryRepository,
    tracer: OperationTracer,
}

impl ProductQueryService {
    pub fn new(query: DynProductQueryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_query_service");

        Self {
            query,
            tracer: OperationTracer::new("product-query-service", metrics),
        }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(
        &self,
        req: &FindAllProducts,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> {
        info!(
            "🔍 Finding all products | Page: {:?}, Limit: {:?}",
            req.page, req.limit
        );

        let window = PageRequest::try_from(req)?;
        let method = Method::Get;

        let tracing_ctx = self.tracer.start(
            "product_find_all",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "find_all"),
                KeyValue::new("page", window.page()),
                KeyValue::new("limit", window.limit()),
            ],
        );

        let total = match self.query.count(Availability::Available).await {
            Ok(total) => total,
            Err(e) => {
                let msg = format!("❌ Failed to count available products: {e:?}");
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to count products");
                error!("{msg}");
                return Err(ServiceError::Repo(e));
            }
        };

        let meta = window.resolve(total);

        let products = if window.skip() >= total {
            Vec::new()
        } else {
            match self
                .query
                .scan(Availability::Available, window.skip(), window.limit())
                .await
            {
                Ok(products) => products,
                Err(e) => {
                    let msg = format!("❌ Failed to fetch products page: {e:?}");
                    self.tracer
                        .complete_error(&tracing_ctx, method, "Failed to fetch products");
                    error!("{msg}");
                    return Err(ServiceError::Repo(e));
                }
            }
        };

        let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

        info!(
            "✅ Found {} products (total: {total}, last page: {})",
            data.len(),
            meta.last_page
        );
        self.tracer
            .complete_success(&tracing_ctx, method, "Products retrieved from DB");

        Ok(ApiResponsePagination {
            status: "success".to_string(),
            message: "Products retrieved successfully".to_string(),
            data,
            meta,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🆔 Finding product by ID: {id}");

        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "product_find_by_id",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "find_by_id"),
                KeyValue::new("product.id", i64::from(id)),
            ],
        );

        let product = match self.query.find_by_id(id, Availability::Available).await {
            Ok(Some(product)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product retrieved from DB");
                product
            }
            Ok(None) => {
                warn!("❌ Product not found with ID: {id}");
                self.tracer
                    .complete_error(&tracing_ctx, method, PRODUCT_NOT_FOUND);
                return Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()));
            }
            Err(e) => {
                error!("❌ Database error while finding product ID {id}: {e:?}");
                self.tracer
                    .complete_error(&tracing_ctx, method, "Database error");
                return Err(ServiceError::Repo(e));
            }
        };

        info!("✅ Product retrieved: '{}' (ID: {id})", product.name);

        Ok(ApiResponse::success(
            "Product retrieved successfully",
            ProductResponse::from(product),
        ))
    }

    async fn validate_products(
        &self,
        ids: &[i32],
    ) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let mut seen = HashSet::with_capacity(ids.len());
        let distinct: Vec<i32> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        info!(
            "🧾 Validating {} product IDs ({} distinct)",
            ids.len(),
            distinct.len()
        );

        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "product_validate",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("operation", "validate_products"),
                KeyValue::new("product.count", distinct.len() as i64),
            ],
        );

        let products = match self
            .query
            .find_by_ids(&distinct, Availability::Available)
            .await
        {
            Ok(products) => products,
            Err(e) => {
                error!("❌ Failed to fetch products for validation: {e:?}");
                self.tracer
                    .complete_error(&tracing_ctx, method, "Database error");
                return Err(ServiceError::Repo(e));
            }
        };

        if products.len() != distinct.len() {
            let found: HashSet<i32> = products.iter().map(|p| p.id).collect();
            let missing: Vec<i32> = distinct
                .iter()
                .copied()
                .filter(|id| !found.contains(id))
                .collect();

            warn!("❌ Products not available: {missing:?}");
            self.tracer
                .complete_error(&tracing_ctx, method, PRODUCTS_NOT_AVAILABLE);
            return Err(ServiceError::InvalidBatch(
                PRODUCTS_NOT_AVAILABLE.to_string(),
            ));
        }

        let mut by_id: HashMap<i32, ProductModel> =
            products.into_iter().map(|p| (p.id, p)).collect();
        let data: Vec<ProductResponse> = distinct
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(ProductResponse::from)
            .collect();

        self.tracer
            .complete_success(&tracing_ctx, method, "Products validated");

        Ok(ApiResponse::success("Products validated successfully", data))
    }
}

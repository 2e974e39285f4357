use crate::{
    abstract_trait::product::{
        repository::{DynProductCommandRepository, DynProductQueryRepository},
        service::{DynProductCommandService, DynProductQueryService},
    },
    handler::ProductCommandHandler,
    repository::{command::ProductCommandRepository, query::ProductQueryRepository},
    service::{command::ProductCommandService, query::ProductQueryService},
};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("product_query", &"ProductQueryService")
            .field("product_command", &"ProductCommandService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub pool: ConnectionPool,
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let DependenciesInjectDeps { pool } = deps;

        let product_query_repo = Arc::new(ProductQueryRepository::new(pool.clone()));
        let product_command_repo = Arc::new(ProductCommandRepository::new(pool));

        Self::with_repositories(product_query_repo, product_command_repo, registry)
    }

    /// Wires the services over any store, e.g. `InMemoryProductRepository`.
    pub fn with_repositories(
        query_repo: DynProductQueryRepository,
        command_repo: DynProductCommandRepository,
        registry: &mut Registry,
    ) -> Self {
        let product_query = ProductQueryService::new(query_repo.clone(), registry);
        let product_command = ProductCommandService::new(query_repo, command_repo, registry);

        Self {
            product_query: Arc::new(product_query),
            product_command: Arc::new(product_command),
        }
    }

    pub fn handler(&self) -> ProductCommandHandler {
        ProductCommandHandler::new(self.product_query.clone(), self.product_command.clone())
    }
}

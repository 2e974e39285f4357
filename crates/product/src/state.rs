use crate::di::{DependenciesInject, DependenciesInjectDeps};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Registry>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("di_container", &self.di_container)
            .field("registry", &self.registry)
            .finish()
    }
}

impl AppState {
    pub fn new(pool: ConnectionPool) -> Self {
        let mut registry = Registry::default();

        let deps = DependenciesInjectDeps { pool };
        let di_container = DependenciesInject::new(deps, &mut registry);

        Self::from_parts(di_container, registry)
    }

    pub fn from_parts(di_container: DependenciesInject, registry: Registry) -> Self {
        Self {
            di_container,
            registry: Arc::new(registry),
        }
    }
}

use crate::{
    abstract_trait::product::service::{DynProductCommandService, DynProductQueryService},
    domain::{
        requests::{
            pagination::FindAllProducts,
            product::{CreateProductRequest, FindByIdRequest, ProductIds, UpdateProductRequest},
        },
        response::api::Paginated,
    },
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use shared::{errors::RpcError, utils::validate_request};
use std::str::FromStr;
use tracing::{info, warn};
use validator::Validate;

/// Commands accepted on the product request topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateProduct,
    FindAllProducts,
    FindOneProduct,
    UpdateProduct,
    RemoveProduct,
    ValidateProducts,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::CreateProduct => "create_product",
            Command::FindAllProducts => "find_all_products",
            Command::FindOneProduct => "find_one_product",
            Command::UpdateProduct => "update_product",
            Command::RemoveProduct => "remove_product",
            Command::ValidateProducts => "validate_products",
        }
    }
}

impl FromStr for Command {
    type Err = RpcError;

    fn from_str(cmd: &str) -> Result<Self, Self::Err> {
        match cmd {
            "create_product" => Ok(Command::CreateProduct),
            "find_all_products" => Ok(Command::FindAllProducts),
            "find_one_product" => Ok(Command::FindOneProduct),
            "update_product" => Ok(Command::UpdateProduct),
            "remove_product" => Ok(Command::RemoveProduct),
            "validate_products" => Ok(Command::ValidateProducts),
            other => Err(RpcError::UnknownCommand(other.to_string())),
        }
    }
}

/// Routes a decoded command to the product services and serializes the
/// service response.
#[derive(Clone)]
pub struct ProductCommandHandler {
    pub query: DynProductQueryService,
    pub command: DynProductCommandService,
}

impl ProductCommandHandler {
    pub fn new(query: DynProductQueryService, command: DynProductCommandService) -> Self {
        Self { query, command }
    }

    pub async fn dispatch(&self, cmd: &str, payload: Value) -> Result<Value, RpcError> {
        let command = cmd.parse::<Command>().inspect_err(|_| {
            warn!("❓ Unknown product command: {cmd}");
        })?;

        info!("📨 Handling product command: {}", command.as_str());

        match command {
            Command::CreateProduct => {
                let req: CreateProductRequest = decode(payload)?;
                let response = self.command.create_product(&req).await?;
                encode(&response.data)
            }
            Command::FindAllProducts => {
                let req: FindAllProducts = decode(payload)?;
                let response = self.query.find_all(&req).await?;
                encode(&Paginated::from(response))
            }
            Command::FindOneProduct => {
                let req: FindByIdRequest = decode(payload)?;
                let response = self.query.find_by_id(req.id).await?;
                encode(&response.data)
            }
            Command::UpdateProduct => {
                let req: UpdateProductRequest = decode(payload)?;
                let response = self.command.update_product(&req).await?;
                encode(&response.data)
            }
            Command::RemoveProduct => {
                let req: FindByIdRequest = decode(payload)?;
                let response = self.command.remove_product(req.id).await?;
                encode(&response.data)
            }
            Command::ValidateProducts => {
                let ProductIds(ids) = serde_json::from_value(payload)?;
                let response = self.query.validate_products(&ids).await?;
                encode(&response.data)
            }
        }
    }
}

// A missing payload reads as an empty object.
fn decode<T>(payload: Value) -> Result<T, RpcError>
where
    T: DeserializeOwned + Validate,
{
    let payload = match payload {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    let req: T = serde_json::from_value(payload)?;
    validate_request(&req)?;
    Ok(req)
}

fn encode<T: Serialize>(response: &T) -> Result<Value, RpcError> {
    serde_json::to_value(response)
        .map_err(|e| RpcError::Internal(format!("Failed to serialize response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::memory::InMemoryProductRepository,
        service::{command::ProductCommandService, query::ProductQueryService},
    };
    use prometheus_client::registry::Registry;
    use serde_json::json;
    use std::sync::Arc;

    fn handler() -> ProductCommandHandler {
        let repo = InMemoryProductRepository::new();
        let mut registry = Registry::default();

        let query = ProductQueryService::new(Arc::new(repo.clone()), &mut registry);
        let command =
            ProductCommandService::new(Arc::new(repo.clone()), Arc::new(repo), &mut registry);

        ProductCommandHandler::new(Arc::new(query), Arc::new(command))
    }

    #[test]
    fn command_names_round_trip() {
        for name in [
            "create_product",
            "find_all_products",
            "find_one_product",
            "update_product",
            "remove_product",
            "validate_products",
        ] {
            assert_eq!(name.parse::<Command>().unwrap().as_str(), name);
        }
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let err = handler()
            .dispatch("drop_table", json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "unknown_command");
        assert_eq!(err.to_string(), "Unknown command: drop_table");
    }

    #[tokio::test]
    async fn null_payload_uses_default_page() {
        let reply = handler()
            .dispatch("find_all_products", Value::Null)
            .await
            .unwrap();

        assert_eq!(reply["meta"]["page"], 1);
        assert_eq!(reply["meta"]["limit"], 10);
        assert_eq!(reply["meta"]["lastPage"], 0);
        assert_eq!(reply["data"], json!([]));
    }

    #[tokio::test]
    async fn ids_may_arrive_as_strings() {
        let handler = handler();
        handler
            .dispatch("create_product", json!({ "name": "Lamp", "price": 30.0 }))
            .await
            .unwrap();

        let reply = handler
            .dispatch("find_one_product", json!({ "id": "1" }))
            .await
            .unwrap();

        assert_eq!(reply["name"], "Lamp");
    }

    #[tokio::test]
    async fn single_record_replies_are_the_bare_product() {
        let handler = handler();
        let created = handler
            .dispatch("create_product", json!({ "name": "Lamp", "price": 30.0 }))
            .await
            .unwrap();

        assert_eq!(created["id"], 1);
        assert!(created.get("status").is_none());
        assert!(created.get("message").is_none());

        let listed = handler
            .dispatch("find_all_products", json!({}))
            .await
            .unwrap();
        let keys: Vec<&String> = listed.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["data", "meta"]);
    }

    #[tokio::test]
    async fn batch_ids_may_arrive_as_strings() {
        let handler = handler();
        for name in ["Lamp", "Desk"] {
            handler
                .dispatch("create_product", json!({ "name": name, "price": 1.0 }))
                .await
                .unwrap();
        }

        let reply = handler
            .dispatch("validate_products", json!(["2", 1]))
            .await
            .unwrap();

        let ids: Vec<i64> = reply
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn update_ignores_available_key() {
        let handler = handler();
        handler
            .dispatch("create_product", json!({ "name": "Mug", "price": 5.0 }))
            .await
            .unwrap();

        let reply = handler
            .dispatch(
                "update_product",
                json!({ "id": 1, "price": 6.5, "available": false }),
            )
            .await
            .unwrap();

        assert_eq!(reply["price"], 6.5);
        assert_eq!(reply["available"], true);
    }

    #[tokio::test]
    async fn negative_price_is_a_bad_request() {
        let err = handler()
            .dispatch("create_product", json!({ "name": "Mug", "price": -1.0 }))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "bad_request");
        assert_eq!(
            err.to_string(),
            "Validation failed: price: Price cannot be negative"
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_a_bad_request() {
        let err = handler()
            .dispatch("validate_products", json!({ "ids": [1] }))
            .await
            .unwrap_err();

        assert_eq!(err.code(), 400);
        assert_eq!(err.kind(), "bad_request");
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let err = handler()
            .dispatch("find_all_products", json!({ "limit": 0 }))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "bad_request");
    }
}

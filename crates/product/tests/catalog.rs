use chrono::NaiveDate;
use product::{
    di::DependenciesInject, handler::ProductCommandHandler, model::product::Product,
    repository::memory::InMemoryProductRepository,
};
use prometheus_client::registry::Registry;
use serde_json::{Value, json};
use std::sync::Arc;

fn product(id: i32, name: &str, price: f64, available: bool) -> Product {
    let stamp = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    Product {
        id,
        name: name.to_string(),
        price,
        available,
        created_at: stamp,
        updated_at: stamp,
    }
}

async fn catalog() -> ProductCommandHandler {
    let repo = Arc::new(InMemoryProductRepository::new());
    repo.insert(product(1, "Keyboard", 49.0, true)).await;
    repo.insert(product(2, "Mouse", 19.0, true)).await;
    repo.insert(product(3, "Monitor", 199.0, false)).await;

    DependenciesInject::with_repositories(repo.clone(), repo, &mut Registry::default()).handler()
}

fn ids(products: &Value) -> Vec<i64> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn listing_only_shows_available_products() {
    let catalog = catalog().await;

    let reply = catalog
        .dispatch("find_all_products", json!({ "page": 1, "limit": 10 }))
        .await
        .unwrap();

    assert_eq!(ids(&reply["data"]), vec![1, 2]);
    assert_eq!(
        reply["meta"],
        json!({ "page": 1, "limit": 10, "total": 2, "lastPage": 1 })
    );
}

#[tokio::test]
async fn unavailable_product_is_not_found() {
    let catalog = catalog().await;

    let err = catalog
        .dispatch("find_one_product", json!({ "id": 3 }))
        .await
        .unwrap_err();

    assert_eq!(err.code(), 404);
    assert_eq!(err.to_string(), "Product not found");
}

#[tokio::test]
async fn batch_validation_is_all_or_nothing() {
    let catalog = catalog().await;

    let ok = catalog
        .dispatch("validate_products", json!([2, 1, 2]))
        .await
        .unwrap();
    assert_eq!(ids(&ok), vec![2, 1]);

    let err = catalog
        .dispatch("validate_products", json!([1, 3]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_failed");
    assert_eq!(err.to_string(), "One or more products are not available");
}

#[tokio::test]
async fn product_lifecycle() {
    let catalog = catalog().await;

    let created = catalog
        .dispatch("create_product", json!({ "name": "Webcam", "price": 59.9 }))
        .await
        .unwrap();
    assert_eq!(created["id"], 4);
    assert_eq!(created["available"], true);

    let found = catalog
        .dispatch("find_one_product", json!({ "id": 4 }))
        .await
        .unwrap();
    assert_eq!(found["name"], "Webcam");
    assert_eq!(found["price"], 59.9);

    let updated = catalog
        .dispatch("update_product", json!({ "id": "4", "name": "HD Webcam" }))
        .await
        .unwrap();
    assert_eq!(updated["name"], "HD Webcam");
    assert_eq!(updated["price"], 59.9);

    let removed = catalog
        .dispatch("remove_product", json!({ "id": 4 }))
        .await
        .unwrap();
    assert_eq!(removed["available"], false);

    for (cmd, payload) in [
        ("find_one_product", json!({ "id": 4 })),
        ("update_product", json!({ "id": 4, "price": 1.0 })),
        ("remove_product", json!({ "id": 4 })),
    ] {
        let err = catalog.dispatch(cmd, payload).await.unwrap_err();
        assert_eq!(err.kind(), "not_found", "{cmd}");
    }

    let listed = catalog
        .dispatch("find_all_products", Value::Null)
        .await
        .unwrap();
    assert_eq!(ids(&listed["data"]), vec![1, 2]);
}

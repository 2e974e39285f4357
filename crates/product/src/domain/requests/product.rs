use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

/// Only `name` and `price` are updatable; an `available` key in the payload
/// is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[serde(deserialize_with = "deserialize_id")]
    #[validate(range(min = 1, message = "Id must be a positive integer"))]
    pub id: i32,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindByIdRequest {
    #[serde(deserialize_with = "deserialize_id")]
    #[validate(range(min = 1, message = "Id must be a positive integer"))]
    pub id: i32,
}

/// Partial update handed to the store. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub available: Option<bool>,
}

impl ProductChanges {
    pub fn details(req: &UpdateProductRequest) -> Self {
        Self {
            name: req.name.clone(),
            price: req.price,
            available: None,
        }
    }

    pub fn mark_unavailable() -> Self {
        Self {
            available: Some(false),
            ..Self::default()
        }
    }
}

/// Id list for batch validation; entries follow the same id rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductIds(#[serde(deserialize_with = "deserialize_ids")] pub Vec<i32>);

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl IdRepr {
    fn into_id<E: serde::de::Error>(self) -> Result<i32, E> {
        match self {
            IdRepr::Number(value) => i32::try_from(value)
                .map_err(|_| E::custom(format!("id {value} is out of range"))),
            IdRepr::Text(text) => text
                .trim()
                .parse::<i32>()
                .map_err(|_| E::custom(format!("id '{text}' is not an integer"))),
        }
    }
}

// Callers send ids either as JSON numbers or as numeric strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer)?.into_id()
}

fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<IdRepr>::deserialize(deserializer)?
        .into_iter()
        .map(IdRepr::into_id)
        .collect()
}

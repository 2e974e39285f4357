pub mod command;
pub mod query;

pub(crate) const PRODUCT_NOT_FOUND: &str = "Product not found";
pub(crate) const PRODUCTS_NOT_AVAILABLE: &str = "One or more products are not available";

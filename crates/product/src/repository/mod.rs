pub mod command;
pub mod memory;
pub mod query;

pub mod analytics;
pub mod query;
pub mod validate;

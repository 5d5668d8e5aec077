pub mod client;
pub mod query;

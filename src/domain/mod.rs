pub mod filter;
pub mod location;
pub mod meeting;
pub mod page;
pub mod query;
pub mod types;

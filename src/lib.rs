//! A document-store client that runs a fixed sequence of queries, writes, aggregations
//! and index calls against a collection of books and prints each result.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod logger;
pub mod plan;
pub mod query;
pub mod render;
pub mod runner;
pub mod store;

pub use config::{AppConfig, StoreConfig};
pub use errors::ShelfError;
pub use plan::{Operation, Outcome, Step, book_plan};
pub use render::OutputMode;
pub use runner::{OperationRunner, RunReport, run_with_config};
pub use store::{BookStore, MongoStore};

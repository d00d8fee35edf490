//! The data-access seam between the runner and the external document store.

mod mongo;

pub use mongo::MongoStore;

use crate::errors::ShelfError;
use crate::query::{DeleteReport, FindSpec, UpdateReport};
use bson::Document;

/// Every call is a single request to the store; implementations hold no state beyond the
/// connection itself.
#[allow(async_fn_in_trait)]
pub trait BookStore {
    async fn find(&self, spec: &FindSpec) -> Result<Vec<Document>, ShelfError>;

    async fn update_one(&self, filter: &Document, update: &Document) -> Result<UpdateReport, ShelfError>;

    async fn delete_one(&self, filter: &Document) -> Result<DeleteReport, ShelfError>;

    async fn aggregate(&self, pipeline: &[Document]) -> Result<Vec<Document>, ShelfError>;

    /// Returns the name the store gave the index.
    async fn create_index(&self, keys: &Document) -> Result<String, ShelfError>;

    /// Execution statistics for a `find` with `filter`.
    async fn explain(&self, filter: &Document) -> Result<Document, ShelfError>;

    async fn insert_many(&self, docs: &[Document]) -> Result<usize, ShelfError>;

    /// Drop the collection and everything in it.
    async fn drop_collection(&self) -> Result<(), ShelfError>;

    /// Release the connection. Called exactly once, on success and failure paths alike.
    async fn close(self)
    where
        Self: Sized;
}

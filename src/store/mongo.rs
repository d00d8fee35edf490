use super::BookStore;
use crate::config::StoreConfig;
use crate::errors::ShelfError;
use crate::query::{DeleteReport, FindSpec, UpdateReport};
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database, IndexModel};

pub const APP_NAME: &str = "bookshelf";

/// A [`BookStore`] backed by one `mongodb::Client` and one collection.
pub struct MongoStore {
    client: Client,
    db: Database,
    books: Collection<Document>,
}

impl MongoStore {
    /// Build a client for `cfg` and ping the server so an unreachable store fails here
    /// rather than on the first operation. The client is shut down if the ping fails.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, ShelfError> {
        let mut opts = ClientOptions::parse(cfg.uri.as_str()).await?;
        if opts.app_name.is_none() {
            opts.app_name = Some(APP_NAME.to_string());
        }
        let client = Client::with_options(opts)?;
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            return Err(e.into());
        }
        let db = client.database(&cfg.database_name);
        let books = db.collection::<Document>(&cfg.collection_name);
        log::info!(
            "connected to {} (database={}, collection={})",
            cfg.redacted_uri(),
            cfg.database_name,
            cfg.collection_name
        );
        Ok(Self { client, db, books })
    }
}

fn find_options(spec: &FindSpec) -> FindOptions {
    let mut opts = FindOptions::default();
    opts.projection = spec.projection.clone();
    opts.sort = spec.sort_document();
    opts.skip = spec.skip;
    opts.limit = spec.limit;
    opts
}

impl BookStore for MongoStore {
    async fn find(&self, spec: &FindSpec) -> Result<Vec<Document>, ShelfError> {
        let cursor = self.books.find(spec.filter.clone()).with_options(find_options(spec)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_one(&self, filter: &Document, update: &Document) -> Result<UpdateReport, ShelfError> {
        let r = self.books.update_one(filter.clone(), update.clone()).await?;
        Ok(UpdateReport { matched: r.matched_count, modified: r.modified_count })
    }

    async fn delete_one(&self, filter: &Document) -> Result<DeleteReport, ShelfError> {
        let r = self.books.delete_one(filter.clone()).await?;
        Ok(DeleteReport { deleted: r.deleted_count })
    }

    async fn aggregate(&self, pipeline: &[Document]) -> Result<Vec<Document>, ShelfError> {
        let cursor = self.books.aggregate(pipeline.to_vec()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn create_index(&self, keys: &Document) -> Result<String, ShelfError> {
        let model = IndexModel::builder().keys(keys.clone()).build();
        let r = self.books.create_index(model).await?;
        Ok(r.index_name)
    }

    async fn explain(&self, filter: &Document) -> Result<Document, ShelfError> {
        let command = doc! {
            "explain": { "find": self.books.name(), "filter": filter.clone() },
            "verbosity": "executionStats",
        };
        Ok(self.db.run_command(command).await?)
    }

    async fn insert_many(&self, docs: &[Document]) -> Result<usize, ShelfError> {
        if docs.is_empty() {
            return Ok(0);
        }
        let r = self.books.insert_many(docs).await?;
        Ok(r.inserted_ids.len())
    }

    async fn drop_collection(&self) -> Result<(), ShelfError> {
        self.books.drop().await?;
        Ok(())
    }

    async fn close(self) {
        let MongoStore { client, db, books } = self;
        drop(books);
        drop(db);
        client.shutdown().await;
        log::info!("connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortSpec;

    #[test]
    fn find_options_carry_every_field() {
        let spec = FindSpec::filter(doc! {"available": true})
            .project(doc! {"title": 1, "_id": 0})
            .sort_by(SortSpec::desc("publishedYear"))
            .page(5, 5);
        let opts = find_options(&spec);
        assert_eq!(opts.projection, Some(doc! {"title": 1, "_id": 0}));
        assert_eq!(opts.sort, Some(doc! {"publishedYear": -1}));
        assert_eq!(opts.skip, Some(5));
        assert_eq!(opts.limit, Some(5));
    }

    #[test]
    fn find_options_default_to_unset() {
        let opts = find_options(&FindSpec::all());
        assert!(opts.projection.is_none());
        assert!(opts.sort.is_none());
        assert!(opts.skip.is_none());
        assert!(opts.limit.is_none());
    }
}

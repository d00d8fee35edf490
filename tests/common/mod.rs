#![allow(dead_code)]

use bookshelf::errors::ShelfError;
use bookshelf::query::{DeleteReport, FindSpec, UpdateReport};
use bookshelf::store::BookStore;
use bson::{Document, doc};
use std::sync::{Arc, Mutex};

/// A store that answers from canned values and records every call by name.
pub struct RecordingStore {
    pub calls: Arc<Mutex<Vec<String>>>,
    /// 1-based call number that fails, counting every call except `close`.
    pub fail_on: Option<usize>,
    pub modified: u64,
    pub deleted: u64,
    pub docs: Vec<Document>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            modified: 1,
            deleted: 1,
            docs: vec![doc! { "title": "The Hobbit", "publishedYear": 1937 }],
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn with_counts(mut self, modified: u64, deleted: u64) -> Self {
        self.modified = modified;
        self.deleted = deleted;
        self
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    fn record(&self, name: &str) -> Result<(), ShelfError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(name.to_string());
        let n = calls.iter().filter(|c| c.as_str() != "close").count();
        if self.fail_on == Some(n) {
            return Err(ShelfError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("injected failure on {name}"),
            )));
        }
        Ok(())
    }
}

impl BookStore for RecordingStore {
    async fn find(&self, _spec: &FindSpec) -> Result<Vec<Document>, ShelfError> {
        self.record("find")?;
        Ok(self.docs.clone())
    }

    async fn update_one(&self, _filter: &Document, _update: &Document) -> Result<UpdateReport, ShelfError> {
        self.record("update_one")?;
        Ok(UpdateReport { matched: self.modified, modified: self.modified })
    }

    async fn delete_one(&self, _filter: &Document) -> Result<DeleteReport, ShelfError> {
        self.record("delete_one")?;
        Ok(DeleteReport { deleted: self.deleted })
    }

    async fn aggregate(&self, _pipeline: &[Document]) -> Result<Vec<Document>, ShelfError> {
        self.record("aggregate")?;
        Ok(vec![doc! { "_id": "Fantasy", "count": 3 }])
    }

    async fn create_index(&self, keys: &Document) -> Result<String, ShelfError> {
        self.record("create_index")?;
        Ok(keys.keys().map(|k| format!("{k}_1")).collect::<Vec<_>>().join("_"))
    }

    async fn explain(&self, _filter: &Document) -> Result<Document, ShelfError> {
        self.record("explain")?;
        Ok(doc! { "executionStats": { "nReturned": 1, "totalDocsExamined": 11 } })
    }

    async fn insert_many(&self, docs: &[Document]) -> Result<usize, ShelfError> {
        self.record("insert_many")?;
        Ok(docs.len())
    }

    async fn drop_collection(&self) -> Result<(), ShelfError> {
        self.record("drop_collection")?;
        Ok(())
    }

    async fn close(self) {
        self.calls.lock().unwrap().push("close".to_string());
    }
}

pub fn calls(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}

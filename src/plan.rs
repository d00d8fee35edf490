//! The fixed, ordered list of operations run against the books collection.
//!
//! Later steps assume the side effects of earlier ones (the delete in step 5 runs after
//! the update in step 4 and before every read that follows), so the order returned by
//! [`book_plan`] is the order of execution.

use crate::errors::ShelfError;
use crate::query::{DeleteReport, FindSpec, SortSpec, UpdateReport};
use crate::store::BookStore;
use bson::{Bson, Document, doc};

pub const FANTASY_GENRE: &str = "Fantasy";
pub const RECENT_AFTER_YEAR: i32 = 2000;
pub const FEATURED_AUTHOR: &str = "George Orwell";
pub const REPRICED_TITLE: &str = "The Great Gatsby";
pub const NEW_PRICE: f64 = 11.99;
pub const REMOVED_TITLE: &str = "Moby Dick";
pub const AVAILABLE_AFTER_YEAR: i32 = 1950;
pub const PAGE_SIZE: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Find(FindSpec),
    UpdateOne { filter: Document, update: Document },
    DeleteOne { filter: Document },
    Aggregate { pipeline: Vec<Document> },
    CreateIndex { keys: Document },
    Explain { filter: Document },
}

/// What a single operation returned, kept as the store produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Documents(Vec<Document>),
    Updated(UpdateReport),
    Deleted(DeleteReport),
    IndexCreated(String),
    Plan(Document),
}

impl Outcome {
    pub fn documents(&self) -> Option<&[Document]> {
        match self {
            Outcome::Documents(docs) => Some(docs.as_slice()),
            _ => None,
        }
    }

    /// The write count an update/delete reported, if this is a write.
    pub fn affected(&self) -> Option<u64> {
        match self {
            Outcome::Updated(r) => Some(r.modified),
            Outcome::Deleted(r) => Some(r.deleted),
            _ => None,
        }
    }
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Find(_) => "find",
            Operation::UpdateOne { .. } => "update_one",
            Operation::DeleteOne { .. } => "delete_one",
            Operation::Aggregate { .. } => "aggregate",
            Operation::CreateIndex { .. } => "create_index",
            Operation::Explain { .. } => "explain",
        }
    }

    /// Issue this operation as one request to `store`.
    pub async fn execute<S: BookStore>(&self, store: &S) -> Result<Outcome, ShelfError> {
        match self {
            Operation::Find(spec) => store.find(spec).await.map(Outcome::Documents),
            Operation::UpdateOne { filter, update } => {
                store.update_one(filter, update).await.map(Outcome::Updated)
            }
            Operation::DeleteOne { filter } => store.delete_one(filter).await.map(Outcome::Deleted),
            Operation::Aggregate { pipeline } => store.aggregate(pipeline).await.map(Outcome::Documents),
            Operation::CreateIndex { keys } => store.create_index(keys).await.map(Outcome::IndexCreated),
            Operation::Explain { filter } => store.explain(filter).await.map(Outcome::Plan),
        }
    }

    /// Arguments as relaxed extended JSON, for listing the plan without running it.
    pub fn describe(&self) -> serde_json::Value {
        fn json(d: &Document) -> serde_json::Value {
            Bson::Document(d.clone()).into_relaxed_extjson()
        }
        match self {
            Operation::Find(spec) => spec.describe(),
            Operation::UpdateOne { filter, update } => {
                serde_json::json!({ "filter": json(filter), "update": json(update) })
            }
            Operation::DeleteOne { filter } => serde_json::json!({ "filter": json(filter) }),
            Operation::Aggregate { pipeline } => {
                serde_json::json!({ "pipeline": pipeline.iter().map(json).collect::<Vec<_>>() })
            }
            Operation::CreateIndex { keys } => serde_json::json!({ "keys": json(keys) }),
            Operation::Explain { filter } => {
                serde_json::json!({ "filter": json(filter), "verbosity": "executionStats" })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub operation: Operation,
}

impl Step {
    pub fn new(label: impl Into<String>, operation: Operation) -> Self {
        Self { label: label.into(), operation }
    }
}

/// `"<decade>s"` from `publishedYear`, computed by the server.
pub fn decade_bucket_expr() -> Bson {
    Bson::Document(doc! {
        "$concat": [
            { "$toString": { "$toInt": {
                "$multiply": [ { "$floor": { "$divide": ["$publishedYear", 10] } }, 10 ]
            } } },
            "s",
        ]
    })
}

pub fn book_plan() -> Vec<Step> {
    vec![
        Step::new(
            format!("{FANTASY_GENRE} books"),
            Operation::Find(FindSpec::filter(doc! { "genre": FANTASY_GENRE })),
        ),
        Step::new(
            format!("Books published after {RECENT_AFTER_YEAR}"),
            Operation::Find(FindSpec::filter(doc! { "publishedYear": { "$gt": RECENT_AFTER_YEAR } })),
        ),
        Step::new(
            format!("Books by {FEATURED_AUTHOR}"),
            Operation::Find(FindSpec::filter(doc! { "author": FEATURED_AUTHOR })),
        ),
        Step::new(
            format!("Set price of \"{REPRICED_TITLE}\" to {NEW_PRICE}"),
            Operation::UpdateOne {
                filter: doc! { "title": REPRICED_TITLE },
                update: doc! { "$set": { "price": NEW_PRICE } },
            },
        ),
        Step::new(
            format!("Delete \"{REMOVED_TITLE}\""),
            Operation::DeleteOne { filter: doc! { "title": REMOVED_TITLE } },
        ),
        Step::new(
            format!("Available books published after {AVAILABLE_AFTER_YEAR}"),
            Operation::Find(FindSpec::filter(doc! {
                "$and": [
                    { "available": true },
                    { "publishedYear": { "$gt": AVAILABLE_AFTER_YEAR } },
                ]
            })),
        ),
        Step::new(
            "Titles, authors and prices",
            Operation::Find(FindSpec::all().project(doc! { "title": 1, "author": 1, "price": 1, "_id": 0 })),
        ),
        Step::new(
            "Oldest first",
            Operation::Find(FindSpec::all().sort_by(SortSpec::asc("publishedYear"))),
        ),
        Step::new(
            "Newest first",
            Operation::Find(FindSpec::all().sort_by(SortSpec::desc("publishedYear"))),
        ),
        Step::new(
            "Page 1",
            Operation::Find(FindSpec::all().sort_by(SortSpec::asc("_id")).page(0, PAGE_SIZE)),
        ),
        Step::new(
            "Page 2",
            Operation::Find(FindSpec::all().sort_by(SortSpec::asc("_id")).page(PAGE_SIZE as u64, PAGE_SIZE)),
        ),
        Step::new(
            "Average price per genre",
            Operation::Aggregate {
                pipeline: vec![
                    doc! { "$group": { "_id": "$genre", "averagePrice": { "$avg": "$price" } } },
                    doc! { "$sort": { "_id": 1 } },
                ],
            },
        ),
        Step::new(
            "Author with the most books",
            Operation::Aggregate {
                pipeline: vec![
                    doc! { "$group": { "_id": "$author", "count": { "$sum": 1 } } },
                    doc! { "$sort": { "count": -1, "_id": 1 } },
                    doc! { "$limit": 1 },
                ],
            },
        ),
        Step::new(
            "Books per decade",
            Operation::Aggregate {
                pipeline: vec![
                    doc! { "$group": { "_id": decade_bucket_expr(), "count": { "$sum": 1 } } },
                    doc! { "$sort": { "_id": 1 } },
                ],
            },
        ),
        Step::new("Index on title", Operation::CreateIndex { keys: doc! { "title": 1 } }),
        Step::new(
            "Index on author, publishedYear desc",
            Operation::CreateIndex { keys: doc! { "author": 1, "publishedYear": -1 } },
        ),
        Step::new(
            format!("Explain lookup of \"{REPRICED_TITLE}\""),
            Operation::Explain { filter: doc! { "title": REPRICED_TITLE } },
        ),
    ]
}

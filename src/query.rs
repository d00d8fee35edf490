//! Parameter and result shapes exchanged with the store.

use bson::{Document, doc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn direction(self) -> i32 {
        match self {
            Order::Asc => 1,
            Order::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

/// A single `find` request. The filter is passed to the server untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Vec<SortSpec>>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindSpec {
    pub fn filter(filter: Document) -> Self {
        Self { filter, ..Default::default() }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn project(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort_by(mut self, spec: SortSpec) -> Self {
        self.sort.get_or_insert_with(Vec::new).push(spec);
        self
    }

    pub fn page(mut self, skip: u64, limit: i64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    /// The sort specs as an ordered `{field: 1|-1}` document.
    pub fn sort_document(&self) -> Option<Document> {
        self.sort.as_ref().filter(|s| !s.is_empty()).map(|specs| {
            let mut d = Document::new();
            for s in specs {
                d.insert(s.field.clone(), s.order.direction());
            }
            d
        })
    }

    /// Relaxed extended JSON view, used by the plan listing.
    pub fn describe(&self) -> serde_json::Value {
        let mut d = doc! { "filter": self.filter.clone() };
        if let Some(p) = &self.projection { d.insert("projection", p.clone()); }
        if let Some(s) = self.sort_document() { d.insert("sort", s); }
        if let Some(n) = self.skip { d.insert("skip", n as i64); }
        if let Some(n) = self.limit { d.insert("limit", n); }
        bson::Bson::Document(d).into_relaxed_extjson()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: u64,
}

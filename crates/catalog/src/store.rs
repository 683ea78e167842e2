//! Backing document store contract.
//!
//! The listing pipelines only need a small capability set from the store:
//! collection scans, equality filters, single-field ordering, a limit, and
//! "start after this document" continuation. Any store offering those
//! primitives can back the service.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use storefront_core::{Document, DocumentId};

static NULL: Value = Value::Null;

/// Backing store failure.
///
/// These are **infrastructure errors**. Callers never echo their detail to
/// clients; they log it and answer with a generic message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("failed to decode document: {0}")]
    Decode(String),
}

/// Sort direction of an ordered query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a `sort` query value. Anything other than `desc` is ascending.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Equality predicate on a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `fields[field] == value`. Numbers compare numerically (`100 == 100.0`).
    /// A missing field never matches.
    FieldEq { field: String, value: Value },
    /// The store-assigned identifier equals the given id.
    IdEq(DocumentId),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::FieldEq { field, value } => {
                doc.field(field).is_some_and(|stored| values_equal(stored, value))
            }
            Filter::IdEq(id) => doc.id() == id,
        }
    }
}

/// Ordering of a query: one field, ties broken by document id in the same
/// direction so that the order is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Continuation point: results start strictly after the document whose order
/// key is `(value, id)`. A missing order field is `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartAfter {
    pub value: Value,
    pub id: DocumentId,
}

/// A query against one collection.
///
/// Built with chained methods:
///
/// ```
/// use storefront_catalog::{DocumentQuery, SortDirection};
///
/// let query = DocumentQuery::collection("products")
///     .where_eq("category", "electronics")
///     .order_by("price", SortDirection::Desc)
///     .limit(2);
/// assert_eq!(query.limit, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub start_after: Option<StartAfter>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::FieldEq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_id(mut self, id: DocumentId) -> Self {
        self.filters.push(Filter::IdEq(id));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn start_after(mut self, anchor: StartAfter) -> Self {
        self.start_after = Some(anchor);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document passes every filter of this query.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Value of the ordering field (`Null` when unordered or missing).
    pub fn sort_value<'a>(&self, doc: &'a Document) -> &'a Value {
        match &self.order_by {
            Some(order) => doc.field(&order.field).unwrap_or(&NULL),
            None => &NULL,
        }
    }

    /// Compare two documents under this query's ordering.
    ///
    /// Without an `order_by`, documents are ordered by id.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.compare_keys((self.sort_value(a), a.id()), (self.sort_value(b), b.id()))
    }

    /// Whether `doc` sorts strictly after the continuation anchor.
    pub fn is_after(&self, anchor: &StartAfter, doc: &Document) -> bool {
        self.compare_keys((self.sort_value(doc), doc.id()), (&anchor.value, &anchor.id))
            == Ordering::Greater
    }

    /// Evaluate this query over an in-memory set of documents.
    ///
    /// Applies filters, ordering, the continuation anchor and the limit, in
    /// that order. Stores without a native query engine use this directly.
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        out.sort_by(|a, b| self.compare(a, b));
        if let Some(anchor) = &self.start_after {
            out.retain(|d| self.is_after(anchor, d));
        }
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    fn compare_keys(&self, a: (&Value, &DocumentId), b: (&Value, &DocumentId)) -> Ordering {
        match &self.order_by {
            Some(order) => order
                .direction
                .apply(compare_values(a.0, b.0).then_with(|| a.1.cmp(b.1))),
            None => a.1.cmp(b.1),
        }
    }
}

/// Equality used by [`Filter::FieldEq`]: numeric for numbers, structural
/// otherwise.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Ordering::Equal,
        _ => a == b,
    }
}

/// Type rank used for cross-type ordering:
/// null < booleans < numbers < strings < arrays < objects.
pub fn value_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over field values shared by all store adapters.
///
/// Values of different types order by [`value_rank`]. Numbers compare
/// numerically, strings lexicographically. Arrays and objects are not
/// meaningful sort keys and compare equal within their rank.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => value_rank(a).cmp(&value_rank(b)),
    }
}

/// Async query interface of the backing document store.
///
/// ## Semantics
///
/// - `scan` returns every document of a collection in the store's natural
///   order. No ordering guarantee is made.
/// - `query` returns the documents matching all filters, sorted by the
///   query's ordering (ties broken by id), starting strictly after the
///   continuation anchor when one is given, truncated to the limit.
///
/// Implementations are read-only from the service's point of view and must be
/// safe to share across concurrent requests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document of a collection.
    async fn scan(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Run a filtered, ordered, bounded query.
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn scan(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).scan(collection).await
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        (**self).query(query).await
    }
}

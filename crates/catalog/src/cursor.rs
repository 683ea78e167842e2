//! Stateless page cursors.
//!
//! A cursor is just the id of the last document of the previous page. It holds
//! no server-side state: each request re-resolves it against the store to the
//! anchor `(order value, id)` the next page starts after.

use serde::{Deserialize, Serialize};

use storefront_core::{Document, DocumentId};

use crate::store::{DocumentQuery, StartAfter};

/// Identifier of the last item of a previously returned page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(DocumentId);

impl PageCursor {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }

    /// Cursor pointing at `doc`, for resuming after it.
    pub fn after(doc: &Document) -> Self {
        Self(doc.id().clone())
    }

    /// Cursor from a raw query value. Missing or empty means "no cursor".
    pub fn from_param(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| DocumentId::new(s).ok()).map(Self)
    }

    pub fn id(&self) -> &DocumentId {
        &self.0
    }

    /// Single-item lookup locating the anchor document in `base`'s collection.
    ///
    /// Only the ordering of `base` carries over; its filters scope the page,
    /// not the anchor, so a cursor from another filtered view still resumes
    /// at the anchor's position in the ordering.
    pub fn anchor_query(&self, base: &DocumentQuery) -> DocumentQuery {
        let mut lookup = DocumentQuery::collection(base.collection.clone());
        if let Some(order) = &base.order_by {
            lookup = lookup.order_by(order.field.clone(), order.direction);
        }
        lookup.where_id(self.0.clone()).limit(1)
    }

    /// Continuation point after the resolved anchor document.
    pub fn continuation(anchor: &Document, base: &DocumentQuery) -> StartAfter {
        StartAfter {
            value: base.sort_value(anchor).clone(),
            id: anchor.id().clone(),
        }
    }
}

impl core::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Filter, SortDirection};
    use serde_json::json;

    #[test]
    fn empty_param_is_no_cursor() {
        assert_eq!(PageCursor::from_param(None), None);
        assert_eq!(PageCursor::from_param(Some("")), None);
        assert_eq!(
            PageCursor::from_param(Some("abc")).map(|c| c.to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn anchor_query_keeps_ordering_but_drops_filters() {
        let base = DocumentQuery::collection("products")
            .where_eq("category", "books")
            .order_by("price", SortDirection::Desc);
        let cursor = PageCursor::new(DocumentId::new("p9").unwrap());

        let lookup = cursor.anchor_query(&base);

        assert_eq!(lookup.collection, "products");
        assert_eq!(lookup.order_by, base.order_by);
        assert_eq!(lookup.limit, Some(1));
        assert_eq!(lookup.filters, vec![Filter::IdEq(DocumentId::new("p9").unwrap())]);
        assert!(lookup.start_after.is_none());
    }

    #[test]
    fn continuation_uses_order_field_value() {
        let base = DocumentQuery::collection("products").order_by("price", SortDirection::Asc);
        let fields = match json!({ "price": 42, "title": "Kettle" }) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };
        let anchor = Document::new(DocumentId::new("k1").unwrap(), fields);

        let start = PageCursor::continuation(&anchor, &base);
        assert_eq!(start.value, json!(42));
        assert_eq!(start.id.as_str(), "k1");
    }
}

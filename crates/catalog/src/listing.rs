//! Category and product listing pipelines.
//!
//! Both pipelines are read-only and stateless: everything a request needs is
//! in its parameters, and everything it returns comes from the store.

use serde::Serialize;
use thiserror::Error;

use storefront_core::Document;

use crate::cursor::PageCursor;
use crate::fuzzy::{retain_matches, FuzzyMatcher};
use crate::params::ListProductsParams;
use crate::store::{DocumentQuery, DocumentStore, StoreError};

pub const CATEGORIES: &str = "categories";
pub const PRODUCTS: &str = "products";

pub const TITLE_FIELD: &str = "title";
pub const CATEGORY_FIELD: &str = "category";
pub const PRICE_FIELD: &str = "price";

/// Listing failure.
///
/// `InvalidCursor` and `InvalidParameter` are the caller's fault; `Backend`
/// covers everything the store reports.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("cursor `{0}` does not resolve to a document")]
    InvalidCursor(PageCursor),

    #[error("invalid value for `{name}`: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error(transparent)]
    Backend(#[from] StoreError),
}

impl ListError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ListError::Backend(_))
    }
}

/// One page of products plus the cursor to continue from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    /// The fetched page, narrowed by the search term when one was given.
    pub products: Vec<Document>,
    /// Id of the last item of the fetched page *before* search narrowing.
    pub next_cursor: Option<PageCursor>,
    /// `page + 1` when the fetched page is non-empty. `None` past the last
    /// representable page.
    pub next_page: Option<u64>,
}

/// Fetch every category, in the store's natural order.
pub async fn list_categories<S>(store: &S) -> Result<Vec<Document>, ListError>
where
    S: DocumentStore + ?Sized,
{
    Ok(store.scan(CATEGORIES).await?)
}

/// Fetch one page of products.
///
/// Products are always ordered by price (ties by id) so that a cursor can
/// resume the sequence. A cursor is resolved with an extra single-item lookup
/// over the whole collection before the page query runs; when it does not
/// resolve, the request fails with [`ListError::InvalidCursor`] and the page
/// query is never issued. The category filter applies to the page only, so a
/// cursor naming a product of another category resumes after its price.
///
/// Search runs after pagination and only narrows the fetched page. The next
/// cursor still points at the last item of the unfiltered page, so paging
/// through a search walks the same sequence as paging without one. A search
/// can therefore return an empty page that still has a next cursor.
pub async fn list_products<S, M>(
    store: &S,
    matcher: &M,
    params: &ListProductsParams,
) -> Result<ProductPage, ListError>
where
    S: DocumentStore + ?Sized,
    M: FuzzyMatcher + ?Sized,
{
    let mut base = DocumentQuery::collection(PRODUCTS);
    if let Some(category) = &params.category {
        base = base.where_eq(CATEGORY_FIELD, category.as_str());
    }
    let base = base.order_by(PRICE_FIELD, params.sort);

    let mut query = base.clone();
    if let Some(cursor) = &params.cursor {
        let found = store.query(&cursor.anchor_query(&base)).await?;
        let anchor = found
            .first()
            .ok_or_else(|| ListError::InvalidCursor(cursor.clone()))?;
        tracing::debug!(cursor = %cursor, "resolved page cursor");
        query = query.start_after(PageCursor::continuation(anchor, &base));
    }
    let query = query.limit(params.page_size);

    let page = store.query(&query).await?;

    let next_cursor = page.last().map(PageCursor::after);
    let next_page = next_cursor.as_ref().and_then(|_| params.page.checked_add(1));

    let products = match &params.search {
        Some(term) => retain_matches(matcher, page, term, |doc| doc.str_field(TITLE_FIELD)),
        None => page,
    };

    Ok(ProductPage {
        products,
        next_cursor,
        next_page,
    })
}

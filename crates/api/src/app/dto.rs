use serde::Serialize;

use storefront_catalog::{ListError, ListProductsParams, PageCursor, ProductPage};
use storefront_core::Document;

// -------------------------
// Request DTOs
// -------------------------

/// Raw `GET /products` query string. Every value arrives as text and is
/// coerced by [`ProductsQuery::into_params`].
#[derive(Debug, Default)]
pub struct ProductsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub last_visible_id: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ProductsQuery {
    /// Collect the known parameters from decoded query pairs.
    ///
    /// A repeated parameter keeps its first value; unknown names are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                "lastVisibleId" => &mut query.last_visible_id,
                "search" => &mut query.search,
                "category" => &mut query.category,
                "sort" => &mut query.sort,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    pub fn into_params(self, max_page_size: usize) -> Result<ListProductsParams, ListError> {
        ListProductsParams::from_query(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.last_visible_id.as_deref(),
            self.search.as_deref(),
            self.category.as_deref(),
            self.sort.as_deref(),
            max_page_size,
        )
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub products: Vec<Document>,
    pub last_visible_id: Option<PageCursor>,
    pub next_page: Option<u64>,
}

impl From<ProductPage> for ProductsResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            products: page.products,
            last_visible_id: page.next_cursor,
            next_page: page.next_page,
        }
    }
}

//! Product listing parameters and their query-string coercion.

use crate::cursor::PageCursor;
use crate::listing::ListError;
use crate::store::SortDirection;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Validated input of a product listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListProductsParams {
    /// Informational page counter. Offsets are cursor-driven, not page-driven.
    pub page: u64,
    /// Maximum number of items fetched for this page.
    pub page_size: usize,
    pub cursor: Option<PageCursor>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortDirection,
}

impl Default for ListProductsParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
            search: None,
            category: None,
            sort: SortDirection::Asc,
        }
    }
}

impl ListProductsParams {
    /// Coerce raw query-string values.
    ///
    /// `page` and `limit` must be positive integers when present; `limit` is
    /// clamped to `max_page_size`. Empty strings count as absent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        cursor: Option<&str>,
        search: Option<&str>,
        category: Option<&str>,
        sort: Option<&str>,
        max_page_size: usize,
    ) -> Result<Self, ListError> {
        let page = parse_positive("page", page)?.unwrap_or(DEFAULT_PAGE);
        let page_size = parse_positive::<usize>("limit", limit)?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size.max(1));

        Ok(Self {
            page,
            page_size,
            cursor: PageCursor::from_param(cursor),
            search: non_empty(search),
            category: non_empty(category),
            sort: SortDirection::from_param(sort),
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_owned)
}

fn parse_positive<T>(name: &'static str, raw: Option<&str>) -> Result<Option<T>, ListError>
where
    T: core::str::FromStr + PartialOrd + From<u8>,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<T>() {
        Ok(v) if v >= T::from(1) => Ok(Some(v)),
        _ => Err(ListError::InvalidParameter {
            name,
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(page: Option<&str>, limit: Option<&str>) -> Result<ListProductsParams, ListError> {
        ListProductsParams::from_query(page, limit, None, None, None, None, DEFAULT_MAX_PAGE_SIZE)
    }

    #[test]
    fn defaults_apply_when_absent() {
        let params = parse(None, None).unwrap();
        assert_eq!(params, ListProductsParams::default());
    }

    #[test]
    fn empty_values_count_as_absent() {
        let params = ListProductsParams::from_query(
            Some(""),
            Some(""),
            Some(""),
            Some(""),
            Some(""),
            Some(""),
            DEFAULT_MAX_PAGE_SIZE,
        )
        .unwrap();
        assert_eq!(params, ListProductsParams::default());
    }

    #[test]
    fn limit_must_be_a_positive_integer() {
        for bad in ["0", "-3", "ten", "2.5"] {
            let err = parse(None, Some(bad)).unwrap_err();
            assert!(
                matches!(err, ListError::InvalidParameter { name: "limit", .. }),
                "limit={bad} gave {err:?}"
            );
        }
        assert_eq!(parse(None, Some(" 7 ")).unwrap().page_size, 7);
    }

    #[test]
    fn page_must_be_a_positive_integer() {
        let err = parse(Some("0"), None).unwrap_err();
        assert!(matches!(err, ListError::InvalidParameter { name: "page", .. }));
        assert_eq!(parse(Some("4"), None).unwrap().page, 4);
    }

    #[test]
    fn page_accepts_values_past_u32() {
        assert_eq!(parse(Some("4294967296"), None).unwrap().page, 4_294_967_296);
        let err = parse(Some("18446744073709551616"), None).unwrap_err();
        assert!(matches!(err, ListError::InvalidParameter { name: "page", .. }));
    }

    #[test]
    fn limit_is_clamped_to_maximum() {
        let params =
            ListProductsParams::from_query(None, Some("5000"), None, None, None, None, 50).unwrap();
        assert_eq!(params.page_size, 50);
    }

    #[test]
    fn filters_and_sort_are_carried_through() {
        let params = ListProductsParams::from_query(
            Some("2"),
            Some("3"),
            Some("p-17"),
            Some("fone"),
            Some("electronics"),
            Some("desc"),
            DEFAULT_MAX_PAGE_SIZE,
        )
        .unwrap();

        assert_eq!(params.page, 2);
        assert_eq!(params.page_size, 3);
        assert_eq!(params.cursor.unwrap().id().as_str(), "p-17");
        assert_eq!(params.search.as_deref(), Some("fone"));
        assert_eq!(params.category.as_deref(), Some("electronics"));
        assert_eq!(params.sort, SortDirection::Desc);
    }
}

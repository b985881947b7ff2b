/// Pagination window parsed from raw query-string values.
///
/// Missing or non-numeric values never fail the request: an unusable
/// `limit` means "no limit", an unusable `offset` means 0. Negative
/// values are clamped to 0. No maximum page size is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|l| l.max(0));
        let offset = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|o| o.max(0))
            .unwrap_or(0);
        Self { limit, offset }
    }

    pub fn unbounded() -> Self {
        Self { limit: None, offset: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_mean_unbounded_from_start() {
        assert_eq!(Page::from_raw(None, None), Page::unbounded());
    }

    #[test]
    fn non_numeric_and_negative_values_never_error() {
        let page = Page::from_raw(Some("abc"), Some("-5"));
        assert_eq!(page.limit, None);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn negative_limit_clamps_to_zero() {
        let page = Page::from_raw(Some("-3"), Some("7"));
        assert_eq!(page.limit, Some(0));
        assert_eq!(page.offset, 7);
    }

    #[test]
    fn numeric_values_pass_through() {
        let page = Page::from_raw(Some("25"), Some("50"));
        assert_eq!(page.limit, Some(25));
        assert_eq!(page.offset, 50);
    }

    #[test]
    fn whitespace_is_tolerated() {
        let page = Page::from_raw(Some(" 10 "), Some(" 2 "));
        assert_eq!(page.limit, Some(10));
        assert_eq!(page.offset, 2);
    }
}

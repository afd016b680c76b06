//! Paginated response envelope with absolute next/previous links.

use serde::Serialize;
use url::Url;

/// One page of results in the API's envelope shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub next: Option<String>,
    pub previous: Option<String>,
    pub count: u64,
    pub num_pages: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// An empty first page (used e.g. for the author-filter non-leak case).
    pub fn empty() -> Self {
        Self {
            next: None,
            previous: None,
            count: 0,
            num_pages: 1,
            results: Vec::new(),
        }
    }
}

/// `ceil(total / page_size)`, never less than one page.
pub fn num_pages(total: u64, page_size: u32) -> u32 {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size as u64) as u32
    }
}

/// Build a page, deriving next/previous links from the listing's own query.
pub fn build_page<T>(
    base: &Url,
    path: &str,
    query: &[(String, String)],
    page: u32,
    num_pages: u32,
    count: u64,
    results: Vec<T>,
) -> Page<T> {
    let link = |target_page: u32| -> String {
        let mut url = base.clone();
        url.set_path(path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("page", &target_page.to_string());
        }
        url.to_string()
    };
    Page {
        next: (page < num_pages).then(|| link(page + 1)),
        previous: (page > 1).then(|| link(page - 1)),
        count,
        num_pages,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_pages_is_ceiling_with_floor_of_one() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(1, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
        assert_eq!(num_pages(21, 10), 3);
    }

    #[test]
    fn links_only_where_pages_exist() {
        let base = Url::parse("https://forum.example.com").unwrap();
        let query = vec![("course_id".to_string(), "c".to_string())];

        let first: Page<u8> = build_page(&base, "/api/discussion/v1/threads", &query, 1, 3, 25, vec![]);
        assert!(first.previous.is_none());
        assert!(first.next.as_deref().unwrap().contains("page=2"));

        let last: Page<u8> = build_page(&base, "/api/discussion/v1/threads", &query, 3, 3, 25, vec![]);
        assert!(last.next.is_none());
        assert!(last.previous.as_deref().unwrap().contains("page=2"));
        assert!(last.previous.as_deref().unwrap().contains("course_id=c"));
    }
}

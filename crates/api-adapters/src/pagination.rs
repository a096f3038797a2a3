//! Limit/offset response envelope.

use serde::Serialize;

use domains::{Page, Window};

/// A list response: a bare array, or `{count, next, previous, results}`
/// when the client asked for a `limit`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Plain(Vec<T>),
    Paged {
        count: u64,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<T>,
    },
}

/// The URL a list was requested at, split into the part links keep and the
/// query they rewrite.
#[derive(Debug, Clone)]
pub struct PageUrl {
    pub base: String,
    pub query: Option<String>,
}

impl<T> ListBody<T> {
    pub fn from_page(page: Page<T>, window: &Window, url: &PageUrl) -> Self {
        let Some(limit) = window.limit else {
            return ListBody::Plain(page.items);
        };
        let limit = u64::from(limit);
        let offset = u64::from(window.offset);

        let next = (offset + limit < page.count).then(|| url.with_window(limit, Some(offset + limit)));
        let previous = (offset > 0).then(|| {
            let back = offset.saturating_sub(limit);
            url.with_window(limit, (back > 0).then_some(back))
        });

        ListBody::Paged {
            count: page.count,
            next,
            previous,
            results: page.items,
        }
    }
}

impl PageUrl {
    /// Rewrites `limit` and `offset`, keeping every other pair as sent.
    /// `offset: None` drops the parameter.
    fn with_window(&self, limit: u64, offset: Option<u64>) -> String {
        let mut pairs: Vec<String> = self
            .query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let key = pair.split('=').next().unwrap_or_default();
                key != "limit" && key != "offset"
            })
            .map(str::to_string)
            .collect();
        pairs.push(format!("limit={limit}"));
        if let Some(offset) = offset {
            pairs.push(format!("offset={offset}"));
        }
        format!("{}?{}", self.base, pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(query: &str) -> PageUrl {
        PageUrl {
            base: "http://testserver/goals/goal_comment/list".into(),
            query: Some(query.into()),
        }
    }

    fn page(count: u64, items: Vec<u32>) -> Page<u32> {
        Page { count, items }
    }

    #[test]
    fn no_limit_means_plain_array() {
        let body = ListBody::from_page(page(3, vec![1, 2, 3]), &Window::default(), &url(""));
        assert_eq!(serde_json::to_value(body).unwrap(), serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn first_page_links_forward_only() {
        let window = Window {
            limit: Some(2),
            offset: 0,
        };
        let body = ListBody::from_page(page(5, vec![1, 2]), &window, &url("goal=abc&limit=2"));

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({
                "count": 5,
                "next": "http://testserver/goals/goal_comment/list?goal=abc&limit=2&offset=2",
                "previous": null,
                "results": [1, 2],
            })
        );
    }

    #[test]
    fn middle_page_links_both_ways() {
        let window = Window {
            limit: Some(2),
            offset: 2,
        };
        let ListBody::Paged { next, previous, .. } =
            ListBody::from_page(page(5, vec![3, 4]), &window, &url("limit=2&offset=2"))
        else {
            panic!("expected a paged body");
        };
        assert_eq!(
            next.as_deref(),
            Some("http://testserver/goals/goal_comment/list?limit=2&offset=4")
        );
        assert_eq!(
            previous.as_deref(),
            Some("http://testserver/goals/goal_comment/list?limit=2")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let window = Window {
            limit: Some(2),
            offset: 4,
        };
        let ListBody::Paged { next, previous, .. } =
            ListBody::from_page(page(5, vec![5]), &window, &url("limit=2&offset=4"))
        else {
            panic!("expected a paged body");
        };
        assert_eq!(next, None);
        assert!(previous.is_some_and(|link| link.ends_with("limit=2&offset=2")));
    }
}

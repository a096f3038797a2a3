//! # Handlers
//!
//! One module per resource. Handlers only translate HTTP into service calls;
//! scoping, permission checks and validation live in `services`.

pub mod accounts;
pub mod boards;
pub mod categories;
pub mod comments;
pub mod goals;
pub mod health;

use axum::http::{header::HOST, HeaderMap, Uri};
use axum::Json;
use uuid::Uuid;

use domains::{DomainError, Page, Window};

use crate::error::ApiResult;
use crate::pagination::{ListBody, PageUrl};

/// Path ids that are not UUIDs cannot match any row.
pub(crate) fn parse_id(entity: &'static str, raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| DomainError::not_found(entity, raw).into())
}

pub(crate) fn page_url(uri: &Uri, headers: &HeaderMap) -> PageUrl {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()));
    let base = match host {
        Some(host) => format!("http://{host}{}", uri.path()),
        None => uri.path().to_string(),
    };
    PageUrl {
        base,
        query: uri.query().map(str::to_string),
    }
}

pub(crate) fn list_body<T>(
    page: Page<T>,
    window: &Window,
    uri: &Uri,
    headers: &HeaderMap,
) -> Json<ListBody<T>> {
    Json(ListBody::from_page(page, window, &page_url(uri, headers)))
}

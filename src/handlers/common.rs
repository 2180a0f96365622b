use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::LINK, HeaderMap, HeaderName, HeaderValue, Uri},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use url::form_urlencoded;

use crate::config::AppConfig;
use crate::db::{Criteria, Page, Pageable};
use crate::errors::ServiceError;

pub const DEFAULT_APPLICATION_NAME: &str = "storeApp";
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

static APPLICATION_NAME: OnceLock<String> = OnceLock::new();

/// Application name used in alert and error headers. The first call wins;
/// later calls are ignored.
pub fn set_application_name(name: &str) {
    let _ = APPLICATION_NAME.set(name.to_string());
}

pub fn application_name() -> &'static str {
    APPLICATION_NAME
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_APPLICATION_NAME)
}

/// Outcome of a successful mutation, announced through alert headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityAction {
    Created,
    Updated,
    Deleted,
}

/// `X-<app>-alert: <app>.<entity>.<action>` and `X-<app>-params: <param>`
pub fn entity_alert_headers(entity: &str, action: EntityAction, param: &str) -> HeaderMap {
    let app = application_name();
    let mut headers = HeaderMap::new();
    insert_header(
        &mut headers,
        format!("x-{}-alert", app.to_ascii_lowercase()),
        &format!("{app}.{entity}.{action}"),
    );
    insert_header(
        &mut headers,
        format!("x-{}-params", app.to_ascii_lowercase()),
        param,
    );
    headers
}

fn insert_header(headers: &mut HeaderMap, name: String, value: &str) {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::from_str(value)) {
        headers.insert(name, value);
    }
}

/// Paging and filtering read off a list request's query string
#[derive(Debug, Clone)]
pub struct ListParams {
    pub pageable: Pageable,
    pub criteria: Option<Criteria>,
}

impl ListParams {
    pub fn from_query(raw: Option<&str>, config: &AppConfig) -> Result<Self, ServiceError> {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
        let borrowed = || pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()));

        let pageable = Pageable::from_query_pairs(
            borrowed(),
            u64::from(config.api_default_page_size),
            u64::from(config.api_max_page_size),
        )?;
        let criteria = Criteria::from_query_pairs(borrowed())?;
        Ok(Self { pageable, criteria })
    }
}

/// `X-Total-Count` plus an RFC 5988 `Link` header with next/prev/last/first
/// relations. Other query parameters of `uri` are carried into each link.
pub fn pagination_headers<T>(uri: &Uri, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(TOTAL_COUNT_HEADER), HeaderValue::from(page.total));

    let last = page.total_pages().saturating_sub(1);
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(page_link(uri, page.page.saturating_add(1), page.size, "next"));
    }
    if page.has_previous() {
        links.push(page_link(uri, page.page.saturating_sub(1), page.size, "prev"));
    }
    links.push(page_link(uri, last, page.size, "last"));
    links.push(page_link(uri, 0, page.size, "first"));

    if let Ok(value) = HeaderValue::from_str(&links.join(",")) {
        headers.insert(LINK, value);
    }
    headers
}

fn page_link(uri: &Uri, page: u64, size: u64, rel: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
        if key != "page" && key != "size" {
            query.append_pair(&key, &value);
        }
    }
    query
        .append_pair("page", &page.to_string())
        .append_pair("size", &size.to_string());
    format!("<{}?{}>; rel=\"{}\"", uri.path(), query.finish(), rel)
}

/// JSON request body. Accepts any `application/*+json` media type (so
/// `application/merge-patch+json` too) and reports unreadable bodies as
/// bad requests.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

/// Rejects a path id that disagrees with the body id
pub fn check_path_matches_body(
    entity: &str,
    path_id: i64,
    body_id: Option<i64>,
) -> Result<i64, ServiceError> {
    let Some(body_id) = body_id else {
        return Err(ServiceError::bad_request_alert("Invalid id", entity, "idnull"));
    };
    if body_id != path_id {
        return Err(ServiceError::bad_request_alert("Invalid ID", entity, "idinvalid"));
    }
    Ok(body_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SortOrder;
    use axum::http::{header::CONTENT_TYPE, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[test]
    fn alert_headers_use_application_name() {
        let headers = entity_alert_headers("shipment", EntityAction::Created, "7");
        assert_eq!(
            headers.get("x-storeapp-alert").unwrap(),
            "storeApp.shipment.created"
        );
        assert_eq!(headers.get("x-storeapp-params").unwrap(), "7");
    }

    #[test]
    fn list_params_split_paging_and_filters() {
        let config = AppConfig::new("sqlite::memory:".into(), "127.0.0.1".into(), 0, "test".into());
        let params = ListParams::from_query(
            Some("page=1&size=2&sort=date%2Cdesc&trackingCode.contains=AB&details.specified=true"),
            &config,
        )
        .unwrap();
        assert_eq!(params.pageable.page, 1);
        assert_eq!(params.pageable.size, 2);
        assert_eq!(params.pageable.sort, vec![SortOrder::desc("date")]);
        assert!(matches!(params.criteria, Some(Criteria::All(ref items)) if items.len() == 2));

        let empty = ListParams::from_query(None, &config).unwrap();
        assert!(empty.criteria.is_none());
        assert_eq!(empty.pageable.size, u64::from(config.api_default_page_size));
    }

    #[test]
    fn unknown_operator_is_a_bad_request() {
        let config = AppConfig::new("sqlite::memory:".into(), "127.0.0.1".into(), 0, "test".into());
        let err = ListParams::from_query(Some("id.near=3"), &config).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn link_header_lists_neighbours() {
        let uri: Uri = "/api/shipments?page=1&size=2&id.greaterThan=0".parse().unwrap();
        let page = Page::new(vec![(), ()], &Pageable::of(1, 2), 5);
        let headers = pagination_headers(&uri, &page);

        assert_eq!(headers.get(TOTAL_COUNT_HEADER).unwrap(), "5");
        let link = headers.get(LINK).unwrap().to_str().unwrap();
        assert!(link.contains(r#"</api/shipments?id.greaterThan=0&page=2&size=2>; rel="next""#), "{link}");
        assert!(link.contains(r#"page=0&size=2>; rel="prev""#), "{link}");
        assert!(link.contains(r#"page=2&size=2>; rel="last""#), "{link}");
        assert!(link.contains(r#"page=0&size=2>; rel="first""#), "{link}");
    }

    #[test]
    fn empty_result_links_to_first_page_only() {
        let uri: Uri = "/api/invoices".parse().unwrap();
        let page: Page<()> = Page::new(Vec::new(), &Pageable::of(0, 20), 0);
        let link = pagination_headers(&uri, &page)
            .get(LINK)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(!link.contains("next"));
        assert!(!link.contains("prev"));
        assert!(link.contains(r#"</api/invoices?page=0&size=20>; rel="last""#));
    }

    #[test]
    fn path_and_body_ids_must_agree() {
        assert_eq!(check_path_matches_body("invoice", 3, Some(3)).unwrap(), 3);
        let err = check_path_matches_body("invoice", 3, None).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequestAlert { ref error_key, .. } if error_key == "idnull"));
        let err = check_path_matches_body("invoice", 3, Some(4)).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequestAlert { ref error_key, .. } if error_key == "idinvalid"));
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
    }

    #[tokio::test]
    async fn merge_patch_bodies_are_accepted() {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/merge-patch+json")
            .body(axum::body::Body::from(r#"{"name":"x"}"#))
            .unwrap();
        let JsonBody(probe) = JsonBody::<Probe>::from_request(request, &()).await.unwrap();
        assert_eq!(probe.name, "x");
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{"))
            .unwrap();
        let err = JsonBody::<Probe>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}

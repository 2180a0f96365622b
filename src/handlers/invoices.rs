use axum::{
    extract::{Path, RawQuery, State},
    http::{header::LOCATION, HeaderValue, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::debug;
use validator::Validate;

use super::common::{
    check_path_matches_body, entity_alert_headers, pagination_headers, EntityAction, JsonBody,
    ListParams,
};
use crate::{
    errors::{ErrorResponse, ServiceError},
    handlers::AppState,
    models::{Invoice, Shipment},
};

const ENTITY_NAME: &str = "invoice";

pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route("/api/invoices/count", get(count_invoices))
        .route("/api/invoices/:id/shipments", get(get_invoice_shipments))
        .route(
            "/api/invoices/:id",
            get(get_invoice)
                .put(update_invoice)
                .patch(partial_update_invoice)
                .delete(delete_invoice),
        )
}

/// Creates an invoice
#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = Invoice,
    responses(
        (status = 201, description = "Invoice created", body = Invoice),
        (status = 400, description = "Id present or invalid body", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    JsonBody(invoice): JsonBody<Invoice>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to save Invoice : {:?}", invoice);
    invoice.validate()?;
    if invoice.id.is_some() {
        return Err(ServiceError::bad_request_alert(
            "A new invoice cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let saved = state.services.invoices.save(invoice).await?;
    let id = saved.id.map(|id| id.to_string()).unwrap_or_default();
    let mut headers = entity_alert_headers(ENTITY_NAME, EntityAction::Created, &id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/invoices/{id}")) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(saved)))
}

/// Replaces a invoice
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    params(("id" = i64, Path, description = "Invoice id")),
    request_body = Invoice,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 400, description = "Id missing, mismatched or unknown", body = ErrorResponse),
        (status = 409, description = "Invoice removed concurrently", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(invoice): JsonBody<Invoice>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to update Invoice : {}, {:?}", id, invoice);
    invoice.validate()?;
    check_path_matches_body(ENTITY_NAME, id, invoice.id)?;
    if !state.services.invoices.exists(id).await? {
        return Err(ServiceError::bad_request_alert(
            "Entity not found",
            ENTITY_NAME,
            "idnotfound",
        ));
    }

    let saved = state.services.invoices.update(invoice).await?;
    Ok((
        entity_alert_headers(ENTITY_NAME, EntityAction::Updated, &id.to_string()),
        Json(saved),
    ))
}

/// Updates the fields present in the body, leaving the others untouched
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}",
    params(("id" = i64, Path, description = "Invoice id")),
    request_body(content = Invoice, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Invoice updated", body = Invoice),
        (status = 400, description = "Id missing, mismatched or unknown", body = ErrorResponse),
        (status = 404, description = "Invoice removed concurrently", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn partial_update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(invoice): JsonBody<Invoice>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to partially update Invoice : {}, {:?}", id, invoice);
    check_path_matches_body(ENTITY_NAME, id, invoice.id)?;
    if !state.services.invoices.exists(id).await? {
        return Err(ServiceError::bad_request_alert(
            "Entity not found",
            ENTITY_NAME,
            "idnotfound",
        ));
    }

    let saved = state
        .services
        .invoices
        .partial_update(invoice)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Invoice {id} not found")))?;
    Ok((
        entity_alert_headers(ENTITY_NAME, EntityAction::Updated, &id.to_string()),
        Json(saved),
    ))
}

/// Lists invoices one page at a time. Filters take the form
/// `<field>.<operator>=<value>`.
#[utoipa::path(
    get,
    path = "/api/invoices",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "property(,asc|desc)")
    ),
    responses(
        (status = 200, description = "Invoices listed", body = Vec<Invoice>),
        (status = 400, description = "Unknown filter or sort field", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get a page of Invoices");
    let params = ListParams::from_query(query.as_deref(), &state.config)?;
    let service = &state.services.invoices;
    let page = match params.criteria.as_ref() {
        Some(criteria) => {
            service
                .find_all_by_criteria(&params.pageable, Some(criteria))
                .await?
        }
        None => service.find_all(&params.pageable).await?,
    };
    Ok((pagination_headers(&uri, &page), Json(page.content)))
}

/// Number of invoices matching the filters
#[utoipa::path(
    get,
    path = "/api/invoices/count",
    responses(
        (status = 200, description = "Matching invoice count", body = u64),
        (status = 400, description = "Unknown filter field", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn count_invoices(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<u64>, ServiceError> {
    debug!("REST request to count Invoices by criteria");
    let params = ListParams::from_query(query.as_deref(), &state.config)?;
    let service = &state.services.invoices;
    let count = match params.criteria.as_ref() {
        Some(criteria) => service.count_by(Some(criteria)).await?,
        None => service.count_all().await?,
    };
    Ok(Json(count))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = i64, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice found", body = Invoice),
        (status = 404, description = "Invoice not found", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Invoice>, ServiceError> {
    debug!("REST request to get Invoice : {}", id);
    state
        .services
        .invoices
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Invoice {id} not found")))
}

/// Shipments pointing at the invoice
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/shipments",
    params(("id" = i64, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Shipments of the invoice", body = Vec<Shipment>),
        (status = 404, description = "Invoice not found", body = ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice_shipments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Shipment>>, ServiceError> {
    debug!("REST request to get Shipments of Invoice : {}", id);
    state.services.invoices.shipments(id).await.map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    params(("id" = i64, Path, description = "Invoice id")),
    responses((status = 204, description = "Invoice deleted")),
    tag = "invoices"
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to delete Invoice : {}", id);
    state.services.invoices.delete(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        entity_alert_headers(ENTITY_NAME, EntityAction::Deleted, &id.to_string()),
    ))
}

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
    models::Shipment,
};

const ENTITY_NAME: &str = "shipment";

pub fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/shipments", get(list_shipments).post(create_shipment))
        .route("/api/shipments/count", get(count_shipments))
        .route(
            "/api/shipments/:id",
            get(get_shipment)
                .put(update_shipment)
                .patch(partial_update_shipment)
                .delete(delete_shipment),
        )
}

/// Creates a shipment
#[utoipa::path(
    post,
    path = "/api/shipments",
    request_body = Shipment,
    responses(
        (status = 201, description = "Shipment created", body = Shipment),
        (status = 400, description = "Id present or invalid body", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    JsonBody(shipment): JsonBody<Shipment>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to save Shipment : {:?}", shipment);
    shipment.validate()?;
    if shipment.id.is_some() {
        return Err(ServiceError::bad_request_alert(
            "A new shipment cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let saved = state.services.shipments.save(shipment).await?;
    let id = saved.id.map(|id| id.to_string()).unwrap_or_default();
    let mut headers = entity_alert_headers(ENTITY_NAME, EntityAction::Created, &id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/shipments/{id}")) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(saved)))
}

/// Replaces a shipment
#[utoipa::path(
    put,
    path = "/api/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body = Shipment,
    responses(
        (status = 200, description = "Shipment updated", body = Shipment),
        (status = 400, description = "Id missing, mismatched or unknown", body = ErrorResponse),
        (status = 409, description = "Shipment removed concurrently", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(shipment): JsonBody<Shipment>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to update Shipment : {}, {:?}", id, shipment);
    shipment.validate()?;
    check_path_matches_body(ENTITY_NAME, id, shipment.id)?;
    if !state.services.shipments.exists(id).await? {
        return Err(ServiceError::bad_request_alert(
            "Entity not found",
            ENTITY_NAME,
            "idnotfound",
        ));
    }

    let saved = state.services.shipments.update(shipment).await?;
    Ok((
        entity_alert_headers(ENTITY_NAME, EntityAction::Updated, &id.to_string()),
        Json(saved),
    ))
}

/// Updates the fields present in the body, leaving the others untouched
#[utoipa::path(
    patch,
    path = "/api/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    request_body(content = Shipment, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Shipment updated", body = Shipment),
        (status = 400, description = "Id missing, mismatched or unknown", body = ErrorResponse),
        (status = 404, description = "Shipment removed concurrently", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn partial_update_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(shipment): JsonBody<Shipment>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to partially update Shipment : {}, {:?}", id, shipment);
    check_path_matches_body(ENTITY_NAME, id, shipment.id)?;
    if !state.services.shipments.exists(id).await? {
        return Err(ServiceError::bad_request_alert(
            "Entity not found",
            ENTITY_NAME,
            "idnotfound",
        ));
    }

    let saved = state
        .services
        .shipments
        .partial_update(shipment)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Shipment {id} not found")))?;
    Ok((
        entity_alert_headers(ENTITY_NAME, EntityAction::Updated, &id.to_string()),
        Json(saved),
    ))
}

/// Lists shipments one page at a time. Filters take the form
/// `<field>.<operator>=<value>`.
#[utoipa::path(
    get,
    path = "/api/shipments",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "property(,asc|desc)")
    ),
    responses(
        (status = 200, description = "Shipments listed", body = Vec<Shipment>),
        (status = 400, description = "Unknown filter or sort field", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get a page of Shipments");
    let params = ListParams::from_query(query.as_deref(), &state.config)?;
    let service = &state.services.shipments;
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

/// Number of shipments matching the filters
#[utoipa::path(
    get,
    path = "/api/shipments/count",
    responses(
        (status = 200, description = "Matching shipment count", body = u64),
        (status = 400, description = "Unknown filter field", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn count_shipments(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<u64>, ServiceError> {
    debug!("REST request to count Shipments by criteria");
    let params = ListParams::from_query(query.as_deref(), &state.config)?;
    let service = &state.services.shipments;
    let count = match params.criteria.as_ref() {
        Some(criteria) => service.count_by(Some(criteria)).await?,
        None => service.count_all().await?,
    };
    Ok(Json(count))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment found", body = Shipment),
        (status = 404, description = "Shipment not found", body = ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Shipment>, ServiceError> {
    debug!("REST request to get Shipment : {}", id);
    state
        .services
        .shipments
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Shipment {id} not found")))
}

#[utoipa::path(
    delete,
    path = "/api/shipments/{id}",
    params(("id" = i64, Path, description = "Shipment id")),
    responses((status = 204, description = "Shipment deleted")),
    tag = "shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to delete Shipment : {}", id);
    state.services.shipments.delete(id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        entity_alert_headers(ENTITY_NAME, EntityAction::Deleted, &id.to_string()),
    ))
}

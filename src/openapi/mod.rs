use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::handlers::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Store API",
        version = "1.0.0",
        description = r#"
Invoices and the shipments that fulfil them.

## Pagination

List endpoints take `page` (zero-based), `size` and repeated `sort=property,asc|desc`
parameters. The total number of matches is returned in `X-Total-Count` and the
neighbouring pages in a `Link` header.

## Filtering

Any `<property>.<operator>=<value>` parameter filters the list. Operators: `equals`,
`notEquals`, `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual`,
`contains`, `in` (comma separated values) and `specified` (`true` or `false`).

## Errors

Failures return an `ErrorResponse`. Rejected ids and validation failures carry an
`errorKey`, repeated in the `X-<app>-error` header.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "invoices", description = "Invoice endpoints"),
        (name = "shipments", description = "Shipment endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Invoices
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::partial_update_invoice,
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::count_invoices,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::get_invoice_shipments,
        crate::handlers::invoices::delete_invoice,

        // Shipments
        crate::handlers::shipments::create_shipment,
        crate::handlers::shipments::update_shipment,
        crate::handlers::shipments::partial_update_shipment,
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::count_shipments,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::delete_shipment,

        // Health
        crate::handlers::health::health_check
    ),
    components(
        schemas(
            crate::models::Invoice,
            crate::models::Shipment,
            crate::models::ProductOrder,
            crate::models::InvoiceStatus,
            crate::models::PaymentMethod,
            crate::models::OrderStatus,
            crate::handlers::health::HealthResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn openapi_routes() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

mod common;

use axum::http::{Method, StatusCode};
use common::{shipment_json, TestApp};
use serde_json::json;
use store_api::models::Shipment;

#[tokio::test]
async fn create_shipment_assigns_id_and_announces_it() {
    let app = TestApp::new().await;

    let response = app.post("/api/shipments", shipment_json()).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    let id = response.body["id"].as_i64().expect("id assigned");
    assert_eq!(
        response.header("location"),
        Some(format!("/api/shipments/{id}").as_str())
    );
    assert_eq!(
        response.header("x-storeapp-alert"),
        Some("storeApp.shipment.created")
    );
    assert_eq!(response.header("x-storeapp-params"), Some(id.to_string().as_str()));

    let fetched = app.get(&format!("/api/shipments/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["trackingCode"], "AAAAAAAAAA");
    assert_eq!(fetched.body["date"], "1970-01-01T00:00:00Z");
    assert_eq!(fetched.body["details"], "AAAAAAAAAA");
    assert!(fetched.body["invoice"].is_null());
}

#[tokio::test]
async fn create_shipment_with_existing_id_is_rejected() {
    let app = TestApp::new().await;

    let mut body = shipment_json();
    body["id"] = json!(1);
    let response = app.post("/api/shipments", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.header("x-storeapp-error"), Some("error.idexists"));
    assert_eq!(response.body["errorKey"], "idexists");
    assert_eq!(response.body["entityName"], "shipment");

    let count = app.get("/api/shipments/count").await;
    assert_eq!(count.body, json!(0));
}

#[tokio::test]
async fn date_is_required() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/shipments", json!({ "trackingCode": "AAAAAAAAAA" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let count = app.get("/api/shipments/count").await;
    assert_eq!(count.body, json!(0));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .post("/api/shipments", json!({ "date": "yesterday" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_shipment_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get(&format!("/api/shipments/{}", i64::MAX)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["requestId"].is_string());
}

#[tokio::test]
async fn list_is_paged_with_total_and_links() {
    let app = TestApp::new().await;
    for code in ["A1", "A2", "A3"] {
        let mut body = shipment_json();
        body["trackingCode"] = json!(code);
        app.create_shipment(body).await;
    }

    let response = app.get("/api/shipments?page=0&size=2&sort=id,desc").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-total-count"), Some("3"));

    let items = response.body.as_array().expect("array body");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["trackingCode"], "A3");
    assert_eq!(items[1]["trackingCode"], "A2");

    let link = response.header("link").expect("link header");
    assert!(link.contains(r#"</api/shipments?sort=id%2Cdesc&page=1&size=2>; rel="next""#), "{link}");
    assert!(link.contains(r#"rel="last""#));
    assert!(!link.contains(r#"rel="prev""#));
}

#[tokio::test]
async fn page_beyond_addressable_range_is_rejected() {
    let app = TestApp::new().await;
    app.create_shipment(shipment_json()).await;

    for page in ["1000000000000000000", "18446744073709551615"] {
        let response = app.get(&format!("/api/shipments?page={page}")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "page={page}");
    }

    let response = app.get("/api/shipments?page=1000000&size=5").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
    assert_eq!(response.header("x-total-count"), Some("1"));
    let link = response.header("link").expect("link header");
    assert!(link.contains(r#"page=999999&size=5>; rel="prev""#), "{link}");
}

#[tokio::test]
async fn list_filters_by_criteria() {
    let app = TestApp::new().await;
    let first = app.create_shipment(shipment_json()).await;
    let mut other = shipment_json();
    other["trackingCode"] = json!("BBBBBBBBBB");
    other["details"] = json!(null);
    app.create_shipment(other).await;

    let by_code = app.get("/api/shipments?trackingCode.equals=AAAAAAAAAA").await;
    let items = by_code.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], json!(first));

    let by_details = app.get("/api/shipments?details.specified=false").await;
    let items = by_details.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["trackingCode"], "BBBBBBBBBB");

    let contains = app.get("/api/shipments?trackingCode.contains=BBB").await;
    assert_eq!(contains.header("x-total-count"), Some("1"));

    let none = app
        .get(&format!("/api/shipments?id.greaterThan={first}&trackingCode.equals=AAAAAAAAAA"))
        .await;
    assert_eq!(none.body, json!([]));
    assert_eq!(none.header("x-total-count"), Some("0"));

    let counted = app.get("/api/shipments/count?trackingCode.in=AAAAAAAAAA,BBBBBBBBBB").await;
    assert_eq!(counted.body, json!(2));
}

#[tokio::test]
async fn unknown_filter_or_sort_field_is_rejected() {
    let app = TestApp::new().await;
    let response = app.get("/api/shipments?color.equals=red").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/api/shipments?sort=color,asc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/api/shipments?id.equals=abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_replaces_every_field() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;

    let response = app
        .put(
            &format!("/api/shipments/{id}"),
            json!({
                "id": id,
                "trackingCode": "BBBBBBBBBB",
                "date": "2024-01-02T03:04:05Z"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(
        response.header("x-storeapp-alert"),
        Some("storeApp.shipment.updated")
    );

    let fetched = app.get(&format!("/api/shipments/{id}")).await;
    assert_eq!(fetched.body["trackingCode"], "BBBBBBBBBB");
    assert_eq!(fetched.body["date"], "2024-01-02T03:04:05Z");
    assert!(fetched.body["details"].is_null());
}

#[tokio::test]
async fn put_checks_ids() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;

    let missing = app.put(&format!("/api/shipments/{id}"), shipment_json()).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["errorKey"], "idnull");

    let mut body = shipment_json();
    body["id"] = json!(id + 1);
    let mismatched = app.put(&format!("/api/shipments/{id}"), body).await;
    assert_eq!(mismatched.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatched.body["errorKey"], "idinvalid");

    let unknown = id + 100;
    let mut body = shipment_json();
    body["id"] = json!(unknown);
    let not_found = app.put(&format!("/api/shipments/{unknown}"), body).await;
    assert_eq!(not_found.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_found.body["errorKey"], "idnotfound");
}

#[tokio::test]
async fn put_and_patch_on_collection_are_not_allowed() {
    let app = TestApp::new().await;
    let response = app.put("/api/shipments", shipment_json()).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);

    let response = app.patch("/api/shipments", shipment_json()).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn patch_updates_only_present_fields() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;

    let response = app
        .patch(
            &format!("/api/shipments/{id}"),
            json!({ "id": id, "details": "BBBBBBBBBB" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["details"], "BBBBBBBBBB");
    assert_eq!(response.body["trackingCode"], "AAAAAAAAAA");
    assert_eq!(response.body["date"], "1970-01-01T00:00:00Z");

    let fetched = app.get(&format!("/api/shipments/{id}")).await;
    assert_eq!(fetched.body["details"], "BBBBBBBBBB");
    assert_eq!(fetched.body["trackingCode"], "AAAAAAAAAA");
}

#[tokio::test]
async fn patch_with_plain_json_and_unknown_id() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({ "id": id, "trackingCode": "CCCCCCCCCC" })),
            "application/json",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["trackingCode"], "CCCCCCCCCC");

    let unknown = id + 100;
    let response = app
        .patch(
            &format!("/api/shipments/{unknown}"),
            json!({ "id": unknown, "details": "x" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errorKey"], "idnotfound");
}

#[tokio::test]
async fn patch_of_a_vanished_shipment_finds_nothing() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;
    let service = app.state.shipment_service();
    service.delete(id).await.unwrap();

    let mut patch = Shipment::default().with_details("late");
    patch.id = Some(id);
    assert!(service.partial_update(patch).await.unwrap().is_none());

    let response = app
        .patch(&format!("/api/shipments/{id}"), json!({ "id": id, "details": "late" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errorKey"], "idnotfound");
}

#[tokio::test]
async fn delete_removes_the_shipment() {
    let app = TestApp::new().await;
    let id = app.create_shipment(shipment_json()).await;

    let response = app.delete(&format!("/api/shipments/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        response.header("x-storeapp-alert"),
        Some("storeApp.shipment.deleted")
    );

    let fetched = app.get(&format!("/api/shipments/{id}")).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shipment_carries_its_invoice() {
    let app = TestApp::new().await;
    let invoice_id = app.create_invoice(common::invoice_json()).await;

    let mut body = shipment_json();
    body["invoice"] = json!({ "id": invoice_id });
    let id = app.create_shipment(body).await;
    app.create_shipment(shipment_json()).await;

    let fetched = app.get(&format!("/api/shipments/{id}")).await;
    assert_eq!(fetched.body["invoice"]["id"], json!(invoice_id));
    assert_eq!(fetched.body["invoice"]["status"], "PAID");
    assert_eq!(fetched.body["invoice"]["paymentAmount"], "1");

    let by_invoice = app
        .get(&format!("/api/shipments?invoiceId.equals={invoice_id}"))
        .await;
    assert_eq!(by_invoice.header("x-total-count"), Some("1"));

    let unattached = app.get("/api/shipments?invoiceId.specified=false").await;
    assert_eq!(unattached.header("x-total-count"), Some("1"));
}

#[tokio::test]
async fn responses_echo_the_request_id() {
    let app = TestApp::new().await;
    let response = app.get("/api/shipments").await;
    assert!(response.header("x-request-id").is_some());
}

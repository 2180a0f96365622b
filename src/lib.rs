//! Store API library
//!
//! Invoice and shipment REST resources over a sea-orm data layer. Reads go
//! through a small query builder that joins each record's association and
//! maps prefixed columns back into domain records.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::http::HeaderValue;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::errors::ServiceError;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Builds the services over `db` and publishes the configured
    /// application name to the header helpers.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        handlers::common::set_application_name(&config.application_name);
        Self {
            services: handlers::AppServices::new(db.clone()),
            db,
            config,
        }
    }

    pub fn invoice_service(&self) -> Arc<services::InvoiceService> {
        self.services.invoices.clone()
    }

    pub fn shipment_service(&self) -> Arc<services::ShipmentService> {
        self.services.shipments.clone()
    }
}

/// Explicit origins when configured, otherwise permissive CORS where the
/// configuration allows it.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        ))
    }
}

/// Full application router: resources, health, the OpenAPI document and
/// the request-id/tracing/compression/CORS layers.
pub fn app_router(state: AppState) -> Result<Router, ServiceError> {
    let cors = cors_layer(&state.config)?;

    Ok(Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::invoices::invoice_routes())
        .merge(handlers::shipments::shipment_routes())
        .merge(openapi::openapi_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}

//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, warn};

use crate::compliance::ComplianceError;
use crate::domain::{
    Address, LOCATION_FIELDS, Location, SearchCriteria, VINOSHIPPER_FIELDS, field_text,
    missing_fields,
};
use crate::lookup::LookupError;
use crate::sync::SyncError;
use crate::webhook::{VinoshipperOrderEvent, WebhookError};

use super::dto::*;
use super::state::AppState;

const CORS_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

const ACCESS_POINT_FIELDS: [&str; 5] = ["street1", "city", "stateCode", "postalCode", "phoneNumber"];

/// Create the application router.
///
/// Every response carries the CORS headers, errors included.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/locations", post(find_locations).options(preflight))
        .route(
            "/locations/vinoshipper",
            post(find_access_points).options(preflight),
        )
        .route("/compliance", post(check_compliance).options(preflight))
        .route(
            "/shopify/webhook/order",
            post(shopify_order_webhook).options(preflight),
        )
        .route(
            "/vinoshipper/webhook/order",
            post(vinoshipper_order_webhook).options(preflight),
        )
        .route("/sync/products", post(sync_products).options(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn is_blank(body: &Bytes) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Parse a required JSON body.
fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    if is_blank(body) {
        return Err(AppError::BadRequest {
            message: "Request body is required".to_string(),
        });
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected unparseable request body");
        AppError::BadRequest {
            message: "Invalid JSON in request body".to_string(),
        }
    })
}

/// Parse a webhook body, reading a blank one as `{}`.
fn parse_webhook_body(body: &Bytes) -> Result<Value, AppError> {
    if is_blank(body) {
        return Ok(json!({}));
    }
    parse_body(body)
}

/// Find UPS drop-off locations near an address.
async fn find_locations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LocationsResponse<Location>>, AppError> {
    let body = parse_body(&body)?;

    let address = Address::from_body(&body, LOCATION_FIELDS).map_err(LookupError::from)?;
    let criteria = SearchCriteria::merged(body.get("searchCriteria")).map_err(LookupError::from)?;

    let outcome = state.locations.lookup(&address, &criteria).await?;
    Ok(Json(outcome.into()))
}

/// Find Vinoshipper access points near an address.
async fn find_access_points(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LocationsResponse<Value>>, AppError> {
    let body = parse_body(&body)?;

    let missing = missing_fields(&body, &ACCESS_POINT_FIELDS);
    if !missing.is_empty() {
        return Err(LookupError::Validation {
            missing_fields: missing,
        }
        .into());
    }

    let address = Address::from_body(&body, VINOSHIPPER_FIELDS).map_err(LookupError::from)?;
    let phone_number = field_text(&body, "phoneNumber").unwrap_or_default();

    let outcome = state.access_points.lookup(&address, &phone_number).await?;
    Ok(Json(outcome.into()))
}

/// Check whether an order may ship to an address.
async fn check_compliance(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body = parse_body(&body)?;
    let outcome = state.compliance.check(&body).await?;

    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(outcome.body)).into_response())
}

/// Receive a Shopify order webhook.
async fn shopify_order_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let topic = headers.get("x-shopify-topic").and_then(|v| v.to_str().ok());
    let body = parse_webhook_body(&body)?;

    state
        .shopify_orders
        .handle(topic, body)
        .await
        .map(Json)
        .map_err(AppError::ShopifyWebhook)
}

/// Receive a Vinoshipper order status webhook.
async fn vinoshipper_order_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let body = parse_webhook_body(&body)?;

    let event = VinoshipperOrderEvent::from_body(&body).map_err(AppError::VinoshipperWebhook)?;
    let result = state
        .vinoshipper_orders
        .process(&event)
        .await
        .map_err(AppError::VinoshipperWebhook)?;

    let mut response = MessageResponse::new("Webhook processed successfully");
    response.result = Some(serde_json::to_value(&result).map_err(AppError::internal)?);
    Ok(Json(response))
}

/// Run a product sync pass.
async fn sync_products(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    let report = state.product_sync.run().await.map_err(AppError::Sync)?;

    let mut response = MessageResponse::new("Product synchronization completed successfully");
    response.report = Some(serde_json::to_value(&report).map_err(AppError::internal)?);
    Ok(Json(response))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Lookup(LookupError),
    Compliance(ComplianceError),
    ShopifyWebhook(WebhookError),
    VinoshipperWebhook(WebhookError),
    Sync(SyncError),
    Internal { message: String },
}

impl AppError {
    fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        AppError::Lookup(e)
    }
}

impl From<ComplianceError> for AppError {
    fn from(e: ComplianceError) -> Self {
        AppError::Compliance(e)
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest { message } => {
                warn!(%message, "Bad request");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            AppError::Lookup(e) => {
                if let LookupError::Internal(detail) = &e {
                    error!(%detail, "Lookup failed");
                } else {
                    warn!(error = %e, status = e.status_code(), "Lookup rejected");
                }
                let missing_fields = match &e {
                    LookupError::Validation { missing_fields } => Some(missing_fields.clone()),
                    _ => None,
                };
                let body = ErrorResponse {
                    error: e.to_string(),
                    success: false,
                    missing_fields,
                };
                (status(e.status_code()), Json(body)).into_response()
            }
            AppError::Compliance(e) => {
                let message = match &e {
                    ComplianceError::InvalidInput => e.to_string(),
                    ComplianceError::Upstream(inner) => {
                        error!(error = %inner, "Compliance check failed");
                        "Internal server error".to_string()
                    }
                };
                (status(e.status_code()), Json(ErrorResponse::new(message))).into_response()
            }
            AppError::ShopifyWebhook(WebhookError::UnsupportedTopic(topic)) => {
                let mut body = MessageResponse::new("Unsupported webhook topic");
                body.topic = Some(topic);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::ShopifyWebhook(e) => {
                error!(error = %e, "Error processing webhook");
                let body = MessageResponse::new("Error processing webhook").with_error(e.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::VinoshipperWebhook(e @ WebhookError::MissingFields) => {
                warn!(error = %e, "Vinoshipper webhook missing fields");
                let body = MessageResponse::new("Bad Request").with_error(e.to_string());
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::VinoshipperWebhook(e) => {
                error!(error = %e, "Error processing Vinoshipper webhook");
                let body = MessageResponse::new("Internal Server Error").with_error(e.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::Sync(e) => {
                let body = MessageResponse::new("Failed to sync products").with_error(e.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::Internal { message } => {
                error!(%message, "Internal error");
                let body = ErrorResponse::new("Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

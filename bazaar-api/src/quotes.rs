use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use bazaar_cart::models::CartItem;
use bazaar_core::carrier::ShippingMode;
use bazaar_shipping::groups::{partition, ShippingGroup};
use bazaar_shipping::shop::GroupRates;

use crate::error::{from_rate, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartItem>,
    pub to_pincode: String,
    #[serde(default = "default_mode")]
    pub mode: ShippingMode,
}

fn default_mode() -> ShippingMode {
    ShippingMode::Surface
}

#[derive(Debug, Serialize)]
pub struct GroupQuote {
    #[serde(flatten)]
    pub group: ShippingGroup,
    pub rates: GroupRates,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub groups: Vec<GroupQuote>,
}

/// POST /v1/checkout/quote
/// Partition the cart into per-origin shipping groups and rate-shop each
/// group. A group with no quotable provider is returned as not serviceable
/// rather than failing the whole quote.
pub async fn quote_checkout(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::ValidationError(
            "cannot quote an empty cart".to_string(),
        ));
    }

    let mut groups = Vec::new();
    for group in partition(&payload.items) {
        let rates = state
            .rates
            .rates_for_group(&group, &payload.to_pincode, payload.mode)
            .await
            .map_err(from_rate)?;
        groups.push(GroupQuote { group, rates });
    }

    Ok(Json(QuoteResponse { groups }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkout/quote", post(quote_checkout))
}

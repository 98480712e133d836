use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_cart::models::CartItem;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MergeCartRequest {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct MergeCartResponse {
    pub items: Vec<CartItem>,
}

/// POST /v1/cart/merge
/// Merge the session-local cart into the account cart on sign-in. Always
/// returns a usable cart: on any backend failure the local lines come back
/// unchanged.
pub async fn merge_cart(
    State(state): State<AppState>,
    Json(payload): Json<MergeCartRequest>,
) -> Json<MergeCartResponse> {
    let items = state
        .carts
        .merge_into_account(payload.user_id, payload.items)
        .await;
    Json(MergeCartResponse { items })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/cart/merge", post(merge_cart))
}

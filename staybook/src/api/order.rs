use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::{
    api::{
        MsgBody, SharedState,
        error::ApiError,
        extract::{JsonBody, LoggedinUser, QueryParams},
    },
    filter::FilterBy,
    model::{Msg, NewMsg, Order, OrderDraft, OrderPatch},
};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_orders).post(add_order).put(update_order))
        .route("/{id}", get(get_order_by_id).delete(remove_order))
        .route("/{id}/msg", post(add_order_msg))
        .route("/{id}/msg/{msg_id}", delete(remove_order_msg))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    host_id: Option<String>,
    buyer_id: Option<String>,
}

async fn get_orders(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<OrderParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    debug!(?params, "Getting orders");

    let filter_by = FilterBy {
        host_id: Some(params.host_id.unwrap_or_default()),
        buyer_id: Some(params.buyer_id.unwrap_or_default()),
        ..Default::default()
    };

    let orders = state.orders.query(&filter_by).await.map_err(ApiError::failed("get orders"))?;

    Ok(Json(orders))
}

async fn get_order_by_id(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .orders
        .get_by_id(&id)
        .await
        .map_err(ApiError::failed("get order"))?
        .map(Json)
        .ok_or(ApiError::NotFound("order"))
}

async fn add_order(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    JsonBody(draft): JsonBody<OrderDraft>,
) -> Result<Json<Order>, ApiError> {
    let order = Order::place(draft, user, Utc::now().timestamp_millis());
    let added = state.orders.add(order).await.map_err(ApiError::failed("add order"))?;

    state.push.emit_to_user("order-added", &added, &added.host_id);

    Ok(Json(added))
}

async fn update_order(
    State(state): State<SharedState>,
    JsonBody(patch): JsonBody<OrderPatch>,
) -> Result<Json<OrderPatch>, ApiError> {
    let updated = state.orders.update(patch).await.map_err(ApiError::failed("update order"))?;

    if let Some(buyer) = &updated.buyer {
        state.push.emit_to_user("order-updated", &updated, &buyer.id);
    }

    Ok(Json(updated))
}

async fn remove_order(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError> {
    let removed_id = state.orders.remove(&id).await.map_err(ApiError::failed("remove order"))?;

    state.push.broadcast("order-removed", &removed_id, Some(&user.id));

    Ok(Json(removed_id))
}

async fn add_order_msg(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MsgBody>,
) -> Result<Json<Msg>, ApiError> {
    let msg = NewMsg { txt: body.txt, by: user };
    let saved = state.orders.add_msg(&id, msg).await.map_err(ApiError::failed("update order"))?;

    Ok(Json(saved))
}

async fn remove_order_msg(
    State(state): State<SharedState>,
    _user: LoggedinUser,
    Path((id, msg_id)): Path<(String, String)>,
) -> Result<Json<String>, ApiError> {
    let removed_id = state
        .orders
        .remove_msg(&id, &msg_id)
        .await
        .map_err(ApiError::failed("remove order msg"))?;

    Ok(Json(removed_id))
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;
use staybook_core::document::EntityId;

use crate::{
    api::{
        MsgBody, SharedState,
        error::ApiError,
        extract::{JsonBody, LoggedinUser, QueryParams},
    },
    filter::FilterBy,
    model::{Msg, NewMsg, Stay, StayPatch},
};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_stays).post(add_stay).put(update_stay))
        .route("/{id}", get(get_stay_by_id).delete(remove_stay))
        .route("/{id}/msg", post(add_stay_msg))
        .route("/{id}/msg/{msg_id}", delete(remove_stay_msg))
}

/// Raw query string of the stay listing. Everything arrives as text and empty values are
/// treated as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayParams {
    txt: Option<String>,
    label: Option<String>,
    guests: Option<String>,
    user_wishlist: Option<String>,
    page_idx: Option<String>,
}

impl StayParams {
    fn into_filter(self) -> Result<FilterBy, ApiError> {
        Ok(FilterBy {
            txt: self.txt,
            label: self.label,
            guests: parse_number("guests", self.guests)?,
            user_wishlist: self
                .user_wishlist
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            page_idx: parse_number("pageIdx", self.page_idx)?,
            ..Default::default()
        })
    }
}

fn parse_number<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::MalformedRequest(format!("{name} is not a number: {value}"))),
    }
}

async fn get_stays(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<StayParams>,
) -> Result<Json<Vec<Stay>>, ApiError> {
    debug!(?params, "Getting stays");

    let filter_by = params.into_filter()?;
    let stays = state.stays.query(&filter_by).await.map_err(ApiError::failed("get stays"))?;

    Ok(Json(stays))
}

async fn get_stay_by_id(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Stay>, ApiError> {
    state
        .stays
        .get_by_id(&id)
        .await
        .map_err(ApiError::failed("get stay"))?
        .map(Json)
        .ok_or(ApiError::NotFound("stay"))
}

async fn add_stay(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    JsonBody(mut stay): JsonBody<Stay>,
) -> Result<Json<Stay>, ApiError> {
    stay.id = EntityId::new();
    stay.msgs.clear();
    if stay.vendor.is_none() {
        stay.vendor = Some(user.id.clone());
    }

    let added = state.stays.add(stay).await.map_err(ApiError::failed("add stay"))?;

    state.push.broadcast("stay-added", &added, Some(&user.id));

    Ok(Json(added))
}

async fn update_stay(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    JsonBody(patch): JsonBody<StayPatch>,
) -> Result<Json<StayPatch>, ApiError> {
    let updated = state.stays.update(patch).await.map_err(ApiError::failed("update stay"))?;

    state.push.broadcast("stay-updated", &updated, Some(&user.id));

    Ok(Json(updated))
}

async fn remove_stay(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError> {
    let removed_id = state.stays.remove(&id).await.map_err(ApiError::failed("remove stay"))?;

    state.push.broadcast("stay-removed", &removed_id, Some(&user.id));

    Ok(Json(removed_id))
}

async fn add_stay_msg(
    State(state): State<SharedState>,
    LoggedinUser(user): LoggedinUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MsgBody>,
) -> Result<Json<Msg>, ApiError> {
    let msg = NewMsg { txt: body.txt, by: user };
    let saved = state.stays.add_msg(&id, msg).await.map_err(ApiError::failed("update stay"))?;

    Ok(Json(saved))
}

async fn remove_stay_msg(
    State(state): State<SharedState>,
    _user: LoggedinUser,
    Path((id, msg_id)): Path<(String, String)>,
) -> Result<Json<String>, ApiError> {
    let removed_id = state
        .stays
        .remove_msg(&id, &msg_id)
        .await
        .map_err(ApiError::failed("remove stay msg"))?;

    Ok(Json(removed_id))
}

//! Request handlers

use super::error::ApiError;
use super::wire::{ClientPayload, HealthBody, StatsBody};
use super::GatewayState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use bcached_cache::{ErrorCode, PutCondition};
use tracing::debug;

fn parse_payload(body: &[u8]) -> Result<ClientPayload, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "rejected request body");
        ApiError::bad_request(format!("invalid JSON body: {e}"))
    })
}

/// `POST /client/get`
pub async fn get_value(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ClientPayload>, ApiError> {
    let mut payload = parse_payload(&body)?;

    let value = match state.call("get", state.cache.get(&payload.key)).await? {
        Some(value) => value,
        None => return Err(ApiError::not_found(&payload.key)),
    };

    payload.value = match String::from_utf8(value.to_vec()) {
        Ok(text) => text,
        Err(e) => {
            return Err(ApiError::new(
                ErrorCode::DecodeError,
                format!("value of '{}' is not valid UTF-8: {e}", payload.key),
            ))
        }
    };

    debug!(key = %payload.key, value = %payload.value, "GET");
    Ok(Json(payload))
}

/// `POST /client/put`
pub async fn put_value(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ClientPayload>, ApiError> {
    let payload = parse_payload(&body)?;

    let condition = if payload.if_absent {
        if !payload.from_value.is_empty() {
            return Err(ApiError::bad_request(
                "IfAbsent cannot be combined with FromValue",
            ));
        }
        PutCondition::Absent
    } else {
        state
            .empty_expectation
            .resolve(Bytes::from(payload.from_value.clone()))
    };

    state
        .call(
            "put",
            state
                .cache
                .put(&payload.key, payload.value.clone(), condition),
        )
        .await?;

    debug!(key = %payload.key, value = %payload.value, "PUT");
    Ok(Json(payload))
}

/// `GET /health`
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /stats`
pub async fn stats(State(state): State<GatewayState>) -> Result<Json<StatsBody>, ApiError> {
    let stats = state.call("stats", state.cache.stats()).await?;
    Ok(Json(StatsBody {
        hit_rate: stats.hit_rate(),
        shards: state.cache.shard_count(),
        stats,
    }))
}

/// Any path without a route
pub async fn not_found(uri: Uri) -> ApiError {
    debug!(path = %uri.path(), "path not found");
    ApiError::new(
        ErrorCode::UnknownRoute,
        format!("no route for '{}'", uri.path()),
    )
}

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::params::{self, RpcParams};
use crate::error::{AppError, Result};
use crate::service::SpotService;

/// Plain GETs on the RPC endpoint carry no call.
pub async fn forbidden() -> AppError {
    AppError::Forbidden
}

pub async fn dispatch(
    State(service): State<SpotService>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response> {
    let params = RpcParams::parse(query.as_deref(), &body)?;
    let method = params.get(params::METHOD).unwrap_or_default();
    debug!("RPC call: {}", method);

    match method {
        "addSpots" => add_spots(&service, &params).await,
        "getSpots" => get_spots(&service, &params).await,
        "setPrivacy" => set_privacy(&service, &params).await,
        other => Err(AppError::UnsupportedMethod(other.to_string())),
    }
}

async fn add_spots(service: &SpotService, params: &RpcParams) -> Result<Response> {
    let user_id = params.required(params::USER_ID)?;
    let spots = params.spots()?;

    service.add_spots(user_id, &spots).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn get_spots(service: &SpotService, params: &RpcParams) -> Result<Response> {
    let spots = service.get_spots(params.get(params::USER_ID)).await?;
    Ok(Json(spots).into_response())
}

async fn set_privacy(service: &SpotService, params: &RpcParams) -> Result<Response> {
    let user_id = params.required(params::USER_ID)?;
    let privacy: i32 = params.integer(params::PRIVACY)?;

    service.set_privacy(user_id, privacy).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

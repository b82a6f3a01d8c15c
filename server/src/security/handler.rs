//! Security Admin Handlers
//!
//! Operator endpoints over the [`SecurityApi`] trait: event reports, block
//! management, statistics and per-IP status. All routes in this group sit
//! behind the ADMIN role gate.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use serde::Deserialize;
use std::net::IpAddr;

use crate::prelude::*;
use nebulax_core::rate_limit::{
	BlockEntry, EndpointClass, IpStatus, SecurityEvent, SecurityStats, DEFAULT_REPORT_LIMIT,
	DEFAULT_WINDOW_SECS,
};

/// # GET /api/security/events
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
	window_secs: Option<i64>,
	limit: Option<usize>,
}

pub async fn get_events(
	State(app): State<App>,
	Query(query): Query<EventsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<SecurityEvent>>>> {
	let window_secs = query.window_secs.unwrap_or(DEFAULT_WINDOW_SECS);
	if window_secs <= 0 {
		return Err(Error::ValidationError("windowSecs must be positive".into()));
	}
	let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);

	let events = app.security.recent_events(window_secs, limit);
	let count = events.len();
	Ok(Json(ApiResponse::with_pagination(events, 0, count, count)))
}

/// # GET /api/security/blocks
pub async fn get_blocks(State(app): State<App>) -> ApiResult<Json<ApiResponse<Vec<BlockEntry>>>> {
	Ok(Json(ApiResponse::new(app.security.list_blocks())))
}

/// # POST /api/security/blocks
#[derive(Deserialize)]
pub struct BlockReq {
	ip: IpAddr,
	reason: String,
}

pub async fn post_block(
	State(app): State<App>,
	Json(block): Json<BlockReq>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BlockEntry>>)> {
	if block.reason.trim().is_empty() {
		return Err(Error::ValidationError("reason is required".into()));
	}

	let entry = app.security.block_ip(block.ip, block.reason.trim())?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(entry))))
}

/// # DELETE /api/security/blocks/{ip}
pub async fn delete_block(
	State(app): State<App>,
	Path(ip): Path<IpAddr>,
) -> ApiResult<StatusCode> {
	app.security.unblock_ip(ip)?;
	Ok(StatusCode::NO_CONTENT)
}

/// # GET /api/security/stats
pub async fn get_stats(State(app): State<App>) -> ApiResult<Json<ApiResponse<SecurityStats>>> {
	Ok(Json(ApiResponse::new(app.security.stats())))
}

/// # GET /api/security/status/{ip}
#[derive(Deserialize)]
pub struct StatusQuery {
	class: Option<String>,
}

pub async fn get_status(
	State(app): State<App>,
	Path(ip): Path<IpAddr>,
	Query(query): Query<StatusQuery>,
) -> ApiResult<Json<ApiResponse<IpStatus>>> {
	let mut status = app.security.status(ip);

	if let Some(class) = query.class.as_deref() {
		let class = class
			.parse::<EndpointClass>()
			.map_err(|err| Error::ValidationError(err.to_string()))?;
		status.classes.retain(|standing| standing.class == class);
	}

	Ok(Json(ApiResponse::new(status)))
}

// vim: ts=4

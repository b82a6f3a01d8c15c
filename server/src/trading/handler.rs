//! Thin trading endpoints. Orders and withdrawals are validated and
//! acknowledged; execution happens in another service.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prelude::*;
use nebulax_core::extract::Auth;
use nebulax_types::types;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
	Buy,
	Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
	Market,
	Limit,
}

/// # POST /api/trading/order
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReq {
	pub pair: String,
	pub side: OrderSide,
	pub order_type: OrderType,
	pub quantity: f64,
	pub price: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
	pub order_id: Uuid,
	pub pair: String,
	pub side: OrderSide,
	pub status: &'static str,
	pub accepted_at: Timestamp,
}

pub async fn post_order(
	Auth(auth): Auth,
	Json(order): Json<OrderReq>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrderAck>>)> {
	if order.pair.is_empty() {
		return Err(Error::ValidationError("pair is required".into()));
	}
	if !order.quantity.is_finite() || order.quantity <= 0.0 {
		return Err(Error::ValidationError("quantity must be positive".into()));
	}
	if order.order_type == OrderType::Limit && order.price.is_none() {
		return Err(Error::ValidationError("limit orders require a price".into()));
	}

	let ack = OrderAck {
		order_id: Uuid::new_v4(),
		pair: order.pair,
		side: order.side,
		status: "accepted",
		accepted_at: types::now(),
	};
	info!(user_id = %auth.user_id, order_id = %ack.order_id, "Order accepted");

	Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(ack))))
}

/// # POST /api/trading/withdrawal
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReq {
	pub asset: String,
	pub amount: f64,
	pub address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalAck {
	pub withdrawal_id: Uuid,
	pub asset: String,
	pub amount: f64,
	pub status: &'static str,
	pub queued_at: Timestamp,
}

pub async fn post_withdrawal(
	Auth(auth): Auth,
	Json(withdrawal): Json<WithdrawalReq>,
) -> ApiResult<(StatusCode, Json<ApiResponse<WithdrawalAck>>)> {
	if withdrawal.asset.is_empty() {
		return Err(Error::ValidationError("asset is required".into()));
	}
	if !withdrawal.amount.is_finite() || withdrawal.amount <= 0.0 {
		return Err(Error::ValidationError("amount must be positive".into()));
	}
	if withdrawal.address.is_empty() {
		return Err(Error::ValidationError("address is required".into()));
	}

	let ack = WithdrawalAck {
		withdrawal_id: Uuid::new_v4(),
		asset: withdrawal.asset,
		amount: withdrawal.amount,
		status: "queued",
		queued_at: types::now(),
	};
	info!(user_id = %auth.user_id, withdrawal_id = %ack.withdrawal_id, "Withdrawal queued");

	Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(ack))))
}


// vim: ts=4

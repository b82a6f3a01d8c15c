use axum::{
	extract::{ConnectInfo, State},
	http::StatusCode,
	Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::net::SocketAddr;

use crate::core::route_auth::{generate_access_token, TOKEN_EXPIRE};
use crate::prelude::*;
use nebulax_core::rate_limit::ClientIp;

/// # Login
#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
	user_id: String,
	email: String,
	roles: Option<Vec<String>>,
	token: String,
	expires_in_secs: u64,
}

struct DemoAccount {
	user_id: &'static str,
	email: &'static str,
	password: &'static str,
	roles: Option<&'static str>,
}

// Fixed demo accounts standing in for the exchange identity service
const DEMO_ACCOUNTS: &[DemoAccount] = &[
	DemoAccount {
		user_id: "u-1000",
		email: "ops@nebulax.io",
		password: "backstop-ledger-42",
		roles: Some("ADMIN,TRADER"),
	},
	DemoAccount {
		user_id: "u-1001",
		email: "trader@nebulax.io",
		password: "margin-call-7",
		roles: Some("TRADER"),
	},
];

fn check_credentials(email: &str, password: &str) -> Option<&'static DemoAccount> {
	DEMO_ACCOUNTS.iter().find(|a| a.email == email && a.password == password)
}

/// # POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginReq {
	email: String,
	password: String,
}

pub async fn post_login(
	State(app): State<App>,
	client_ip: Option<Extension<ClientIp>>,
	ConnectInfo(addr): ConnectInfo<SocketAddr>,
	Json(login): Json<LoginReq>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Login>>)> {
	if let Some(account) = check_credentials(&login.email, &login.password) {
		let token =
			generate_access_token(account.user_id, account.roles, app.opts.jwt_secret.as_bytes())?;
		info!(user_id = account.user_id, "Login");

		let login = Login {
			user_id: account.user_id.to_string(),
			email: login.email,
			roles: account
				.roles
				.map(|roles| roles.split(',').map(|r| r.to_string()).collect()),
			token: token.to_string(),
			expires_in_secs: 3600 * TOKEN_EXPIRE,
		};
		Ok((StatusCode::OK, Json(ApiResponse::new(login))))
	} else {
		// Failed attempts count toward the source IP's violation budget,
		// keyed by the same address the limiter resolved
		let source_ip = client_ip.map_or_else(|| addr.ip(), |Extension(ClientIp(ip))| ip);
		app.limiter.penalize(source_ip);
		warn!(ip = %source_ip, "Failed login attempt");
		tokio::time::sleep(std::time::Duration::from_secs(1)).await;
		Err(Error::PermissionDenied)
	}
}


// vim: ts=4

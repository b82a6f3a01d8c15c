//! Common types used throughout the NebulaX gateway.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn add_secs(self, secs: i64) -> Timestamp {
		Timestamp(self.0 + secs)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::cmp::PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl std::cmp::PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::cmp::Eq for Timestamp {}

impl std::cmp::Ord for Timestamp {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.0.cmp(&other.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(res.as_secs() as i64)
}

// ApiResponse //
//*************//

/// Standard response envelope: payload under `data`, request metadata
/// under `meta` when present.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	pub data: T,
	pub meta: Option<ResponseMeta>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
	pub offset: Option<usize>,
	pub count: Option<usize>,
	pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, meta: None }
	}

	pub fn with_pagination(data: T, offset: usize, count: usize, total: usize) -> Self {
		Self {
			data,
			meta: Some(ResponseMeta {
				offset: Some(offset),
				count: Some(count),
				total: Some(total),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timestamp_roundtrip() {
		let ts = Timestamp(1_700_000_000);
		let json = serde_json::to_string(&ts).unwrap();
		assert_eq!(json, "1700000000");
		let back: Timestamp = serde_json::from_str(&json).unwrap();
		assert_eq!(back, ts);
	}

	#[test]
	fn timestamp_ordering() {
		assert!(Timestamp(10) < Timestamp(20));
		assert_eq!(Timestamp(5).add_secs(3600), Timestamp(3605));
	}

	#[test]
	fn api_response_skips_empty_meta() {
		let resp = ApiResponse::new(42);
		let json = serde_json::to_string(&resp).unwrap();
		assert_eq!(json, r#"{"data":42}"#);
	}

	#[test]
	fn api_response_pagination() {
		let resp = ApiResponse::with_pagination(vec![1, 2], 0, 2, 7);
		let json = serde_json::to_value(&resp).unwrap();
		assert_eq!(json["meta"]["total"], 7);
		assert_eq!(json["meta"]["count"], 2);
	}
}

// vim: ts=4

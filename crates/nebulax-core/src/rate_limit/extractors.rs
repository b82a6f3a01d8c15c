//! Identity and Client IP Extraction
//!
//! Resolves the identity a request is limited under and the client IP it
//! originated from. IP resolution depends on the deployment mode: direct
//! peer address in standalone, forwarding headers behind a proxy.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use hyper::Request;
use serde::Deserialize;

/// How the server is deployed, which determines how the client IP is found
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
	/// Direct connections; peer address is the client
	#[default]
	Standalone,
	/// Behind a reverse proxy; forwarding headers carry the client
	Proxy,
}

/// Resolved client IP, inserted as a request extension by the rate limit
/// middleware so handlers attribute violations to the same address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Identity a request is rate limited under
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum IdentityKey {
	/// Authenticated user id
	User(Box<str>),
	/// Unauthenticated, keyed by source IP
	Ip(IpAddr),
	/// No user and no resolvable IP; shared fallback bucket
	Global,
}

impl fmt::Display for IdentityKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IdentityKey::User(id) => write!(f, "user:{}", id),
			IdentityKey::Ip(ip) => write!(f, "ip:{}", ip),
			IdentityKey::Global => write!(f, "global"),
		}
	}
}

/// Extract the client IP from a request based on ServerMode
///
/// - Standalone mode: peer IP from ConnectInfo only
/// - Proxy mode: forwarding headers first, peer IP as fallback
pub fn extract_client_ip<B>(req: &Request<B>, mode: &ServerMode) -> Option<IpAddr> {
	match mode {
		ServerMode::Standalone => {
			req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())
		}
		ServerMode::Proxy => extract_from_xff(req)
			.or_else(|| extract_from_x_real_ip(req))
			.or_else(|| extract_from_forwarded(req))
			.or_else(|| req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())),
	}
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| {
			// X-Forwarded-For can contain multiple IPs: "client, proxy1, proxy2"
			// Take the first (leftmost) IP as the original client
			s.split(',').next().map(|ip| ip.trim()).and_then(|ip| ip.parse().ok())
		})
}

/// Extract IP from X-Real-IP header
fn extract_from_x_real_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from Forwarded header (RFC 7239)
fn extract_from_forwarded<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers().get("forwarded").and_then(|h| h.to_str().ok()).and_then(|s| {
		// Forwarded header format: "for=192.0.2.60;proto=http;by=203.0.113.43"
		// or with IPv6: "for=\"[2001:db8::1]\""
		s.split(';')
			.find(|part| part.trim().to_lowercase().starts_with("for="))
			.and_then(|for_part| {
				let value = for_part
					.trim()
					.strip_prefix("for=")
					.or_else(|| for_part.trim().strip_prefix("FOR="))?;
				// Handle quoted IPv6: "for=\"[2001:db8::1]\""
				let cleaned = value.trim_matches('"').trim_matches('[').trim_matches(']');
				cleaned.parse().ok()
			})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::Ipv4Addr;

	fn request_with_header(name: &str, value: &str) -> Request<()> {
		Request::builder().uri("/").header(name, value).body(()).unwrap()
	}

	fn request_with_peer(ip: IpAddr) -> Request<()> {
		let mut req = Request::builder().uri("/").body(()).unwrap();
		req.extensions_mut().insert(ConnectInfo(SocketAddr::new(ip, 41824)));
		req
	}

	#[test]
	fn standalone_ignores_forwarding_headers() {
		let mut req = request_with_header("x-forwarded-for", "203.0.113.9");
		let peer = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
		req.extensions_mut().insert(ConnectInfo(SocketAddr::new(peer, 41824)));

		assert_eq!(extract_client_ip(&req, &ServerMode::Standalone), Some(peer));
	}

	#[test]
	fn proxy_prefers_xff_leftmost() {
		let req = request_with_header("x-forwarded-for", "203.0.113.9, 10.0.0.2, 10.0.0.3");
		assert_eq!(
			extract_client_ip(&req, &ServerMode::Proxy),
			Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)))
		);
	}

	#[test]
	fn proxy_falls_back_to_x_real_ip() {
		let req = request_with_header("x-real-ip", " 198.51.100.4 ");
		assert_eq!(
			extract_client_ip(&req, &ServerMode::Proxy),
			Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4)))
		);
	}

	#[test]
	fn proxy_parses_forwarded_quoted_ipv6() {
		let req = request_with_header("forwarded", "for=\"[2001:db8::1]\";proto=https");
		let ip = extract_client_ip(&req, &ServerMode::Proxy);
		assert_eq!(ip, Some("2001:db8::1".parse().expect("valid ipv6")));
	}

	#[test]
	fn proxy_falls_back_to_peer_without_headers() {
		let peer = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 44));
		let req = request_with_peer(peer);
		assert_eq!(extract_client_ip(&req, &ServerMode::Proxy), Some(peer));
	}

	#[test]
	fn garbage_xff_yields_none() {
		let req = request_with_header("x-forwarded-for", "not-an-ip");
		assert_eq!(extract_client_ip(&req, &ServerMode::Proxy), None);
	}

	#[test]
	fn identity_key_display() {
		assert_eq!(IdentityKey::User("u-1842".into()).to_string(), "user:u-1842");
		assert_eq!(
			IdentityKey::Ip(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))).to_string(),
			"ip:203.0.113.9"
		);
		assert_eq!(IdentityKey::Global.to_string(), "global");
	}
}

// vim: ts=4

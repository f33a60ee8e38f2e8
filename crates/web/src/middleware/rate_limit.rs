//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login and registration submissions are limited per client IP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// The TCP peer address is the key. Forwarding headers are only believed
/// when that peer is one of the configured trusted proxies: then the key is
/// the right-most `X-Forwarded-For` hop that is not itself a trusted proxy,
/// or `X-Real-IP` when there is no `X-Forwarded-For`.
#[derive(Debug, Clone, Default)]
pub struct ClientIpKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub fn new(trusted_proxies: &[IpAddr]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }

    fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.contains(ip)
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)?;

        if !self.is_trusted(&peer) {
            return Ok(peer);
        }

        let headers = req.headers();

        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            let hops: Vec<IpAddr> = forwarded
                .split(',')
                .filter_map(|s| s.trim().parse::<IpAddr>().ok())
                .collect();
            return Ok(hops
                .iter()
                .rev()
                .find(|ip| !self.is_trusted(ip))
                .or_else(|| hops.first())
                .copied()
                .unwrap_or(peer));
        }

        Ok(headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .unwrap_or(peer))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// `trusted_proxies` lists the reverse proxies whose forwarding headers
/// name the real client (see [`ClientIpKeyExtractor`]).
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// Does not panic: `per_second(6)` and `burst_size(5)` are both non-zero,
/// which is all `GovernorConfigBuilder::finish` checks.
#[must_use]
pub fn auth_rate_limiter(trusted_proxies: &[IpAddr]) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trusted_proxies))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

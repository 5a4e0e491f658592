//! Destination address resolution.
//!
//! A dotted-quad destination is used as-is. Anything else goes through one
//! system name lookup, and the first IPv4 address returned wins. Resolution is
//! attempted exactly once; there is no retry.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use tracing::{debug, warn};

use crate::core::{RdpError, RdpResult};

/// Resolve `host` to a peer endpoint on `port`.
pub async fn resolve_peer(host: &str, port: u16) -> RdpResult<SocketAddr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(SocketAddr::V4(SocketAddrV4::new(ip, port)));
    }

    let failed = || RdpError::NameResolutionFailed {
        host: host.to_string(),
    };

    let addrs = match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!(host, error = %e, "name lookup failed");
            return Err(failed());
        }
    };

    match addrs.into_iter().find(SocketAddr::is_ipv4) {
        Some(addr) => {
            debug!(host, %addr, "resolved destination");
            Ok(addr)
        }
        None => {
            warn!(host, "name lookup returned no IPv4 address");
            Err(failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dotted_quad_used_directly() {
        let addr = resolve_peer("192.0.2.1", 22345).await.unwrap();
        assert_eq!(addr, "192.0.2.1:22345".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_localhost_resolves_ipv4() {
        let addr = resolve_peer("localhost", 7).await.unwrap();
        assert!(addr.is_ipv4());
        assert_eq!(addr.port(), 7);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let err = resolve_peer("no-such-host.invalid", 7).await.unwrap_err();
        match err {
            RdpError::NameResolutionFailed { host } => assert_eq!(host, "no-such-host.invalid"),
            other => panic!("expected NameResolutionFailed, got {other:?}"),
        }
    }
}

//! Request forwarding to downstream services.
//!
//! One attempt per request, no retries. Every downstream HTTP status is
//! a valid answer and is relayed as-is; only transport-level failures
//! become gateway errors (503 connect, 504 timeout, 500 otherwise).

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request, Uri, header},
    response::Response,
};
use gatehouse_auth::Claims;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::registry::ServiceDescriptor;

const MAX_BODY_BYTES: usize = 10_000_000;

/// Forwards a request to the given service and relays its response.
pub async fn forward(
    client: &reqwest::Client,
    service: &ServiceDescriptor,
    claims: Option<&Claims>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let target_url = build_target_url(service, &uri);

    info!(
        service = %service.name,
        method = %method,
        path = %uri.path(),
        target = %target_url,
        "proxying request"
    );

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let headers = build_forward_headers(request.headers(), &uri, claims, peer.as_deref());

    let body_bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::proxy(&service.name, format!("failed to read request body: {e}")))?;

    let outbound = client
        .request(method.clone(), &target_url)
        .headers(headers)
        .body(body_bytes.to_vec())
        .timeout(service.timeout)
        .build()
        .map_err(|e| GatewayError::proxy(&service.name, format!("failed to build request: {e}")))?;

    let upstream = client.execute(outbound).await.map_err(|e| {
        warn!(
            service = %service.name,
            method = %method,
            path = %uri.path(),
            error = %e,
            "proxy request failed"
        );
        if e.is_timeout() {
            GatewayError::ServiceTimeout {
                service: service.name.clone(),
            }
        } else if e.is_connect() {
            GatewayError::ServiceUnavailable {
                service: service.name.clone(),
            }
        } else {
            GatewayError::proxy(&service.name, e.to_string())
        }
    })?;

    let status = upstream.status();
    debug!(service = %service.name, status = %status, "proxy request completed");

    // Relay status and the content headers; everything else is the
    // gateway's own business.
    let mut builder = Response::builder().status(status.as_u16());
    for name in [header::CONTENT_TYPE, header::CONTENT_LENGTH] {
        if let Some(value) = upstream.headers().get(&name) {
            builder = builder.header(name, value);
        }
    }

    let response_body = upstream
        .bytes()
        .await
        .map_err(|e| GatewayError::proxy(&service.name, format!("failed to read response body: {e}")))?;

    builder
        .body(Body::from(response_body.to_vec()))
        .map_err(|e| GatewayError::proxy(&service.name, format!("failed to build response: {e}")))
}

/// Computes the upstream URL for an incoming request URI.
///
/// The forwarded path is the incoming path with the gateway-side mount
/// prefix removed (when configured), re-rooted under the service's
/// upstream path prefix. The query string passes through untouched.
fn build_target_url(service: &ServiceDescriptor, uri: &Uri) -> String {
    let path = uri.path();
    let forwarded = if service.strip_prefix {
        match path.strip_prefix(service.mount_prefix.as_str()) {
            Some(rest) if rest.is_empty() => "/",
            Some(rest) => rest,
            None => path,
        }
    } else {
        path
    };

    let mut url = format!("{}{}{}", service.base_url, service.path_prefix, forwarded);
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Builds the outbound header set.
///
/// Forwarded verbatim: `authorization` (when present). Defaulted:
/// `content-type` to `application/json`. Added: forwarding metadata and
/// the caller's identity claims.
fn build_forward_headers(
    incoming: &HeaderMap,
    uri: &Uri,
    claims: Option<&Claims>,
    peer_ip: Option<&str>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = incoming
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_TYPE, content_type);

    if let Some(auth) = incoming.get(header::AUTHORIZATION) {
        headers.insert(header::AUTHORIZATION, auth.clone());
    }

    if let Some(ip) = peer_ip {
        if let Ok(value) = HeaderValue::try_from(ip) {
            headers.insert("x-forwarded-for", value);
        }
    }
    if let Some(host) = incoming.get(header::HOST) {
        headers.insert("x-forwarded-host", host.clone());
    }

    let original = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    if let Ok(value) = HeaderValue::try_from(original) {
        headers.insert("x-original-path", value);
    }

    if let Some(claims) = claims {
        if let Ok(value) = HeaderValue::try_from(claims.id.as_str()) {
            headers.insert("x-user-id", value);
        }
        if let Ok(value) = HeaderValue::try_from(claims.email.as_str()) {
            headers.insert("x-user-email", value);
        }
        headers.insert(
            "x-user-role",
            HeaderValue::from_static(claims.role.as_str()),
        );
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::UserRole;
    use std::time::Duration;

    fn descriptor(strip: bool, path_prefix: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: "accounts".into(),
            base_url: "http://localhost:3001".into(),
            path_prefix: path_prefix.into(),
            mount_prefix: "/api/v1/accounts".into(),
            strip_prefix: strip,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn strips_mount_prefix() {
        let uri: Uri = "/api/v1/accounts/records/42?full=1".parse().unwrap();
        let url = build_target_url(&descriptor(true, ""), &uri);
        assert_eq!(url, "http://localhost:3001/records/42?full=1");
    }

    #[test]
    fn bare_mount_path_forwards_root() {
        let uri: Uri = "/api/v1/accounts".parse().unwrap();
        let url = build_target_url(&descriptor(true, ""), &uri);
        assert_eq!(url, "http://localhost:3001/");
    }

    #[test]
    fn keeps_full_path_without_strip() {
        let uri: Uri = "/api/v1/accounts/records".parse().unwrap();
        let url = build_target_url(&descriptor(false, ""), &uri);
        assert_eq!(url, "http://localhost:3001/api/v1/accounts/records");
    }

    #[test]
    fn upstream_path_prefix_is_prepended() {
        let uri: Uri = "/api/v1/accounts/records".parse().unwrap();
        let url = build_target_url(&descriptor(true, "/internal"), &uri);
        assert_eq!(url, "http://localhost:3001/internal/records");
    }

    #[test]
    fn identity_headers_added_when_authenticated() {
        let claims = Claims {
            id: "u1".into(),
            email: "a@x.com".into(),
            role: UserRole::Admin,
            exp: 0,
        };
        let uri: Uri = "/api/v1/accounts/me?x=1".parse().unwrap();
        let headers = build_forward_headers(&HeaderMap::new(), &uri, Some(&claims), Some("1.2.3.4"));
        assert_eq!(headers.get("x-user-id").unwrap(), "u1");
        assert_eq!(headers.get("x-user-email").unwrap(), "a@x.com");
        assert_eq!(headers.get("x-user-role").unwrap(), "admin");
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "1.2.3.4");
        assert_eq!(headers.get("x-original-path").unwrap(), "/api/v1/accounts/me?x=1");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn authorization_passes_through_verbatim() {
        let mut incoming = HeaderMap::new();
        incoming.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc"),
        );
        incoming.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        let uri: Uri = "/api/v1/accounts".parse().unwrap();
        let headers = build_forward_headers(&incoming, &uri, None, None);
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert!(headers.get("x-user-id").is_none());
    }
}

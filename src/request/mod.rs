//! Request classification helpers.
//!
//! The application serves three surfaces from one deployment. The dashboard
//! lives on the main origin, the builder on per-project subdomains
//! (`p-<project id>.<main host>`) and the canvas under `/canvas` of a builder
//! subdomain.

use axum::http::{request::Parts, HeaderMap};
use url::Url;
use uuid::Uuid;

use crate::config::ServerConfig;

const PROJECT_HOST_PREFIX: &str = "p-";
const CANVAS_PATH: &str = "/canvas";
pub const AUTH_TOKEN_QUERY: &str = "authToken";
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSurface {
    Dashboard,
    Builder { project_id: String },
    Canvas { project_id: String },
}

/// Builder location derived from a request URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderUrl {
    pub project_id: Option<String>,
    /// Origin of the main (dashboard) host
    pub source_origin: String,
}

/// Everything the loader and context builder read from an incoming request
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub url: Url,
    pub headers: HeaderMap,
    pub surface: RequestSurface,
    pub builder_url: BuilderUrl,
}

impl RequestInfo {
    /// Rebuild the absolute request URL from `Host` and `X-Forwarded-Proto`.
    /// `X-Forwarded-Host` is only read when the server is configured to trust it.
    pub fn from_parts(parts: &Parts, server: &ServerConfig) -> Result<Self, url::ParseError> {
        let headers = parts.headers.clone();
        let scheme = header_str(&headers, "x-forwarded-proto").unwrap_or(server.default_scheme.as_str());
        let forwarded_host = if server.trust_forwarded_host {
            header_str(&headers, "x-forwarded-host")
        } else {
            None
        };
        let host = forwarded_host
            .or_else(|| header_str(&headers, "host"))
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let url = Url::parse(&format!("{scheme}://{host}{path_and_query}"))?;
        Ok(Self::new(url, headers))
    }

    pub fn new(url: Url, headers: HeaderMap) -> Self {
        let builder_url = parse_builder_url(&url);
        let surface = classify(&url, &builder_url);
        Self {
            url,
            headers,
            surface,
            builder_url,
        }
    }

    pub fn is_dashboard(&self) -> bool {
        matches!(self.surface, RequestSurface::Dashboard)
    }

    /// Auth token from the `authToken` query parameter, then `x-auth-token`
    pub fn auth_token(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == AUTH_TOKEN_QUERY)
            .map(|(_, value)| value.into_owned())
            .filter(|token| !token.is_empty())
            .or_else(|| {
                header_str(&self.headers, AUTH_TOKEN_HEADER)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
            })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Split a `p-<uuid>.` project subdomain off the request host
pub fn parse_builder_url(url: &Url) -> BuilderUrl {
    let host = url.host_str().unwrap_or_default();

    let project = host.split_once('.').and_then(|(label, rest)| {
        let id = label.strip_prefix(PROJECT_HOST_PREFIX)?;
        Uuid::parse_str(id).ok()?;
        Some((id.to_string(), rest))
    });

    match project {
        Some((project_id, main_host)) => {
            let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
            BuilderUrl {
                project_id: Some(project_id),
                source_origin: format!("{}://{}{}", url.scheme(), main_host, port),
            }
        }
        None => BuilderUrl {
            project_id: None,
            source_origin: url.origin().ascii_serialization(),
        },
    }
}

fn classify(url: &Url, builder_url: &BuilderUrl) -> RequestSurface {
    match &builder_url.project_id {
        Some(project_id) => {
            let path = url.path();
            if path == CANVAS_PATH || path.starts_with("/canvas/") {
                RequestSurface::Canvas {
                    project_id: project_id.clone(),
                }
            } else {
                RequestSurface::Builder {
                    project_id: project_id.clone(),
                }
            }
        }
        None => RequestSurface::Dashboard,
    }
}

/// `/login?returnTo=<path>`
pub fn login_path(login_path: &str, return_to: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("returnTo", return_to)
        .finish();
    format!("{login_path}?{query}")
}

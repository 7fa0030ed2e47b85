use axum::http::HeaderMap;

/// Fetch destinations the dashboard may be loaded into. Anything else
/// (`iframe`, `embed`, `object`, ...) is refused.
pub const DASHBOARD_DESTINATIONS: &[&str] = &["document", "empty"];

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("cross-origin request carrying cookies (sec-fetch-site: {site})")]
    CrossOriginCookie { site: String },
    #[error("fetch destination '{dest}' is not allowed")]
    DestinationNotAllowed { dest: String },
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Refuse cookie-bearing requests initiated by another site.
///
/// Same-origin requests and user-initiated ones (`none`) pass, as do
/// top-level document navigations. Clients that send no fetch metadata are
/// let through since the header is browser-provided.
pub fn prevent_cross_origin_cookie(headers: &HeaderMap) -> Result<(), PolicyError> {
    let site = match header(headers, "sec-fetch-site") {
        Some(site) => site,
        None => return Ok(()),
    };

    if site == "same-origin" || site == "none" {
        return Ok(());
    }

    let navigate = header(headers, "sec-fetch-mode") == Some("navigate")
        && header(headers, "sec-fetch-dest") == Some("document");
    if navigate {
        return Ok(());
    }

    Err(PolicyError::CrossOriginCookie {
        site: site.to_string(),
    })
}

/// Refuse requests whose `Sec-Fetch-Dest` is outside `allowed`
pub fn allowed_destinations(headers: &HeaderMap, allowed: &[&str]) -> Result<(), PolicyError> {
    match header(headers, "sec-fetch-dest") {
        Some(dest) if !allowed.contains(&dest) => Err(PolicyError::DestinationNotAllowed {
            dest: dest.to_string(),
        }),
        _ => Ok(()),
    }
}

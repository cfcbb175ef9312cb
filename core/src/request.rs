//! Resolved-request construction.

use url::Url;

use crate::error::BuildError;
use crate::http::{HttpMethod, HttpRequest};
use crate::split::Payload;

/// Assemble an `HttpRequest` from a fully formatted URL and its payload.
///
/// The URL is kept exactly as formatted. Control characters are rejected, and
/// absolute URLs must parse; a relative URL is passed through for the
/// executor to resolve.
pub fn build_request(
    method: HttpMethod,
    url: String,
    payload: Payload,
) -> Result<HttpRequest, BuildError> {
    validate_url(&url)?;
    Ok(HttpRequest {
        method,
        url,
        headers: payload.headers.unwrap_or_default(),
        body: payload.body,
    })
}

fn validate_url(url: &str) -> Result<(), BuildError> {
    if let Some(c) = url.chars().find(|c| c.is_control()) {
        return Err(BuildError::InvalidUrl {
            url: url.to_string(),
            reason: format!("invalid control character {c:?}"),
        });
    }
    match Url::parse(url) {
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e) => Err(BuildError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}

//! Remote services used by the terminal.
//!
//! - **assistant**: question answering endpoint for unmatched input
//! - **location**: coordinate lookup and reverse geocoding for `whereami`
//!
//! Each service is a trait with an HTTP implementation; those share one
//! error type.

pub mod assistant;
pub mod location;

use thiserror::Error;

pub use assistant::{Assistant, HttpAssistant};
pub use location::{
    DisabledLocator, Geocoder, IpLocator, LocateError, Locator, NominatimGeocoder, Place,
};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Build a client with the timeout and user agent every service uses
pub(crate) fn http_client(
    timeout: std::time::Duration,
    user_agent: &str,
) -> std::result::Result<reqwest::Client, RemoteError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

/// Check the status, then decode the body as JSON.
///
/// The body is read as text first so a malformed payload surfaces as
/// [`RemoteError::Decode`] rather than a transport error.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(no body)".to_string());
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

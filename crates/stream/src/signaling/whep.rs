//! WHEP offer/answer exchange
//!
//! One HTTP POST per invocation, no internal retries or sleeps. The
//! outcome is classified into exactly three classes:
//!
//! - success: 2xx, body is the remote SDP answer
//! - terminal: 404, the stream path does not exist upstream
//! - transient: any other status or transport error
//!
//! Retry decisions belong to the session's connection monitor, not here.

use std::time::Duration;

use reqwest::{header, StatusCode};
use tracing::debug;
use url::Url;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::signaling::SignalingTarget;
use crate::{Error, Result};

const SDP_MIME: &str = "application/sdp";

/// Successful exchange result
#[derive(Debug)]
pub struct WhepAnswer {
    /// Remote SDP answer, ready to apply as the remote description
    pub answer: RTCSessionDescription,

    /// Gateway-side session resource (from the `Location` header), used to
    /// release the session on teardown
    pub resource: Option<String>,
}

/// HTTP client for the WHEP signaling endpoint
#[derive(Debug, Clone)]
pub struct WhepExchange {
    http: reqwest::Client,
}

impl WhepExchange {
    /// Create an exchange client with the given round-trip timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Signaling(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// POST the local SDP offer and classify the outcome
    pub async fn request_answer(
        &self,
        target: &SignalingTarget,
        offer_sdp: &str,
    ) -> Result<WhepAnswer> {
        debug!(url = %target.url, "posting WHEP offer");

        let mut request = self
            .http
            .post(target.url.clone())
            .header(header::CONTENT_TYPE, SDP_MIME)
            .header(header::ACCEPT, SDP_MIME)
            .body(offer_sdp.to_owned());
        if let Some(authorization) = &target.authorization {
            request = request.header(header::AUTHORIZATION, authorization.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Signaling(format!("WHEP request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::StreamNotFound {
                path: target.path.clone(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Signaling(format!(
                "gateway returned {status}: {body}"
            )));
        }

        let resource = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|location| resolve_resource(&target.url, location));

        let body = response
            .text()
            .await
            .map_err(|e| Error::Signaling(format!("failed to read WHEP answer: {e}")))?;
        let answer = RTCSessionDescription::answer(body)
            .map_err(|e| Error::Signaling(format!("invalid SDP answer: {e}")))?;

        Ok(WhepAnswer { answer, resource })
    }

    /// Release a gateway-side session resource. Best effort: the gateway
    /// expires abandoned sessions on its own, so failures are only logged.
    pub async fn release(&self, resource: &str) {
        debug!(resource, "releasing WHEP session");
        if let Err(e) = self.http.delete(resource).send().await {
            debug!(error = %e, "WHEP release failed; gateway will expire the session");
        }
    }
}

fn resolve_resource(endpoint: &Url, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        endpoint
            .join(location)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| location.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_location_is_kept() {
        let endpoint = Url::parse("http://gw:8889/cam1/whep").unwrap();
        assert_eq!(
            resolve_resource(&endpoint, "http://gw:8889/sessions/abc"),
            "http://gw:8889/sessions/abc"
        );
    }

    #[test]
    fn relative_location_resolves_against_endpoint() {
        let endpoint = Url::parse("http://gw:8889/cam1/whep").unwrap();
        assert_eq!(
            resolve_resource(&endpoint, "/sessions/abc"),
            "http://gw:8889/sessions/abc"
        );
    }
}

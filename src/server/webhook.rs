//! Webhook endpoint handler.
//!
//! Parses GitHub webhook deliveries and handles them inside the request task:
//! the response goes out only after the acknowledgement and any workflow have
//! finished. Remote failures are logged by the handler and never change the
//! status code.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::github::{ClientFactory, GitHubApiError};
use crate::types::DeliveryId;
use crate::webhooks::{HandlerOutcome, ParseError, handle_event, parse_webhook, screen_event};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The payload doesn't match the event type's schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] ParseError),

    /// No GitHub client could be obtained for the event's repository.
    #[error("no GitHub client available: {0}")]
    ClientUnavailable(#[source] GitHubApiError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::ClientUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "issue_comment")
///   - `X-GitHub-Delivery`: Unique delivery ID (UUID format)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK `Processed`: the event was handled (whether or not its workflow succeeded)
/// - 200 OK `Ignored`: event type not handled, or the handler dropped the event
/// - 400 Bad Request: missing header or malformed payload
/// - 500 Internal Server Error: no client for the repository (only asked for
///   once the event has passed the action and author filters)
pub async fn webhook_handler<C: ClientFactory>(
    State(app_state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event type");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    if let Some(reason) = screen_event(&event, app_state.config()) {
        debug!(delivery_id = %delivery_id, reason = ?reason, "Event ignored");
        return Ok((StatusCode::OK, "Ignored"));
    }

    let repo = event.repo_id().clone();
    let client = app_state
        .clients()
        .client_for(event.installation_id(), repo.clone())
        .map_err(|e| {
            error!(delivery_id = %delivery_id, repo = %repo, error = %e, "Failed to create GitHub client");
            WebhookError::ClientUnavailable(e)
        })?;

    let outcome = handle_event(&event, &client, app_state.config()).await;

    match &outcome {
        HandlerOutcome::Ignored { reason } => {
            debug!(delivery_id = %delivery_id, reason = ?reason, "Event ignored");
            Ok((StatusCode::OK, "Ignored"))
        }
        HandlerOutcome::Processed { command, .. } => {
            info!(
                delivery_id = %delivery_id,
                repo = %repo,
                command = %command,
                workflow_succeeded = ?outcome.report().map(|r| r.succeeded()),
                "Webhook processed"
            );
            Ok((StatusCode::OK, "Processed"))
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", "issue_comment".parse().unwrap());

        let result = get_header(&headers, "x-github-event").unwrap();
        assert_eq!(result, "issue_comment");
    }

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();

        let result = get_header(&headers, "x-github-event");
        assert!(matches!(result, Err(WebhookError::MissingHeader(_))));
    }

    #[test]
    fn error_status_codes() {
        let missing = WebhookError::MissingHeader(HEADER_DELIVERY).into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let parse_err = parse_webhook("issue_comment", b"{").unwrap_err();
        let malformed = WebhookError::from(parse_err).into_response();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let unavailable =
            WebhookError::ClientUnavailable(GitHubApiError::with_status(401, "Bad credentials"))
                .into_response();
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

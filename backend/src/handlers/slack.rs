//! HTTP handler for Slack interactive actions
//!
//! Slack posts `application/x-www-form-urlencoded` with a single `payload`
//! field holding the JSON action payload. Requests are signed with the app's
//! signing secret.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::SlackConfig;
use crate::error::AppError;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("malformed signature or timestamp")]
    Malformed,

    #[error("request timestamp outside the accepted window")]
    Stale,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify Slack's `v0` request signature over the raw body
pub fn verify_slack_signature(
    secret: &str,
    headers: &HeaderMap,
    body: &[u8],
    now: i64,
    max_age_secs: i64,
) -> Result<(), SignatureError> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(SignatureError::MissingHeader(name))
    };

    let timestamp = header(TIMESTAMP_HEADER)?;
    let signature = header(SIGNATURE_HEADER)?;

    let sent_at: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
    if (now - sent_at).abs() > max_age_secs {
        return Err(SignatureError::Stale);
    }

    let signature = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(SignatureError::Malformed)?;

    signing_mac(secret, timestamp, body)?
        .verify_slice(&signature)
        .map_err(|_| SignatureError::Mismatch)
}

type HmacSha256 = Hmac<Sha256>;

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// `v0=` signature of `body` sent at `timestamp`
pub fn compute_slack_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let digest = signing_mac(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("v0={}", hex::encode(digest)))
}

#[derive(Debug, Deserialize)]
struct ActionForm {
    payload: String,
}

/// The parts of a `block_actions` payload the approval flow needs
#[derive(Debug, Deserialize)]
pub struct ActionPayload {
    pub user: SlackUser,
    #[serde(default)]
    pub team: Option<SlackId>,
    #[serde(default)]
    pub channel: Option<SlackId>,
    pub response_url: String,
    #[serde(default)]
    pub actions: Vec<SlackAction>,
}

#[derive(Debug, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SlackUser {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct SlackId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SlackAction {
    pub action_id: String,
    #[serde(default)]
    pub value: String,
}

/// Decode the form-encoded body into an action payload
pub fn parse_action_payload(body: &[u8]) -> Result<ActionPayload, AppError> {
    let form: ActionForm = serde_urlencoded::from_bytes(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid action form: {}", e)))?;
    serde_json::from_str(&form.payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid action payload: {}", e)))
}

/// Whether the action came from the configured workspace and channel
fn from_configured_source(config: &SlackConfig, payload: &ActionPayload) -> bool {
    let matches = |expected: &Option<String>, actual: &Option<SlackId>| match expected {
        Some(expected) => actual.as_ref().is_some_and(|a| &a.id == expected),
        None => true,
    };
    matches(&config.team_id, &payload.team) && matches(&config.channel_id, &payload.channel)
}

/// Handle an Approve button press
/// POST /slack/actions
pub async fn handle_slack_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let slack = &state.config.slack;

    if let Err(e) = verify_slack_signature(
        &slack.signing_secret,
        &headers,
        &body,
        chrono::Utc::now().timestamp(),
        slack.max_request_age_secs,
    ) {
        tracing::warn!("Slack signature verification failed: {}", e);
        return AppError::Unauthorized("Invalid request signature".to_string()).into_response();
    }

    let payload = match parse_action_payload(&body) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    if !from_configured_source(slack, &payload) {
        tracing::warn!(
            team = ?payload.team.as_ref().map(|t| &t.id),
            channel = ?payload.channel.as_ref().map(|c| &c.id),
            "Slack action from unexpected workspace or channel"
        );
        return AppError::Forbidden.into_response();
    }

    let user = payload.user.display_name();
    for action in &payload.actions {
        let outcome = state
            .approvals
            .handle(&action.action_id, &action.value, user)
            .await;

        if let Err(e) = state
            .notifier
            .respond(&payload.response_url, &outcome.to_string())
            .await
        {
            tracing::warn!("Failed to reply to Slack action: {}", e);
        }
    }

    StatusCode::OK.into_response()
}

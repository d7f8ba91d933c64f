// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format for the notification channel.
//!
//! Outbound, the client announces a freshly minted token as
//! `{"uploadId":"<token>"}` so the server can bind it to the upload before
//! any progress is reported. Inbound frames are flat JSON objects,
//! `{"uploadId":..., "action":..., "progress":...}`; the wire calls the
//! phase `action`. Parsing is lenient by design: the channel is shared, so
//! frames may belong to other clients or be plain garbage, and neither may
//! crash this one.

use serde_json::Value;

use crate::token::Token;

/// Server-side processing phase reported by a progress event.
///
/// The set is open: phases this client does not know render nothing but are
/// still valid traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Import,
    Verify,
    Complete,
    Error,
    Other(String),
}

impl Phase {
    fn from_action(action: &str) -> Self {
        match action {
            "import" => Self::Import,
            "verify" => Self::Verify,
            "complete" => Self::Complete,
            "error" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One inbound progress event, shape-checked but not yet matched against
/// the active session.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub upload_id: Token,
    pub phase: Phase,
    /// Percent complete, clamped to 0..=100. Only `import` carries
    /// meaningful values; other phases send zero or nothing.
    pub percent: f64,
    /// Server-supplied detail accompanying an `error` event.
    pub message: Option<String>,
}

impl ProgressEvent {
    /// Parse a raw text frame. Anything that is not a well-formed progress
    /// event yields `None` and is dropped by the caller.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        let upload_id = value.get("uploadId")?.as_str()?;
        if upload_id.is_empty() {
            return None;
        }
        let action = value.get("action")?.as_str()?;
        let percent =
            value.get("progress").and_then(Value::as_f64).unwrap_or(0.0).clamp(0.0, 100.0);
        let message = value.get("message").and_then(Value::as_str).map(str::to_owned);

        Some(Self {
            upload_id: Token::from(upload_id),
            phase: Phase::from_action(action),
            percent,
            message,
        })
    }
}

/// Serialize the announce frame for a minted token.
pub fn announce_frame(token: &Token) -> String {
    serde_json::json!({ "uploadId": token.as_str() }).to_string()
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

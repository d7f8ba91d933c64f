// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session token lifecycle.
//!
//! A token correlates one upload's form submission with its progress events
//! on the shared notification channel. Tokens are minted locally, with no
//! server round trip, so the form can carry the token before the request is
//! ever sent. The newest token supersedes any previous one: events bearing a
//! stale token are filtered by the router, never errored on.

use std::fmt;

use tokio::sync::watch;
use uuid::Uuid;

/// Opaque per-upload identifier, unique with high probability among
/// concurrently running clients. Collisions are an accepted risk; there is
/// no detection or retry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints and tracks the active upload token.
///
/// The active token is published on a watch channel consumed by the
/// notification task, which announces it to the server on every change and
/// re-announces it after reconnects. Publication and the form submission are
/// ordered but not transactional: if the announce never reaches the server
/// the upload still proceeds and its events are simply never matched.
pub struct TokenManager {
    active: Option<Token>,
    announce_tx: watch::Sender<Option<Token>>,
}

impl TokenManager {
    /// Create a manager plus the announce receiver for the channel task.
    pub fn new() -> (Self, watch::Receiver<Option<Token>>) {
        let (announce_tx, announce_rx) = watch::channel(None);
        (Self { active: None, announce_tx }, announce_rx)
    }

    /// Mint a fresh token and make it the active session, superseding any
    /// previous one.
    pub fn mint(&mut self) -> Token {
        let token = Token(Uuid::new_v4().simple().to_string());
        self.active = Some(token.clone());
        // Send fails only when the channel task is gone; the upload then
        // runs without live progress.
        let _ = self.announce_tx.send(Some(token.clone()));
        token
    }

    /// The token of the in-flight session, if any.
    pub fn current(&self) -> Option<&Token> {
        self.active.as_ref()
    }

    /// Forget the active session once its terminal event has been observed.
    pub fn clear(&mut self) {
        self.active = None;
        let _ = self.announce_tx.send(None);
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress event router.
//!
//! Owns the receive side of the notification channel: every inbound frame
//! is parsed leniently, filtered by the active token, and applied to the
//! upload session. UI side effects go through the injected [`ProgressSink`];
//! the router itself never touches a socket, which is what makes the
//! filtering rules unit-testable.

use crate::event::ProgressEvent;
use crate::session::{UploadSession, UploadState};
use crate::token::{Token, TokenManager};
use crate::ui::{ProgressSink, StatusLine};

pub struct Router<S> {
    tokens: TokenManager,
    session: UploadSession,
    sink: S,
}

impl<S: ProgressSink> Router<S> {
    pub fn new(tokens: TokenManager, sink: S) -> Self {
        Self { tokens, session: UploadSession::new(), sink }
    }

    /// Start a new upload session: mint a token (which publishes it for
    /// announcement) and reset the panel. Any in-flight session is
    /// abandoned; its events will no longer match.
    pub fn select_file(&mut self, file_name: &str, index: &str) -> Token {
        let token = self.tokens.mint();
        self.session.select(file_name, index);
        self.render();
        token
    }

    pub fn state(&self) -> &UploadState {
        self.session.state()
    }

    /// Handle one raw text frame from the notification channel. Returns
    /// true when the frame changed the rendered state.
    ///
    /// Unmatched and malformed frames are dropped without logging: the
    /// channel is shared, so most traffic legitimately belongs to someone
    /// else.
    pub fn handle_frame(&mut self, text: &str) -> bool {
        let Some(event) = ProgressEvent::parse(text) else {
            return false;
        };
        let Some(active) = self.tokens.current() else {
            return false;
        };
        if event.upload_id != *active {
            return false;
        }

        if !self.session.apply(&event) {
            return false;
        }
        if self.session.state().is_terminal() {
            // The token is single-use; later frames for it are stale.
            self.tokens.clear();
        }
        self.render();
        true
    }

    fn render(&mut self) {
        self.sink.render(StatusLine::of(&self.session));
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;

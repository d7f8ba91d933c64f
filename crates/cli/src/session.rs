// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-upload state machine.
//!
//! Events reaching this module have already been matched against the active
//! token; the machine only decides what a matched event means for the
//! rendered panel. Phase order (`import`* then `verify`) is the server's
//! contract — the client never reorders or regresses.

use crate::event::{Phase, ProgressEvent};

/// Rendered lifecycle of one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    /// No upload selected yet.
    Idle,
    /// Token minted and announced, form submitted, no event seen yet.
    AwaitingUpload,
    /// Server is importing rows. Percent is last-write-wins; servers are
    /// expected to send non-decreasing values but nothing enforces it.
    Importing { percent: f64 },
    /// Server is verifying the imported data. No percent semantics.
    Verifying,
    Done,
    Failed { message: String },
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// One client-local upload session: at most one exists per process, and it
/// is rebound wholesale on every file selection.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub file_name: String,
    pub index: String,
    state: UploadState,
}

impl UploadSession {
    pub fn new() -> Self {
        Self { file_name: String::new(), index: String::new(), state: UploadState::Idle }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Begin a new session, abandoning whatever the previous one was doing.
    pub fn select(&mut self, file_name: &str, index: &str) {
        self.file_name = file_name.to_owned();
        self.index = index.to_owned();
        self.state = UploadState::AwaitingUpload;
    }

    /// Apply a matched event. Returns true when the rendered state changed.
    pub fn apply(&mut self, event: &ProgressEvent) -> bool {
        use UploadState::*;

        let next = match (&self.state, &event.phase) {
            (AwaitingUpload | Importing { .. }, Phase::Import) => {
                Importing { percent: event.percent }
            }
            (AwaitingUpload | Importing { .. } | Verifying, Phase::Verify) => Verifying,
            (Idle, _) => return false,
            (s, Phase::Complete) if !s.is_terminal() => Done,
            (s, Phase::Error) if !s.is_terminal() => Failed {
                message: event.message.clone().unwrap_or_else(|| "import failed".to_owned()),
            },
            // Everything else: unknown phases, import after verify, traffic
            // for a finished session. Dropped without effect.
            _ => return false,
        };

        if next == self.state {
            return false;
        }
        self.state = next;
        true
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

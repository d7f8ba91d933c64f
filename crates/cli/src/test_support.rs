// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a recording sink and assertion helpers.

use std::sync::{Arc, Mutex};

use crate::ui::{ProgressSink, StatusLine};

/// A [`ProgressSink`] that records every rendered line for assertions.
///
/// Clones share the same recording, so a test can keep a handle while the
/// router owns the sink.
#[derive(Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<StatusLine>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<StatusLine> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recently rendered fill value, following the sink contract
    /// that a `None` fill keeps the previous one.
    pub fn fill(&self) -> Option<f64> {
        self.lines().iter().rev().find_map(|l| l.fill)
    }
}

impl ProgressSink for RecordingSink {
    fn render(&mut self, line: StatusLine) {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).push(line);
    }
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

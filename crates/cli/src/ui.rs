// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal rendering of upload progress.
//!
//! The router talks to the terminal through [`ProgressSink`], the seam that
//! lets tests observe renders without a terminal. [`TermSink`] keeps the
//! whole panel on a single redrawn line.

use std::io::{self, Write};

use crate::session::{UploadSession, UploadState};

/// Snapshot of what the status line should show after a state change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Human-readable phase description including the file name.
    pub text: String,
    /// New fill percent, or `None` to keep the previous fill. Discrete
    /// phases like verify carry no percent semantics.
    pub fill: Option<f64>,
    /// Whether this line ends the session's rendering.
    pub terminal: bool,
}

impl StatusLine {
    pub fn of(session: &UploadSession) -> Self {
        let file = &session.file_name;
        let index = &session.index;
        match session.state() {
            UploadState::Idle => {
                Self { text: "No upload selected".to_owned(), fill: Some(0.0), terminal: false }
            }
            UploadState::AwaitingUpload => Self {
                text: format!("Uploading {file} into {index}"),
                fill: Some(0.0),
                terminal: false,
            },
            UploadState::Importing { percent } => Self {
                text: format!("Importing {file} into {index}"),
                fill: Some(*percent),
                terminal: false,
            },
            UploadState::Verifying => Self {
                text: format!("Verifying {file} in {index}"),
                fill: None,
                terminal: false,
            },
            UploadState::Done => Self {
                text: format!("Imported {file} into {index}"),
                fill: Some(100.0),
                terminal: true,
            },
            UploadState::Failed { message } => Self {
                text: format!("Import of {file} failed: {message}"),
                fill: None,
                terminal: true,
            },
        }
    }
}

/// Receives every rendered state change of the active session.
pub trait ProgressSink {
    fn render(&mut self, line: StatusLine);
}

/// Single-line terminal renderer with a bracketed fill bar.
pub struct TermSink<W: Write> {
    out: W,
    fill: f64,
}

impl TermSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::to(io::stderr())
    }
}

impl<W: Write> TermSink<W> {
    pub fn to(out: W) -> Self {
        Self { out, fill: 0.0 }
    }
}

impl<W: Write> ProgressSink for TermSink<W> {
    fn render(&mut self, line: StatusLine) {
        if let Some(fill) = line.fill {
            self.fill = fill;
        }
        // Carriage return plus clear-line keeps the panel on one row.
        let _ = write!(
            self.out,
            "\r\x1b[2K{} [{}] {:>3.0}%",
            line.text,
            bar(self.fill, 24),
            self.fill
        );
        if line.terminal {
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }
}

fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut s = String::with_capacity(width);
    for i in 0..width {
        s.push(if i < filled { '=' } else { ' ' });
    }
    s
}

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;

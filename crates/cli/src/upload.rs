// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous upload transport.
//!
//! A multipart form POST carrying the file plus the destination index, the
//! column-title row offset, and the session token as the `uploadId` field
//! (the browser form's hidden field). One shot: no retry, no cancellation,
//! and nothing in the response is interpreted beyond the HTTP status. The
//! request is bounded by `timeout` so a stalled server cannot wedge the
//! client forever.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Datelike;

use crate::token::Token;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Form fields accompanying the file bytes.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub index: String,
    pub offset: u32,
    pub upload_id: Token,
    /// Name sent as the multipart part's file name; also what the panel
    /// shows, so the two cannot drift.
    pub file_name: String,
}

/// Display name of an upload path: the final component, or a placeholder
/// for paths without one.
pub fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_owned())
}

/// Submit the upload. Errors only on transport failure, the `timeout`
/// elapsing, or a non-2xx status; progress reporting is entirely the
/// notification channel's job.
pub async fn submit(
    server: &str,
    file: &Path,
    form: &UploadForm,
    timeout: Duration,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    let part = reqwest::multipart::Part::bytes(bytes).file_name(form.file_name.clone());
    let multipart = reqwest::multipart::Form::new()
        .part("file", part)
        .text("index", form.index.clone())
        .text("offset", form.offset.to_string())
        .text("uploadId", form.upload_id.as_str().to_owned());

    let url = format!("{}/api/upload", server.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .context("building http client")?;
    let resp = client
        .post(&url)
        .multipart(multipart)
        .send()
        .await
        .context("upload request failed")?;
    resp.error_for_status().context("upload rejected")?;

    tracing::debug!(upload_id = %form.upload_id, "upload accepted");
    Ok(())
}

/// Default destination index: `<lowercase-month-name>-<year>` in client
/// local time, e.g. `august-2026`.
pub fn default_index(date: chrono::NaiveDate) -> String {
    format!("{}-{}", month_name(date.month()), date.year())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "january",
        2 => "february",
        3 => "march",
        4 => "april",
        5 => "may",
        6 => "june",
        7 => "july",
        8 => "august",
        9 => "september",
        10 => "october",
        11 => "november",
        _ => "december",
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;

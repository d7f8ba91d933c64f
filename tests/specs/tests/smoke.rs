// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `upfeed` binary against an
//! in-process mock import server and drive it over both channels.

use std::time::Duration;

use serde_json::json;

use upfeed_specs::{sample_csv, MockImportServer, UpfeedProcess};

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn announce_precedes_upload_with_the_same_token() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(
        csv.path(),
        &server.base_url(),
        &["--index", "smoke-index", "--progress-timeout-secs", "5"],
    )?;

    let upload = server.wait_for_upload(TIMEOUT).await?;
    let observed = server.observed();

    // The token is the sole correlation key between the two channels, and
    // it must be registered before the form arrives.
    assert!(!upload.upload_id.is_empty());
    assert_eq!(observed.announced.first(), Some(&upload.upload_id));
    assert_eq!(observed.order.first().map(String::as_str), Some("announce"));

    assert_eq!(upload.index, "smoke-index");
    assert_eq!(upload.offset, "1");
    assert!(upload.file_name.ends_with(".csv"));
    assert!(upload.size > 0);

    // Drive the import to completion.
    for progress in [25, 60, 100] {
        server.push(json!({
            "uploadId": upload.upload_id, "action": "import", "progress": progress
        }));
    }
    server.push(json!({ "uploadId": upload.upload_id, "action": "verify", "progress": 0 }));
    server.push(json!({ "uploadId": upload.upload_id, "action": "complete", "progress": 0 }));

    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[tokio::test]
async fn error_event_fails_the_run() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(csv.path(), &server.base_url(), &[])?;

    let upload = server.wait_for_upload(TIMEOUT).await?;

    // A foreign-token error first: it must be ignored.
    server.push(json!({
        "uploadId": "someone-else", "action": "error", "progress": 0,
        "message": "not ours"
    }));
    server.push(json!({
        "uploadId": upload.upload_id, "action": "error", "progress": 0,
        "message": "header mismatch"
    }));

    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

#[tokio::test]
async fn foreign_events_do_not_complete_the_run() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(
        csv.path(),
        &server.base_url(),
        &["--progress-timeout-secs", "30"],
    )?;

    let upload = server.wait_for_upload(TIMEOUT).await?;

    server.push(json!({ "uploadId": "other-tab", "action": "complete", "progress": 0 }));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(upfeed.is_running(), "foreign complete must not finish the session");

    server.push(json!({ "uploadId": upload.upload_id, "action": "complete", "progress": 0 }));
    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[tokio::test]
async fn missing_channel_degrades_to_silent_upload() -> anyhow::Result<()> {
    let server = MockImportServer::start_without_channel().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(
        csv.path(),
        &server.base_url(),
        &["--progress-timeout-secs", "1"],
    )?;

    // The upload must arrive even though `/ws` does not exist.
    let upload = server.wait_for_upload(TIMEOUT).await?;
    assert!(!upload.upload_id.is_empty());
    assert!(server.observed().announced.is_empty());

    // No progress will ever render; the run still succeeds.
    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[tokio::test]
async fn stalled_upload_endpoint_does_not_hang_the_client() -> anyhow::Result<()> {
    let server = MockImportServer::start_stalling().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(
        csv.path(),
        &server.base_url(),
        &["--upload-timeout-secs", "1"],
    )?;

    // The request is accepted but never answered and no event ever arrives;
    // the client must give up and report the failure rather than wait
    // forever.
    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

#[tokio::test]
async fn malformed_frames_do_not_kill_the_client() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let csv = sample_csv()?;
    let mut upfeed = UpfeedProcess::start(csv.path(), &server.base_url(), &[])?;

    let upload = server.wait_for_upload(TIMEOUT).await?;

    for garbage in ["not json at all", "[1,2,3]", r#"{"uploadId":7}"#] {
        server.push_raw(garbage);
    }
    server.push(json!({ "uploadId": upload.upload_id, "action": "complete", "progress": 0 }));

    let status = upfeed.wait_exit(TIMEOUT).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

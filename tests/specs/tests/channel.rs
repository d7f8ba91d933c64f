// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process tests of the notification channel task against the mock
//! server, including the reconnect-and-re-announce policy that the binary
//! smoke tests cannot time precisely.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use upfeed::notify;
use upfeed::token::TokenManager;
use upfeed_specs::MockImportServer;

#[tokio::test]
async fn announces_token_and_forwards_events() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let (mut tokens, announce_rx) = TokenManager::new();
    let (frame_tx, mut frame_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = notify::spawn_channel(server.base_url(), frame_tx, announce_rx, cancel.clone());

    let token = tokens.mint();
    let announced = server.wait_for_announce(Duration::from_secs(5)).await?;
    assert_eq!(announced, token.as_str());

    server.push(serde_json::json!({
        "uploadId": token.as_str(), "action": "import", "progress": 10
    }));
    let frame = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv())
        .await?
        .ok_or_else(|| anyhow::anyhow!("frame channel closed"))?;
    assert!(frame.contains(token.as_str()));

    cancel.cancel();
    let _ = task.await;
    Ok(())
}

#[tokio::test]
async fn reconnects_and_reannounces_after_server_restart() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let port = server.port();
    let base_url = server.base_url();

    let (mut tokens, announce_rx) = TokenManager::new();
    let (frame_tx, _frame_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = notify::spawn_channel(base_url, frame_tx, announce_rx, cancel.clone());

    let token = tokens.mint();
    server.wait_for_announce(Duration::from_secs(5)).await?;

    // Kill the server mid-session. The channel task retries with backoff
    // and must re-announce the still-active token to the new instance.
    drop(server);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let server = MockImportServer::start_on(port).await?;
    let announced = server.wait_for_announce(Duration::from_secs(10)).await?;
    assert_eq!(announced, token.as_str());

    cancel.cancel();
    let _ = task.await;
    Ok(())
}

#[tokio::test]
async fn superseding_token_is_announced_too() -> anyhow::Result<()> {
    let server = MockImportServer::start().await?;
    let (mut tokens, announce_rx) = TokenManager::new();
    let (frame_tx, _frame_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = notify::spawn_channel(server.base_url(), frame_tx, announce_rx, cancel.clone());

    let first = tokens.mint();
    server.wait_for_announce(Duration::from_secs(5)).await?;
    let second = tokens.mint();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let announced = server.observed().announced;
        if announced.len() >= 2 {
            assert_eq!(announced[0], first.as_str());
            assert_eq!(announced[1], second.as_str());
            break;
        }
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("second announce never arrived: {announced:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    cancel.cancel();
    let _ = task.await;
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification channel task.
//!
//! One persistent WebSocket per process, established at startup and shared
//! by every upload the process performs. The task announces the active
//! token on connect and whenever it changes, forwards inbound text frames
//! to the router, and reconnects with exponential backoff. Channel loss
//! never fails an upload: the form submission stands on its own and the
//! panel simply stops updating.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::event::announce_frame;
use crate::token::Token;

/// Spawn the channel task for the given upload server.
///
/// `announce_rx` carries the active token from the token manager; `frame_tx`
/// delivers raw inbound frames to the router.
pub fn spawn_channel(
    base_url: String,
    frame_tx: mpsc::Sender<String>,
    mut announce_rx: watch::Receiver<Option<Token>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let ws_url = build_ws_url(&base_url);
        let mut backoff = Duration::from_millis(100);
        let max_backoff = Duration::from_secs(5);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match tokio_tungstenite::connect_async(&ws_url).await {
                Ok((ws_stream, _)) => {
                    backoff = Duration::from_millis(100); // Reset on success.
                    let (mut write, mut read) = ws_stream.split();

                    // Announce the active token, if any, before reading.
                    // After a mid-upload reconnect this re-registers the
                    // token-to-upload binding upstream. A failed send means
                    // the socket is already dead; the read loop notices.
                    let current = announce_rx.borrow_and_update().clone();
                    if let Some(ref token) = current {
                        let _ = write.send(Message::Text(announce_frame(token).into())).await;
                    }

                    loop {
                        tokio::select! {
                            _ = cancel.cancelled() => return,

                            changed = announce_rx.changed() => {
                                if changed.is_err() {
                                    return; // token manager gone
                                }
                                let token = announce_rx.borrow_and_update().clone();
                                if let Some(token) = token {
                                    if write
                                        .send(Message::Text(announce_frame(&token).into()))
                                        .await
                                        .is_err()
                                    {
                                        // Reconnect; the watch still holds the
                                        // token, so it is re-announced then.
                                        break;
                                    }
                                }
                            }

                            msg = read.next() => {
                                match msg {
                                    Some(Ok(Message::Text(text))) => {
                                        if frame_tx.send(text.to_string()).await.is_err() {
                                            return; // router gone
                                        }
                                    }
                                    Some(Ok(_)) => {} // Ignore binary, ping, pong.
                                    Some(Err(e)) => {
                                        tracing::debug!(err = %e, "notify ws error");
                                        break;
                                    }
                                    None => break, // Stream ended.
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(err = %e, "notify ws connect failed");
                }
            }

            if cancel.is_cancelled() {
                break;
            }

            // Exponential backoff before reconnect.
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(max_backoff);
        }
    })
}

/// Map the upload server's HTTP base URL onto its notification endpoint.
pub fn build_ws_url(base_url: &str) -> String {
    let ws_base = if base_url.starts_with("https://") {
        base_url.replacen("https://", "wss://", 1)
    } else {
        base_url.replacen("http://", "ws://", 1)
    };
    format!("{}/ws", ws_base.trim_end_matches('/'))
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;

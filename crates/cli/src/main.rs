// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use upfeed::config::Config;
use upfeed::notify;
use upfeed::router::Router;
use upfeed::session::UploadState;
use upfeed::token::TokenManager;
use upfeed::ui::TermSink;
use upfeed::upload::{self, UploadForm};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}

async fn run(config: Config) -> anyhow::Result<i32> {
    let cancel = CancellationToken::new();

    // Ctrl-C abandons the rendering only; the upload, once sent, cannot be
    // recalled.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let (tokens, announce_rx) = TokenManager::new();
    let (frame_tx, mut frame_rx) = mpsc::channel(64);

    // The notification channel is process-wide and outlives any single
    // upload; start it before minting so the announce has somewhere to go.
    let channel =
        notify::spawn_channel(config.server.clone(), frame_tx, announce_rx, cancel.clone());

    let mut router = Router::new(tokens, TermSink::stderr());

    let file_name = upload::display_name(&config.file);
    let index = config.index();
    let token = router.select_file(&file_name, &index);
    debug!(upload_id = %token, index = %index, "session started");

    // Announce-then-submit ordering: give the channel a beat to register
    // the token upstream before the first byte of the form arrives.
    tokio::time::sleep(config.announce_delay()).await;

    let (upload_tx, mut upload_rx) = oneshot::channel();
    {
        let server = config.server.clone();
        let file = config.file.clone();
        let timeout = config.upload_timeout();
        let form = UploadForm { index, offset: config.offset, upload_id: token, file_name };
        tokio::spawn(async move {
            let _ = upload_tx.send(upload::submit(&server, &file, &form, timeout).await);
        });
    }

    let mut upload_done = false;
    let mut deadline: Option<tokio::time::Instant> = None;

    let final_state = loop {
        tokio::select! {
            _ = cancel.cancelled() => break router.state().clone(),

            result = &mut upload_rx, if !upload_done => {
                upload_done = true;
                match result {
                    Ok(Ok(())) => {
                        // Processing continues server-side; from here on the
                        // channel is the only source of truth, bounded by the
                        // progress timeout.
                        deadline = Some(tokio::time::Instant::now() + config.progress_timeout());
                    }
                    Ok(Err(e)) => {
                        error!("upload failed: {e:#}");
                        cancel.cancel();
                        let _ = channel.await;
                        return Ok(1);
                    }
                    Err(_) => {
                        cancel.cancel();
                        let _ = channel.await;
                        return Ok(1);
                    }
                }
            }

            _ = sleep_until_opt(deadline) => {
                // Degraded mode: the upload was accepted but no terminal
                // event arrived. The import may still finish server-side.
                info!("no terminal event within {:?}; giving up on live progress", config.progress_timeout());
                break router.state().clone();
            }

            frame = frame_rx.recv() => {
                match frame {
                    Some(text) => {
                        if router.handle_frame(&text) && router.state().is_terminal() {
                            break router.state().clone();
                        }
                    }
                    None => break router.state().clone(),
                }
            }
        }
    };

    cancel.cancel();
    let _ = channel.await;
    if !final_state.is_terminal() {
        // Finish the in-place status line before returning the prompt.
        eprintln!();
    }

    match final_state {
        UploadState::Failed { message } => {
            error!("import failed: {message}");
            Ok(1)
        }
        _ => Ok(0),
    }
}

async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Upload a spreadsheet and follow its import progress live.
#[derive(Debug, Parser)]
#[command(name = "upfeed", version, about)]
pub struct Config {
    /// File to upload.
    pub file: PathBuf,

    /// Upload server base URL. The notification channel lives on the same
    /// host, at `/ws`.
    #[arg(long, env = "UPFEED_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Destination index. Defaults to `<month>-<year>` in local time.
    #[arg(long, env = "UPFEED_INDEX")]
    pub index: Option<String>,

    /// Row containing the column titles.
    #[arg(long, env = "UPFEED_OFFSET", default_value_t = 1)]
    pub offset: u32,

    /// Pause between announcing the session token and submitting the form,
    /// so the server can register the binding first.
    #[arg(long, env = "UPFEED_ANNOUNCE_DELAY_MS", default_value_t = 150)]
    pub announce_delay_ms: u64,

    /// How long to wait for a terminal progress event after the upload
    /// response before giving up on the notification channel.
    #[arg(long, env = "UPFEED_PROGRESS_TIMEOUT_SECS", default_value_t = 30)]
    pub progress_timeout_secs: u64,

    /// Overall cap on the upload request itself, generous by default to
    /// leave room for large files.
    #[arg(long, env = "UPFEED_UPLOAD_TIMEOUT_SECS", default_value_t = 120)]
    pub upload_timeout_secs: u64,

    /// Log format (json or text).
    #[arg(long, env = "UPFEED_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "UPFEED_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.file.is_file() {
            anyhow::bail!("no such file: {}", self.file.display());
        }
        if !self.server.starts_with("http://") && !self.server.starts_with("https://") {
            anyhow::bail!("--server must be an http(s) URL: {}", self.server);
        }
        Ok(())
    }

    /// Destination index: the explicit flag or the computed monthly default.
    pub fn index(&self) -> String {
        self.index
            .clone()
            .unwrap_or_else(|| crate::upload::default_index(chrono::Local::now().date_naive()))
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }

    pub fn progress_timeout(&self) -> Duration {
        Duration::from_secs(self.progress_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

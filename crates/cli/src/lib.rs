// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod event;
pub mod notify;
pub mod router;
pub mod session;
pub mod test_support;
pub mod token;
pub mod ui;
pub mod upload;

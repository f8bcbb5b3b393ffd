// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::stderr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Environment variable read when `--log-level` is not given.
pub const LOG_ENV: &str = "PENNYWISE_LOG";

pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'warn'", level);
            LevelFilter::WARN
        }
    }
}

/// Resolve the level from the CLI flag, then the environment, then `warn`.
pub fn resolve_level(flag: Option<&str>) -> LevelFilter {
    match flag {
        Some(l) => parse_log_level(l),
        None => std::env::var(LOG_ENV)
            .ok()
            .map(|l| parse_log_level(&l))
            .unwrap_or(LevelFilter::WARN),
    }
}

pub fn init(level: LevelFilter) {
    // stdout carries tables and JSON, so logs go to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

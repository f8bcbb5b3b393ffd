// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Reasons a row or argument is rejected at the application boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid amount '{value}' for {field}")]
    InvalidAmount { field: &'static str, value: String },
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(String),
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Day {day} out of range 1..=31 for {field}")]
    DayOutOfRange { field: &'static str, day: i64 },
    #[error("Installment count must be at least 1, got {0}")]
    InvalidInstallmentCount(u32),
}

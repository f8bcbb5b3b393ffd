// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credit-card billing cycle and limit usage.

use crate::models::{Card, Transaction};
use crate::utils::clamped_date;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardUsage {
    pub card_id: i64,
    pub bank: String,
    pub limit: Decimal,
    pub limit_used: Decimal,
    pub current_invoice: Decimal,
    pub available_limit: Decimal,
    pub percent_used: Decimal,
    pub cycle_end: NaiveDate,
    pub due_date: NaiveDate,
}

/// Last day of the open billing cycle as seen from `today`.
///
/// Closing days past the end of a short month fall on that month's last day.
pub fn cycle_end(today: NaiveDate, closing_day: u32) -> NaiveDate {
    if today.day() < closing_day {
        clamped_date(today.year(), today.month(), closing_day)
    } else {
        let (y, m) = next_month(today.year(), today.month());
        clamped_date(y, m, closing_day)
    }
}

/// Due date of the invoice sealed on `cycle_end`.
pub fn invoice_due_date(cycle_end: NaiveDate, closing_day: u32, due_day: u32) -> NaiveDate {
    if due_day > closing_day {
        clamped_date(cycle_end.year(), cycle_end.month(), due_day)
    } else {
        let (y, m) = next_month(cycle_end.year(), cycle_end.month());
        clamped_date(y, m, due_day)
    }
}

pub fn card_usage(card: &Card, transactions: &[Transaction], today: NaiveDate) -> CardUsage {
    let end = cycle_end(today, card.closing_day);
    let pending = transactions
        .iter()
        .filter(|t| t.held_card() == Some(card.id));

    let mut limit_used = Decimal::ZERO;
    let mut current_invoice = Decimal::ZERO;
    for t in pending {
        limit_used += t.amount;
        if t.date <= end {
            current_invoice += t.amount;
        }
    }

    let percent_used = if card.limit.is_zero() {
        Decimal::ZERO
    } else {
        limit_used / card.limit * Decimal::ONE_HUNDRED
    };

    CardUsage {
        card_id: card.id,
        bank: card.bank.clone(),
        limit: card.limit,
        limit_used,
        current_invoice,
        available_limit: card.limit - limit_used,
        percent_used,
        cycle_end: end,
        due_date: invoice_due_date(end, card.closing_day, card.due_day),
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

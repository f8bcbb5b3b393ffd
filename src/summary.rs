// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Grouped reductions over transactions: per-month totals, rolling windows
//! and forward projections.

use crate::cycle::card_usage;
use crate::models::{PaymentMethod, Transaction, TransactionType};
use crate::state::AppState;
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthTotals {
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }

    fn add(&mut self, t: &Transaction) {
        match t.r#type {
            TransactionType::Income => self.income += t.amount,
            TransactionType::Expense => self.expense += t.amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub month: String,
    pub income: Decimal,
    pub debit_expense: Decimal,
    pub credit_expense: Decimal,
}

impl Projection {
    pub fn expense(&self) -> Decimal {
        self.debit_expense + self.credit_expense
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_balance: Decimal,
    pub month: String,
    pub month_totals: MonthTotals,
    pub last_30_days: MonthTotals,
    pub total_card_limit: Decimal,
    pub total_card_available: Decimal,
    pub next_month: Projection,
}

/// `YYYY-MM` key for a date.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Month key of the calendar month after `today`.
pub fn next_month(today: NaiveDate) -> String {
    if today.month() == 12 {
        format!("{:04}-01", today.year() + 1)
    } else {
        format!("{:04}-{:02}", today.year(), today.month() + 1)
    }
}

pub fn monthly_totals(transactions: &[Transaction]) -> BTreeMap<String, MonthTotals> {
    let mut map: BTreeMap<String, MonthTotals> = BTreeMap::new();
    for t in transactions {
        map.entry(month_key(t.date)).or_default().add(t);
    }
    map
}

/// Totals over the `days` days ending on `today` (inclusive).
pub fn last_days(transactions: &[Transaction], today: NaiveDate, days: i64) -> MonthTotals {
    let start = today - Duration::days(days);
    let mut totals = MonthTotals::default();
    for t in transactions.iter().filter(|t| t.date > start && t.date <= today) {
        totals.add(t);
    }
    totals
}

/// Expected income and expenses for `month` from transactions already dated in it.
pub fn project_month(transactions: &[Transaction], month: &str) -> Projection {
    let mut p = Projection {
        month: month.to_string(),
        ..Projection::default()
    };
    for t in transactions.iter().filter(|t| month_key(t.date) == month) {
        match (t.r#type, t.payment_method) {
            (TransactionType::Income, _) => p.income += t.amount,
            (TransactionType::Expense, PaymentMethod::Debit) => p.debit_expense += t.amount,
            (TransactionType::Expense, PaymentMethod::Credit) => p.credit_expense += t.amount,
        }
    }
    p
}

pub fn account_history(
    transactions: &[Transaction],
    account_id: i64,
) -> BTreeMap<String, MonthTotals> {
    let mut map: BTreeMap<String, MonthTotals> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.account_id == Some(account_id)) {
        map.entry(month_key(t.date)).or_default().add(t);
    }
    map
}

pub fn overview(state: &AppState, today: NaiveDate) -> Overview {
    let month = month_key(today);
    let month_totals = monthly_totals(&state.transactions)
        .remove(&month)
        .unwrap_or_default();
    Overview {
        total_balance: state.accounts.iter().map(|a| a.balance).sum(),
        month,
        month_totals,
        last_30_days: last_days(&state.transactions, today, 30),
        total_card_limit: state.cards.iter().map(|c| c.limit).sum(),
        total_card_available: state
            .cards
            .iter()
            .map(|c| card_usage(c, &state.transactions, today).available_limit)
            .sum(),
        next_month: project_month(&state.transactions, &next_month(today)),
    }
}

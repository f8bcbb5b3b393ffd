// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Installment purchases: splitting a purchase into monthly members and
//! collapsing those members back into a single display row.

use crate::error::RecordError;
use crate::models::{EntryKey, LedgerEntry, NewTransaction, Transaction, TransactionStatus};
use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

static INSTALLMENT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d+/\d+\)$").expect("static regex"));

/// Remove a trailing "(n/m)" marker from a description.
pub fn strip_installment_suffix(description: &str) -> String {
    INSTALLMENT_SUFFIX.replace(description, "").into_owned()
}

/// Collapse members of installment groups into one entry per group and sort
/// the result newest first.
pub fn group_transactions(transactions: &[Transaction]) -> Vec<LedgerEntry> {
    group_entries(transactions.iter().map(LedgerEntry::from).collect())
}

/// Same reduction as [`group_transactions`] over display rows. Synthetic group
/// rows carry no installment id, so feeding the output back in changes nothing.
pub fn group_entries(entries: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<LedgerEntry>> = HashMap::new();
    let mut singles = Vec::new();

    for e in entries {
        match e.installment_id.clone().filter(|id| !id.is_empty()) {
            Some(id) => {
                let bucket = buckets.entry(id.clone()).or_insert_with(|| {
                    order.push(id);
                    Vec::new()
                });
                bucket.push(e);
            }
            None => singles.push(e),
        }
    }

    let mut out = Vec::with_capacity(order.len() + singles.len());
    for id in order {
        if let Some(members) = buckets.remove(&id) {
            out.extend(collapse(id, members));
        }
    }
    out.extend(singles);
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

fn collapse(id: String, members: Vec<LedgerEntry>) -> Option<LedgerEntry> {
    let count = members.len();
    let total: Decimal = members.iter().map(|m| m.amount).sum();
    let any_pending = members.iter().any(|m| m.status.is_pending());
    let mut rep = members
        .into_iter()
        .min_by_key(|m| m.installment_num.unwrap_or(0))?;

    rep.description = format!(
        "{} ({}x)",
        strip_installment_suffix(&rep.description),
        count
    );
    rep.key = EntryKey::Group(id);
    rep.amount = total;
    rep.installment_id = None;
    rep.installment_num = None;
    if any_pending {
        rep.status = TransactionStatus::Pending;
    }
    rep.is_grouped = true;
    rep.installments = count;
    Some(rep)
}

/// Split a purchase of `total` into `count` monthly members starting on
/// `template.date`. Shares are rounded to cents and the first member absorbs
/// the remainder, so the members always add up to `total`.
pub fn plan_installments(
    template: NewTransaction,
    count: u32,
) -> Result<Vec<NewTransaction>, RecordError> {
    if count == 0 {
        return Err(RecordError::InvalidInstallmentCount(count));
    }
    if template.amount <= Decimal::ZERO {
        return Err(RecordError::NonPositiveAmount(template.amount.to_string()));
    }
    if count == 1 {
        return Ok(vec![NewTransaction {
            installment_id: None,
            installment_num: None,
            ..template
        }]);
    }

    let total = template.amount;
    let share = (total / Decimal::from(count)).round_dp(2);
    let first = total - share * Decimal::from(count - 1);
    let group_id = Uuid::new_v4().to_string();
    let base = strip_installment_suffix(&template.description);

    if share <= Decimal::ZERO || first <= Decimal::ZERO {
        return Err(RecordError::NonPositiveAmount(share.to_string()));
    }

    let plan = (1..=count)
        .map(|n| NewTransaction {
            description: format!("{} ({}/{})", base, n, count),
            amount: if n == 1 { first } else { share },
            date: add_months(template.date, n - 1),
            installment_id: Some(group_id.clone()),
            installment_num: Some(n),
            ..template.clone()
        })
        .collect();
    Ok(plan)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

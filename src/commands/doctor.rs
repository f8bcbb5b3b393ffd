// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{PaymentMethod, TransactionType};
use crate::state::AppState;
use crate::utils::{current_user, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

pub fn handle(conn: &Connection) -> Result<()> {
    let user = current_user(conn)?;
    let state = AppState::load(conn, &user)?;
    let rows = find_issues(&state);
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        for r in &rows {
            warn!(issue = %r[0], detail = %r[1], "integrity problem");
        }
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Integrity findings as `[issue, detail]` pairs.
pub fn find_issues(state: &AppState) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) Installment groups with duplicate or gapped numbering
    let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for t in &state.transactions {
        if let Some(id) = t.installment_id.as_deref() {
            groups
                .entry(id)
                .or_default()
                .push(t.installment_num.unwrap_or(0));
        }
    }
    for (id, mut nums) in groups {
        nums.sort_unstable();
        let expected: Vec<u32> = (1..=nums.len() as u32).collect();
        if nums != expected {
            rows.push(vec![
                "installment_numbering".into(),
                format!("{} has {:?}", id, nums),
            ]);
        }
    }

    // 2) Links to accounts or cards that no longer exist
    let accounts: HashSet<i64> = state.accounts.iter().map(|a| a.id).collect();
    let cards: HashSet<i64> = state.cards.iter().map(|c| c.id).collect();
    for t in &state.transactions {
        match t.payment_method {
            PaymentMethod::Debit if t.account_id.is_some_and(|id| !accounts.contains(&id)) => {
                rows.push(vec!["missing_account".into(), format!("transaction {}", t.id)]);
            }
            PaymentMethod::Credit if t.card_id.is_none() => {
                rows.push(vec!["credit_without_card".into(), format!("transaction {}", t.id)]);
            }
            PaymentMethod::Credit if t.card_id.is_some_and(|id| !cards.contains(&id)) => {
                rows.push(vec!["missing_card".into(), format!("transaction {}", t.id)]);
            }
            PaymentMethod::Credit if t.r#type == TransactionType::Income => {
                rows.push(vec!["card_income".into(), format!("transaction {}", t.id)]);
            }
            _ => {}
        }
    }

    // 3) Stored available limit drifting from the pending charges
    for c in &state.cards {
        let committed: Decimal = state
            .transactions
            .iter()
            .filter(|t| t.held_card() == Some(c.id))
            .map(|t| t.amount)
            .sum();
        if c.limit - committed != c.available_limit {
            rows.push(vec![
                "card_limit_drift".into(),
                format!(
                    "{}: stored {} vs computed {}",
                    c.bank,
                    c.available_limit,
                    c.limit - committed
                ),
            ]);
        }
    }
    rows
}

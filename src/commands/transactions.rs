// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::RecordError;
use crate::installments::{group_transactions, plan_installments};
use crate::models::{
    LedgerEntry, NewTransaction, PaymentMethod, Transaction, TransactionStatus, TransactionType,
};
use crate::state::AppState;
use crate::store::{self, GroupUpdate};
use crate::summary::month_key;
use crate::utils::{
    current_user, display_currency, fmt_money, maybe_print_json, parse_date, parse_decimal,
    parse_month, pretty_table,
};
use anyhow::{bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, &user, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, &user, sub)?,
        Some(("rm", sub)) => remove(conn, &user, sub)?,
        Some(("pay", sub)) => pay(conn, &user, sub)?,
        _ => {}
    }
    Ok(())
}

fn positive_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_decimal(raw)?;
    if amount <= Decimal::ZERO {
        return Err(RecordError::NonPositiveAmount(amount.to_string()).into());
    }
    Ok(amount)
}

fn add(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let description = sub.get_one::<String>("description").unwrap().trim().to_string();
    if description.is_empty() {
        bail!("Description cannot be empty");
    }
    let amount = positive_amount(sub.get_one::<String>("amount").unwrap())?;
    let r#type = sub.get_one::<String>("type").unwrap().parse::<TransactionType>()?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let account = match sub.get_one::<String>("account") {
        Some(bank) => Some(store::account_by_bank(conn, user, bank.trim())?),
        None => None,
    };
    let card = match sub.get_one::<String>("card") {
        Some(bank) => Some(store::card_by_bank(conn, user, bank.trim())?),
        None => None,
    };
    if card.is_some() && r#type == TransactionType::Income {
        bail!("Card transactions must be expenses; record refunds against an account");
    }
    let payment_method = if card.is_some() {
        PaymentMethod::Credit
    } else {
        PaymentMethod::Debit
    };
    let status = match sub.get_one::<String>("status") {
        Some(s) => s.parse::<TransactionStatus>()?,
        None if payment_method == PaymentMethod::Credit => TransactionStatus::Pending,
        None => TransactionStatus::Paid,
    };
    let count = sub.get_one::<u32>("installments").copied().unwrap_or(1);

    let plan = plan_installments(
        NewTransaction {
            description,
            amount,
            r#type,
            date,
            payment_method,
            account_id: account.as_ref().map(|a| a.id),
            card_id: card.as_ref().map(|c| c.id),
            installment_id: None,
            installment_num: None,
            status,
        },
        count,
    )?;

    if let Some(card) = &card {
        let preview: Vec<Transaction> = plan
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, t)| t.into_transaction(-(i as i64) - 1, user))
            .collect();
        let next = AppState::load(conn, user)?.with_transactions(preview);
        if let Some(after) = next.card(card.id) {
            if after.available_limit < Decimal::ZERO {
                warn!(
                    card = %card.bank,
                    available = %after.available_limit,
                    "purchase exceeds the card's available limit"
                );
            }
        }
    }

    let stored = store::insert_transactions(conn, user, plan)?;
    let ccy = display_currency(conn)?;
    match stored.as_slice() {
        [single] => println!(
            "Recorded {} {} on {} ({})",
            single.r#type,
            fmt_money(&single.amount, &ccy),
            single.date,
            single.description
        ),
        [first, ..] => println!(
            "Recorded {} installments of '{}' totalling {} (group {})",
            stored.len(),
            crate::installments::strip_installment_suffix(&first.description),
            fmt_money(&amount, &ccy),
            first.installment_id.as_deref().unwrap_or_default()
        ),
        [] => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_entries(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let user = current_user(conn)?;
        let ccy = display_currency(conn)?;
        let banks = link_names(conn, &user)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                let link = e
                    .account_id
                    .and_then(|id| banks.accounts.get(&id))
                    .or_else(|| e.card_id.and_then(|id| banks.cards.get(&id)))
                    .cloned()
                    .unwrap_or_default();
                vec![
                    e.key.to_string(),
                    e.date.to_string(),
                    e.description.clone(),
                    e.r#type.to_string(),
                    e.payment_method.to_string(),
                    fmt_money(&e.amount, &ccy),
                    e.status.to_string(),
                    link,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Type", "Method", "Amount", "Status", "Bank"],
                rows,
            )
        );
    }
    Ok(())
}

struct LinkNames {
    accounts: HashMap<i64, String>,
    cards: HashMap<i64, String>,
}

fn link_names(conn: &Connection, user: &str) -> Result<LinkNames> {
    Ok(LinkNames {
        accounts: store::list_accounts(conn, user)?
            .into_iter()
            .map(|a| (a.id, a.bank))
            .collect(),
        cards: store::list_cards(conn, user)?
            .into_iter()
            .map(|c| (c.id, format!("{} (card)", c.bank)))
            .collect(),
    })
}

/// Rows for `tx list`, filtered before grouping so a filtered view groups
/// only the installments it contains.
pub fn query_entries(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<LedgerEntry>> {
    let user = current_user(conn)?;
    let mut txs = store::list_transactions(conn, &user)?;

    if let Some(month) = sub.get_one::<String>("month") {
        let month = parse_month(month)?;
        txs.retain(|t| month_key(t.date) == month);
    }
    if let Some(bank) = sub.get_one::<String>("account") {
        let id = store::account_by_bank(conn, &user, bank.trim())?.id;
        txs.retain(|t| t.account_id == Some(id));
    }
    if let Some(bank) = sub.get_one::<String>("card") {
        let id = store::card_by_bank(conn, &user, bank.trim())?.id;
        txs.retain(|t| t.card_id == Some(id));
    }

    let mut entries = if sub.get_flag("grouped") {
        group_transactions(&txs)
    } else {
        txs.iter().map(LedgerEntry::from).collect()
    };
    if let Some(limit) = sub.get_one::<usize>("limit") {
        entries.truncate(*limit);
    }
    debug!(count = entries.len(), "listing transactions");
    Ok(entries)
}

fn edit(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let status = sub
        .get_one::<String>("status")
        .map(|s| s.parse::<TransactionStatus>())
        .transpose()?;
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if let Some(group) = sub.get_one::<String>("group") {
        if sub.contains_id("amount") || sub.contains_id("date") || sub.contains_id("type") {
            bail!("Only --description and --status can be changed for a whole group");
        }
        let change = GroupUpdate {
            description,
            status,
        };
        let updated = store::update_group(conn, user, group.trim(), &change)?;
        println!("Updated {} installments of group {}", updated.len(), group.trim());
        return Ok(());
    }

    let id = *sub.get_one::<i64>("id").unwrap();
    let mut t = store::get_transaction(conn, user, id)?;
    if let Some(d) = description {
        t.description = d;
    }
    if let Some(raw) = sub.get_one::<String>("amount") {
        t.amount = positive_amount(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("date") {
        t.date = parse_date(raw)?;
    }
    if let Some(raw) = sub.get_one::<String>("type") {
        t.r#type = raw.parse::<TransactionType>()?;
    }
    if let Some(s) = status {
        t.status = s;
    }
    if t.payment_method == PaymentMethod::Credit && t.r#type == TransactionType::Income {
        bail!("Card transactions must be expenses; record refunds against an account");
    }
    store::update_transaction(conn, &t)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn remove(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let before = AppState::load(conn, user)?;
    let (removed, after) = if let Some(group) = sub.get_one::<String>("group") {
        let group = group.trim();
        let removed = store::delete_group(conn, user, group)?;
        (removed, before.without_group(group))
    } else {
        let id = *sub.get_one::<i64>("id").unwrap();
        let removed = store::delete_transaction(conn, user, id)?;
        (vec![removed], before.without_transaction(id))
    };
    println!("Removed {} transaction(s)", removed.len());
    print_link_changes(conn, &after, &removed)
}

fn pay(conn: &mut Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(group) = sub.get_one::<String>("group") {
        let change = GroupUpdate {
            status: Some(TransactionStatus::Paid),
            ..GroupUpdate::default()
        };
        let updated = store::update_group(conn, user, group.trim(), &change)?;
        println!("Marked {} installments as paid", updated.len());
        return Ok(());
    }
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut t = store::get_transaction(conn, user, id)?;
    if t.status == TransactionStatus::Paid {
        println!("Transaction {} is already paid", id);
        return Ok(());
    }
    t.status = TransactionStatus::Paid;
    store::update_transaction(conn, &t)?;
    println!("Marked transaction {} as paid", id);
    Ok(())
}

fn print_link_changes(conn: &Connection, state: &AppState, removed: &[Transaction]) -> Result<()> {
    let ccy = display_currency(conn)?;
    let mut seen_accounts = Vec::new();
    let mut seen_cards = Vec::new();
    for t in removed {
        if let Some(a) = t.account_id.and_then(|id| state.account(id)) {
            if !seen_accounts.contains(&a.id) {
                seen_accounts.push(a.id);
                println!("Account '{}' balance: {}", a.bank, fmt_money(&a.balance, &ccy));
            }
        }
        if let Some(c) = t.card_id.and_then(|id| state.card(id)) {
            if !seen_cards.contains(&c.id) {
                seen_cards.push(c.id);
                println!(
                    "Card '{}' available limit: {}",
                    c.bank,
                    fmt_money(&c.available_limit, &ccy)
                );
            }
        }
    }
    Ok(())
}

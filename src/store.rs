// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed access to the accounts, cards and transactions tables.
//!
//! Rows are read into loosely typed `*Row` structs and converted into models
//! with `TryFrom`, so malformed values are rejected here rather than leaking
//! into the aggregation code.

use crate::error::RecordError;
use crate::models::{
    Account, Card, NewTransaction, PaymentMethod, Transaction, TransactionStatus, TransactionType,
};
use crate::state::Effect;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

const TX_COLUMNS: &str = "id, user_id, description, amount, type, date, payment_method, \
     account_id, card_id, installment_id, installment_num, status";

#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub amount: String,
    pub r#type: String,
    pub date: String,
    pub payment_method: String,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub installment_id: Option<String>,
    pub installment_num: Option<i64>,
    pub status: String,
}

impl TransactionRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<TransactionRow> {
        Ok(TransactionRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            description: r.get(2)?,
            amount: r.get(3)?,
            r#type: r.get(4)?,
            date: r.get(5)?,
            payment_method: r.get(6)?,
            account_id: r.get(7)?,
            card_id: r.get(8)?,
            installment_id: r.get(9)?,
            installment_num: r.get(10)?,
            status: r.get(11)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RecordError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let amount = parse_amount("transaction amount", &row.amount)?;
        if amount <= Decimal::ZERO {
            return Err(RecordError::NonPositiveAmount(row.amount));
        }
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .map_err(|_| RecordError::InvalidDate(row.date.clone()))?;
        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            description: row.description,
            amount,
            r#type: row.r#type.parse::<TransactionType>()?,
            date,
            payment_method: row.payment_method.parse::<PaymentMethod>()?,
            account_id: row.account_id,
            card_id: row.card_id,
            installment_id: row.installment_id.filter(|s| !s.trim().is_empty()),
            installment_num: row.installment_num.and_then(|n| u32::try_from(n).ok()),
            status: row.status.parse::<TransactionStatus>()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: i64,
    pub user_id: String,
    pub bank: String,
    pub balance: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = RecordError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            balance: parse_amount("account balance", &row.balance)?,
            id: row.id,
            user_id: row.user_id,
            bank: row.bank,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CardRow {
    pub id: i64,
    pub user_id: String,
    pub bank: String,
    pub limit: String,
    pub available_limit: String,
    pub closing_day: i64,
    pub due_day: i64,
}

impl TryFrom<CardRow> for Card {
    type Error = RecordError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        Ok(Card {
            limit: parse_amount("card limit", &row.limit)?,
            available_limit: parse_amount("available limit", &row.available_limit)?,
            closing_day: check_day("closing day", row.closing_day)?,
            due_day: check_day("due day", row.due_day)?,
            id: row.id,
            user_id: row.user_id,
            bank: row.bank,
        })
    }
}

pub fn parse_amount(field: &'static str, s: &str) -> Result<Decimal, RecordError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| RecordError::InvalidAmount {
            field,
            value: s.to_string(),
        })
}

pub fn check_day(field: &'static str, day: i64) -> Result<u32, RecordError> {
    if (1..=31).contains(&day) {
        Ok(day as u32)
    } else {
        Err(RecordError::DayOutOfRange { field, day })
    }
}

// Accounts

pub fn list_accounts(conn: &Connection, user_id: &str) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, bank, balance FROM accounts WHERE user_id=?1 ORDER BY bank",
    )?;
    let rows = stmt.query_map(params![user_id], read_account)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(Account::try_from(row?)?);
    }
    Ok(out)
}

pub fn account_by_bank(conn: &Connection, user_id: &str, bank: &str) -> Result<Account> {
    let row = conn
        .query_row(
            "SELECT id, user_id, bank, balance FROM accounts WHERE user_id=?1 AND bank=?2",
            params![user_id, bank],
            read_account,
        )
        .with_context(|| format!("Account '{}' not found", bank))?;
    Ok(Account::try_from(row)?)
}

pub fn insert_account(
    conn: &Connection,
    user_id: &str,
    bank: &str,
    balance: Decimal,
) -> Result<Account> {
    conn.execute(
        "INSERT INTO accounts(user_id, bank, balance) VALUES (?1, ?2, ?3)",
        params![user_id, bank, balance.to_string()],
    )
    .with_context(|| format!("Insert account '{}'", bank))?;
    info!(user_id, bank, %balance, "account added");
    Ok(Account {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        bank: bank.to_string(),
        balance,
    })
}

pub fn update_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET bank=?1, balance=?2 WHERE id=?3 AND user_id=?4",
        params![
            account.bank,
            account.balance.to_string(),
            account.id,
            account.user_id
        ],
    )?;
    info!(id = account.id, bank = %account.bank, "account updated");
    Ok(())
}

pub fn delete_account(conn: &Connection, user_id: &str, bank: &str) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM accounts WHERE user_id=?1 AND bank=?2",
        params![user_id, bank],
    )?;
    info!(user_id, bank, removed = n, "account removed");
    Ok(n)
}

fn read_account(r: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        bank: r.get(2)?,
        balance: r.get(3)?,
    })
}

// Cards

const CARD_COLUMNS: &str =
    "id, user_id, bank, credit_limit, available_limit, closing_day, due_day";

pub fn list_cards(conn: &Connection, user_id: &str) -> Result<Vec<Card>> {
    let sql = format!(
        "SELECT {} FROM cards WHERE user_id=?1 ORDER BY bank",
        CARD_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], read_card)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(Card::try_from(row?)?);
    }
    Ok(out)
}

pub fn card_by_bank(conn: &Connection, user_id: &str, bank: &str) -> Result<Card> {
    let sql = format!(
        "SELECT {} FROM cards WHERE user_id=?1 AND bank=?2",
        CARD_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![user_id, bank], read_card)
        .with_context(|| format!("Card '{}' not found", bank))?;
    Ok(Card::try_from(row)?)
}

pub fn insert_card(
    conn: &Connection,
    user_id: &str,
    bank: &str,
    limit: Decimal,
    closing_day: u32,
    due_day: u32,
) -> Result<Card> {
    check_day("closing day", closing_day as i64)?;
    check_day("due day", due_day as i64)?;
    conn.execute(
        "INSERT INTO cards(user_id, bank, credit_limit, available_limit, closing_day, due_day)
         VALUES (?1, ?2, ?3, ?3, ?4, ?5)",
        params![user_id, bank, limit.to_string(), closing_day, due_day],
    )
    .with_context(|| format!("Insert card '{}'", bank))?;
    info!(user_id, bank, %limit, closing_day, due_day, "card added");
    Ok(Card {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        bank: bank.to_string(),
        limit,
        available_limit: limit,
        closing_day,
        due_day,
    })
}

pub fn update_card(conn: &Connection, card: &Card) -> Result<()> {
    check_day("closing day", card.closing_day as i64)?;
    check_day("due day", card.due_day as i64)?;
    conn.execute(
        "UPDATE cards SET bank=?1, credit_limit=?2, available_limit=?3, closing_day=?4, due_day=?5
         WHERE id=?6 AND user_id=?7",
        params![
            card.bank,
            card.limit.to_string(),
            card.available_limit.to_string(),
            card.closing_day,
            card.due_day,
            card.id,
            card.user_id
        ],
    )?;
    info!(id = card.id, bank = %card.bank, "card updated");
    Ok(())
}

pub fn delete_card(conn: &Connection, user_id: &str, bank: &str) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM cards WHERE user_id=?1 AND bank=?2",
        params![user_id, bank],
    )?;
    info!(user_id, bank, removed = n, "card removed");
    Ok(n)
}

fn read_card(r: &Row<'_>) -> rusqlite::Result<CardRow> {
    Ok(CardRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        bank: r.get(2)?,
        limit: r.get(3)?,
        available_limit: r.get(4)?,
        closing_day: r.get(5)?,
        due_day: r.get(6)?,
    })
}

// Transactions

/// All transactions of a user, newest first.
pub fn list_transactions(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>> {
    query_transactions(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE user_id=?1 ORDER BY date DESC, id DESC",
            TX_COLUMNS
        ),
        params![user_id],
    )
}

pub fn get_transaction(conn: &Connection, user_id: &str, id: i64) -> Result<Transaction> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE user_id=?1 AND id=?2",
        TX_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![user_id, id], TransactionRow::read)
        .optional()?
        .with_context(|| format!("Transaction {} not found", id))?;
    Ok(Transaction::try_from(row)?)
}

/// Members of an installment group ordered by installment number.
pub fn group_members(
    conn: &Connection,
    user_id: &str,
    installment_id: &str,
) -> Result<Vec<Transaction>> {
    query_transactions(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE user_id=?1 AND installment_id=?2
             ORDER BY installment_num, id",
            TX_COLUMNS
        ),
        params![user_id, installment_id],
    )
}

fn query_transactions(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, TransactionRow::read)?;
    let mut out = Vec::new();
    for row in rows {
        let row = row?;
        let id = row.id;
        out.push(
            Transaction::try_from(row).with_context(|| format!("Malformed transaction {}", id))?,
        );
    }
    debug!(count = out.len(), "loaded transactions");
    Ok(out)
}

/// Store new transactions and apply their balance/limit effects atomically.
pub fn insert_transactions(
    conn: &mut Connection,
    user_id: &str,
    items: Vec<NewTransaction>,
) -> Result<Vec<Transaction>> {
    let tx = conn.transaction()?;
    let mut stored = Vec::with_capacity(items.len());
    for item in items {
        tx.execute(
            "INSERT INTO transactions(user_id, description, amount, type, date, payment_method,
                account_id, card_id, installment_id, installment_num, status)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                user_id,
                item.description,
                item.amount.to_string(),
                item.r#type.as_str(),
                item.date.to_string(),
                item.payment_method.as_str(),
                item.account_id,
                item.card_id,
                item.installment_id,
                item.installment_num,
                item.status.as_str()
            ],
        )?;
        let t = item.into_transaction(tx.last_insert_rowid(), user_id);
        apply_effect(&tx, Effect::of(&t))?;
        stored.push(t);
    }
    tx.commit()?;
    info!(user_id, count = stored.len(), "transactions recorded");
    Ok(stored)
}

/// Overwrite a stored transaction, moving balances from the old to the new values.
pub fn update_transaction(conn: &mut Connection, updated: &Transaction) -> Result<()> {
    let tx = conn.transaction()?;
    let old = get_transaction(&tx, &updated.user_id, updated.id)?;
    apply_effect(&tx, Effect::of(&old).reversed())?;
    tx.execute(
        "UPDATE transactions SET description=?1, amount=?2, type=?3, date=?4, payment_method=?5,
            account_id=?6, card_id=?7, installment_id=?8, installment_num=?9, status=?10
         WHERE id=?11 AND user_id=?12",
        params![
            updated.description,
            updated.amount.to_string(),
            updated.r#type.as_str(),
            updated.date.to_string(),
            updated.payment_method.as_str(),
            updated.account_id,
            updated.card_id,
            updated.installment_id,
            updated.installment_num,
            updated.status.as_str(),
            updated.id,
            updated.user_id
        ],
    )?;
    apply_effect(&tx, Effect::of(updated))?;
    tx.commit()?;
    info!(id = updated.id, "transaction updated");
    Ok(())
}

/// Fields that can be changed on every member of an installment group at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub description: Option<String>,
    pub status: Option<TransactionStatus>,
}

pub fn update_group(
    conn: &mut Connection,
    user_id: &str,
    installment_id: &str,
    change: &GroupUpdate,
) -> Result<Vec<Transaction>> {
    let members = group_members(conn, user_id, installment_id)?;
    if members.is_empty() {
        anyhow::bail!("Installment group '{}' not found", installment_id);
    }
    let total = members.len();
    let mut updated = Vec::with_capacity(total);
    for mut t in members {
        if let Some(base) = &change.description {
            let base = crate::installments::strip_installment_suffix(base);
            t.description = match t.installment_num {
                Some(n) => format!("{} ({}/{})", base, n, total),
                None => base,
            };
        }
        if let Some(status) = change.status {
            t.status = status;
        }
        updated.push(t);
    }
    let tx = conn.transaction()?;
    for t in &updated {
        let old = get_transaction(&tx, user_id, t.id)?;
        apply_effect(&tx, Effect::of(&old).reversed())?;
        tx.execute(
            "UPDATE transactions SET description=?1, status=?2 WHERE id=?3 AND user_id=?4",
            params![t.description, t.status.as_str(), t.id, user_id],
        )?;
        apply_effect(&tx, Effect::of(t))?;
    }
    tx.commit()?;
    info!(user_id, installment_id, count = updated.len(), "installment group updated");
    Ok(updated)
}

pub fn delete_transaction(conn: &mut Connection, user_id: &str, id: i64) -> Result<Transaction> {
    let tx = conn.transaction()?;
    let old = get_transaction(&tx, user_id, id)?;
    tx.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    apply_effect(&tx, Effect::of(&old).reversed())?;
    tx.commit()?;
    info!(user_id, id, "transaction removed");
    Ok(old)
}

pub fn delete_group(
    conn: &mut Connection,
    user_id: &str,
    installment_id: &str,
) -> Result<Vec<Transaction>> {
    let tx = conn.transaction()?;
    let members = group_members(&tx, user_id, installment_id)?;
    if members.is_empty() {
        anyhow::bail!("Installment group '{}' not found", installment_id);
    }
    tx.execute(
        "DELETE FROM transactions WHERE user_id=?1 AND installment_id=?2",
        params![user_id, installment_id],
    )?;
    for t in &members {
        apply_effect(&tx, Effect::of(t).reversed())?;
    }
    tx.commit()?;
    info!(user_id, installment_id, count = members.len(), "installment group removed");
    Ok(members)
}

fn apply_effect(conn: &Connection, effect: Effect) -> Result<()> {
    if effect.is_empty() {
        return Ok(());
    }
    if let Some((id, delta)) = effect.account {
        let cur: Option<String> = conn
            .query_row(
                "SELECT balance FROM accounts WHERE id=?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        match cur {
            Some(s) => {
                let next = parse_amount("account balance", &s)? + delta;
                conn.execute(
                    "UPDATE accounts SET balance=?1 WHERE id=?2",
                    params![next.to_string(), id],
                )?;
            }
            None => warn!(account_id = id, "transaction references a missing account"),
        }
    }
    if let Some((id, delta)) = effect.card {
        let cur: Option<String> = conn
            .query_row(
                "SELECT available_limit FROM cards WHERE id=?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        match cur {
            Some(s) => {
                let next = parse_amount("available limit", &s)? + delta;
                conn.execute(
                    "UPDATE cards SET available_limit=?1 WHERE id=?2",
                    params![next.to_string(), id],
                )?;
            }
            None => warn!(card_id = id, "transaction references a missing card"),
        }
    }
    Ok(())
}

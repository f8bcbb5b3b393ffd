// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Snapshot of one user's accounts, cards and transactions.
//!
//! Views read from an [`AppState`]; changes produce a new snapshot instead of
//! mutating shared state. [`Effect`] describes what a transaction does to the
//! running account balance and card limit, and is shared with the store so
//! in-memory and persisted balances move the same way.

use crate::cycle::{card_usage, CardUsage};
use crate::models::{Account, Card, PaymentMethod, Transaction};
use crate::store;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effect {
    pub account: Option<(i64, Decimal)>,
    pub card: Option<(i64, Decimal)>,
}

impl Effect {
    pub fn of(t: &Transaction) -> Effect {
        let account = match (t.payment_method, t.account_id) {
            (PaymentMethod::Debit, Some(id)) => Some((id, t.signed_amount())),
            _ => None,
        };
        let card = t.held_card().map(|id| (id, -t.amount));
        Effect { account, card }
    }

    pub fn reversed(self) -> Effect {
        Effect {
            account: self.account.map(|(id, d)| (id, -d)),
            card: self.card.map(|(id, d)| (id, -d)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.account.is_none() && self.card.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user_id: String,
    pub accounts: Vec<Account>,
    pub cards: Vec<Card>,
    pub transactions: Vec<Transaction>,
}

impl AppState {
    pub fn load(conn: &Connection, user_id: &str) -> Result<AppState> {
        Ok(AppState {
            user_id: user_id.to_string(),
            accounts: store::list_accounts(conn, user_id)?,
            cards: store::list_cards(conn, user_id)?,
            transactions: store::list_transactions(conn, user_id)?,
        })
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn card(&self, id: i64) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_usage(&self, card_id: i64, today: NaiveDate) -> Option<CardUsage> {
        self.card(card_id)
            .map(|c| card_usage(c, &self.transactions, today))
    }

    /// Snapshot with `added` recorded and their effects applied.
    pub fn with_transactions(mut self, added: Vec<Transaction>) -> AppState {
        for t in added {
            self.apply(Effect::of(&t));
            self.transactions.push(t);
        }
        self
    }

    /// Snapshot with `updated` replacing the stored transaction of the same id.
    pub fn with_replaced(mut self, updated: Transaction) -> AppState {
        if let Some(pos) = self.transactions.iter().position(|t| t.id == updated.id) {
            let old = self.transactions.remove(pos);
            self.apply(Effect::of(&old).reversed());
            self.apply(Effect::of(&updated));
            self.transactions.insert(pos, updated);
        }
        self
    }

    pub fn without_transaction(self, id: i64) -> AppState {
        self.without(|t| t.id == id)
    }

    pub fn without_group(self, installment_id: &str) -> AppState {
        self.without(|t| t.installment_id.as_deref() == Some(installment_id))
    }

    fn without(mut self, pred: impl Fn(&Transaction) -> bool) -> AppState {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.transactions.drain(..).partition(|t| pred(t));
        self.transactions = kept;
        for t in &removed {
            self.apply(Effect::of(t).reversed());
        }
        self
    }

    fn apply(&mut self, effect: Effect) {
        if let Some((id, delta)) = effect.account {
            if let Some(a) = self.accounts.iter_mut().find(|a| a.id == id) {
                a.balance += delta;
            }
        }
        if let Some((id, delta)) = effect.card {
            if let Some(c) = self.cards.iter_mut().find(|c| c.id == id) {
                c.available_limit += delta;
            }
        }
    }
}

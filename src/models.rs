// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::RecordError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// How a transaction was paid. `Debit` covers direct debit, pix and cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Paid,
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(RecordError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum!(TransactionType, "transaction type", { Income => "income", Expense => "expense" });
text_enum!(PaymentMethod, "payment method", { Debit => "debit", Credit => "credit" });
text_enum!(TransactionStatus, "status", { Pending => "pending", Paid => "paid" });

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub amount: Decimal, // always positive; sign comes from `type`
    pub r#type: TransactionType,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub installment_id: Option<String>,
    pub installment_num: Option<u32>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Card whose limit this transaction holds: only pending credit expenses do.
    pub fn held_card(&self) -> Option<i64> {
        match (self.payment_method, self.r#type) {
            (PaymentMethod::Credit, TransactionType::Expense) if self.is_pending() => self.card_id,
            _ => None,
        }
    }
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub installment_id: Option<String>,
    pub installment_num: Option<u32>,
    pub status: TransactionStatus,
}

impl NewTransaction {
    pub fn into_transaction(self, id: i64, user_id: &str) -> Transaction {
        Transaction {
            id,
            user_id: user_id.to_string(),
            description: self.description,
            amount: self.amount,
            r#type: self.r#type,
            date: self.date,
            payment_method: self.payment_method,
            account_id: self.account_id,
            card_id: self.card_id,
            installment_id: self.installment_id,
            installment_num: self.installment_num,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: String,
    pub bank: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub user_id: String,
    pub bank: String,
    pub limit: Decimal,
    pub available_limit: Decimal,
    pub closing_day: u32, // 1..=31
    pub due_day: u32,     // 1..=31
}

/// Identity of a display row: a stored transaction or an installment group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntryKey {
    Transaction(i64),
    Group(String),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Transaction(id) => write!(f, "{}", id),
            EntryKey::Group(id) => f.write_str(id),
        }
    }
}

/// One row of the transaction list as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: EntryKey,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub installment_id: Option<String>,
    pub installment_num: Option<u32>,
    pub status: TransactionStatus,
    pub is_grouped: bool,
    pub installments: usize,
}

impl From<&Transaction> for LedgerEntry {
    fn from(t: &Transaction) -> Self {
        LedgerEntry {
            key: EntryKey::Transaction(t.id),
            description: t.description.clone(),
            amount: t.amount,
            r#type: t.r#type,
            date: t.date,
            payment_method: t.payment_method,
            account_id: t.account_id,
            card_id: t.card_id,
            installment_id: t.installment_id.clone(),
            installment_num: t.installment_num,
            status: t.status,
            is_grouped: false,
            installments: 1,
        }
    }
}

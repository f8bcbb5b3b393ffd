// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::models::{
    Account, Card, PaymentMethod, Transaction, TransactionStatus, TransactionType,
};
use pennywise::state::AppState;
use pennywise::summary::{
    account_history, last_days, month_key, monthly_totals, next_month, overview, project_month,
};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn tx(
    id: i64,
    kind: TransactionType,
    method: PaymentMethod,
    amount: &str,
    date: &str,
) -> Transaction {
    Transaction {
        id,
        user_id: "default".into(),
        description: format!("t{}", id),
        amount: dec(amount),
        r#type: kind,
        date: d(date),
        payment_method: method,
        account_id: if method == PaymentMethod::Debit { Some(1) } else { None },
        card_id: if method == PaymentMethod::Credit { Some(1) } else { None },
        installment_id: None,
        installment_num: None,
        status: if method == PaymentMethod::Credit {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Paid
        },
    }
}

fn sample() -> Vec<Transaction> {
    use PaymentMethod::*;
    use TransactionType::*;
    vec![
        tx(1, Income, Debit, "3000", "2025-05-05"),
        tx(2, Expense, Debit, "1200", "2025-05-10"),
        tx(3, Expense, Credit, "150.50", "2025-05-20"),
        tx(4, Income, Debit, "3000", "2025-06-05"),
        tx(5, Expense, Credit, "99.90", "2025-06-07"),
        tx(6, Expense, Credit, "80", "2025-07-07"),
        tx(7, Expense, Debit, "1200", "2025-07-10"),
    ]
}

#[test]
fn month_keys_are_zero_padded() {
    assert_eq!(month_key(d("2025-03-09")), "2025-03");
    assert_eq!(next_month(d("2025-03-09")), "2025-04");
    assert_eq!(next_month(d("2025-12-31")), "2026-01");
}

#[test]
fn monthly_totals_are_chronological() {
    let m = monthly_totals(&sample());
    let keys: Vec<&String> = m.keys().collect();
    assert_eq!(keys, vec!["2025-05", "2025-06", "2025-07"]);
    let may = m["2025-05"];
    assert_eq!(may.income, dec("3000"));
    assert_eq!(may.expense, dec("1350.50"));
    assert_eq!(may.balance(), dec("1649.50"));
    assert_eq!(m["2025-07"].income, Decimal::ZERO);
}

#[test]
fn last_thirty_days_window_excludes_start() {
    let txs = sample();
    // window is (2025-06-06, 2025-07-06]
    let t = last_days(&txs, d("2025-07-06"), 30);
    assert_eq!(t.expense, dec("99.90"));
    assert_eq!(t.income, Decimal::ZERO);

    let t = last_days(&txs, d("2025-07-04"), 30);
    assert_eq!(t.income, dec("3000"));
    assert_eq!(t.expense, dec("99.90"));
}

#[test]
fn projection_splits_expenses_by_method() {
    let p = project_month(&sample(), "2025-07");
    assert_eq!(p.month, "2025-07");
    assert_eq!(p.credit_expense, dec("80"));
    assert_eq!(p.debit_expense, dec("1200"));
    assert_eq!(p.expense(), dec("1280"));
    assert_eq!(p.income, Decimal::ZERO);

    let empty = project_month(&sample(), "2026-01");
    assert!(empty.expense().is_zero());
}

#[test]
fn account_history_only_counts_linked_transactions() {
    let h = account_history(&sample(), 1);
    assert_eq!(h.len(), 3);
    assert_eq!(h["2025-05"].expense, dec("1200"));
    assert_eq!(h["2025-06"].expense, Decimal::ZERO);
    assert!(account_history(&sample(), 2).is_empty());
}

#[test]
fn overview_combines_accounts_cards_and_projection() {
    let state = AppState {
        user_id: "default".into(),
        accounts: vec![Account {
            id: 1,
            user_id: "default".into(),
            bank: "Itau".into(),
            balance: dec("2500"),
        }],
        cards: vec![Card {
            id: 1,
            user_id: "default".into(),
            bank: "Nubank".into(),
            limit: dec("2000"),
            available_limit: dec("1669.60"),
            closing_day: 1,
            due_day: 10,
        }],
        transactions: sample(),
    };
    let o = overview(&state, d("2025-06-20"));
    assert_eq!(o.month, "2025-06");
    assert_eq!(o.total_balance, dec("2500"));
    assert_eq!(o.month_totals.income, dec("3000"));
    assert_eq!(o.total_card_limit, dec("2000"));
    assert_eq!(o.total_card_available, dec("1669.60"));
    assert_eq!(o.next_month.month, "2025-07");
    assert_eq!(o.next_month.expense(), dec("1280"));
}

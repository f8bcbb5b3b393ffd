// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::installments::plan_installments;
use pennywise::models::{NewTransaction, PaymentMethod, TransactionStatus, TransactionType};
use pennywise::state::AppState;
use pennywise::store::{self, GroupUpdate};
use pennywise::{db, utils};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

const USER: &str = "default";

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    store::insert_account(&conn, USER, "Itau", dec("1000")).unwrap();
    store::insert_card(&conn, USER, "Nubank", dec("5000"), 10, 20).unwrap();
    conn
}

fn new_tx(
    desc: &str,
    amount: &str,
    kind: TransactionType,
    method: PaymentMethod,
    link: i64,
    date: &str,
) -> NewTransaction {
    NewTransaction {
        description: desc.into(),
        amount: dec(amount),
        r#type: kind,
        date: d(date),
        payment_method: method,
        account_id: (method == PaymentMethod::Debit).then_some(link),
        card_id: (method == PaymentMethod::Credit).then_some(link),
        installment_id: None,
        installment_num: None,
        status: if method == PaymentMethod::Credit {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Paid
        },
    }
}

#[test]
fn debit_transactions_move_account_balance() {
    let mut conn = setup();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    store::insert_transactions(
        &mut conn,
        USER,
        vec![
            new_tx("Salary", "2500", TransactionType::Income, PaymentMethod::Debit, acct.id, "2025-05-05"),
            new_tx("Rent", "1200.50", TransactionType::Expense, PaymentMethod::Debit, acct.id, "2025-05-06"),
        ],
    )
    .unwrap();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    assert_eq!(acct.balance, dec("2299.50"));
}

#[test]
fn installment_purchase_reserves_full_amount_and_delete_group_releases_it() {
    let mut conn = setup();
    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    let plan = plan_installments(
        new_tx("Notebook", "3000", TransactionType::Expense, PaymentMethod::Credit, card.id, "2025-05-12"),
        3,
    )
    .unwrap();
    let stored = store::insert_transactions(&mut conn, USER, plan).unwrap();
    assert_eq!(stored.len(), 3);
    let card_after = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    assert_eq!(card_after.available_limit, dec("2000"));

    let gid = stored[0].installment_id.clone().unwrap();
    let members = store::group_members(&conn, USER, &gid).unwrap();
    let nums: Vec<Option<u32>> = members.iter().map(|t| t.installment_num).collect();
    assert_eq!(nums, vec![Some(1), Some(2), Some(3)]);

    let removed = store::delete_group(&mut conn, USER, &gid).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(store::list_transactions(&conn, USER).unwrap().is_empty());
    let card_final = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    assert_eq!(card_final.available_limit, dec("5000"));
}

#[test]
fn paying_a_charge_frees_the_limit() {
    let mut conn = setup();
    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    let stored = store::insert_transactions(
        &mut conn,
        USER,
        vec![new_tx("Groceries", "250", TransactionType::Expense, PaymentMethod::Credit, card.id, "2025-05-02")],
    )
    .unwrap();
    let mut t = stored[0].clone();
    t.status = TransactionStatus::Paid;
    store::update_transaction(&mut conn, &t).unwrap();

    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("5000"));
    let reloaded = store::get_transaction(&conn, USER, t.id).unwrap();
    assert_eq!(reloaded.status, TransactionStatus::Paid);
}

#[test]
fn editing_amount_replaces_the_old_effect() {
    let mut conn = setup();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    let stored = store::insert_transactions(
        &mut conn,
        USER,
        vec![new_tx("Gym", "100", TransactionType::Expense, PaymentMethod::Debit, acct.id, "2025-05-02")],
    )
    .unwrap();
    let mut t = stored[0].clone();
    t.amount = dec("80");
    store::update_transaction(&mut conn, &t).unwrap();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    assert_eq!(acct.balance, dec("920"));

    store::delete_transaction(&mut conn, USER, t.id).unwrap();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    assert_eq!(acct.balance, dec("1000"));
}

#[test]
fn group_update_resuffixes_descriptions() {
    let mut conn = setup();
    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    let plan = plan_installments(
        new_tx("TV", "900", TransactionType::Expense, PaymentMethod::Credit, card.id, "2025-01-15"),
        3,
    )
    .unwrap();
    let stored = store::insert_transactions(&mut conn, USER, plan).unwrap();
    let gid = stored[0].installment_id.clone().unwrap();

    let change = GroupUpdate {
        description: Some("Television (1/3)".into()),
        status: Some(TransactionStatus::Paid),
    };
    let updated = store::update_group(&mut conn, USER, &gid, &change).unwrap();
    let descs: Vec<&str> = updated.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descs, vec!["Television (1/3)", "Television (2/3)", "Television (3/3)"]);

    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("5000"));
    assert!(store::update_group(&mut conn, USER, "missing", &change).is_err());
}

#[test]
fn rows_are_scoped_to_the_user() {
    let mut conn = setup();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    store::insert_transactions(
        &mut conn,
        USER,
        vec![new_tx("Coffee", "5", TransactionType::Expense, PaymentMethod::Debit, acct.id, "2025-05-02")],
    )
    .unwrap();
    assert_eq!(store::list_transactions(&conn, USER).unwrap().len(), 1);
    assert!(store::list_transactions(&conn, "someone-else").unwrap().is_empty());
    assert!(store::account_by_bank(&conn, "someone-else", "Itau").is_err());

    utils::set_current_user(&conn, "someone-else").unwrap();
    assert_eq!(utils::current_user(&conn).unwrap(), "someone-else");
}

#[test]
fn malformed_rows_are_rejected_at_the_boundary() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, description, amount, type, date, payment_method, status)
         VALUES (?1, 'Broken', 'abc', 'expense', '2025-05-01', 'debit', 'paid')",
        params![USER],
    )
    .unwrap();
    let err = store::list_transactions(&conn, USER).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid amount 'abc'"));
}

#[test]
fn blank_installment_fields_become_none() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, description, amount, type, date, payment_method,
            installment_id, installment_num, status)
         VALUES (?1, 'Lunch', '20', 'expense', '2025-05-01', 'debit', '  ', -1, 'paid')",
        params![USER],
    )
    .unwrap();
    let txs = store::list_transactions(&conn, USER).unwrap();
    assert_eq!(txs[0].installment_id, None);
    assert_eq!(txs[0].installment_num, None);
}

#[test]
fn card_days_are_validated() {
    let conn = setup();
    assert!(store::insert_card(&conn, USER, "Inter", dec("100"), 0, 10).is_err());
    assert!(store::insert_card(&conn, USER, "Inter", dec("100"), 5, 32).is_err());
}

#[test]
fn snapshot_updates_match_persisted_effects() {
    let mut conn = setup();
    let acct = store::account_by_bank(&conn, USER, "Itau").unwrap();
    let card = store::card_by_bank(&conn, USER, "Nubank").unwrap();
    let before = AppState::load(&conn, USER).unwrap();

    let stored = store::insert_transactions(
        &mut conn,
        USER,
        vec![
            new_tx("Market", "150", TransactionType::Expense, PaymentMethod::Debit, acct.id, "2025-05-03"),
            new_tx("Shoes", "320", TransactionType::Expense, PaymentMethod::Credit, card.id, "2025-05-04"),
        ],
    )
    .unwrap();
    let in_memory = before.clone().with_transactions(stored.clone());
    let persisted = AppState::load(&conn, USER).unwrap();
    assert_eq!(in_memory.accounts, persisted.accounts);
    assert_eq!(in_memory.cards, persisted.cards);

    let shoes = stored[1].id;
    let after_rm = in_memory.without_transaction(shoes);
    store::delete_transaction(&mut conn, USER, shoes).unwrap();
    let persisted = AppState::load(&conn, USER).unwrap();
    assert_eq!(after_rm.cards, persisted.cards);
    assert_eq!(after_rm.transactions.len(), 1);
}

#[test]
fn snapshot_replace_and_group_removal() {
    let conn = setup();
    let state = AppState::load(&conn, USER).unwrap();
    let card = state.cards[0].clone();
    let plan = plan_installments(
        new_tx("Bike", "600", TransactionType::Expense, PaymentMethod::Credit, card.id, "2025-02-01"),
        2,
    )
    .unwrap();
    let gid = plan[0].installment_id.clone().unwrap();
    let txs = plan
        .into_iter()
        .enumerate()
        .map(|(i, t)| t.into_transaction(i as i64 + 10, USER))
        .collect();
    let state = state.with_transactions(txs);
    assert_eq!(state.card(card.id).unwrap().available_limit, dec("4400"));

    let mut paid = state.transactions[0].clone();
    paid.status = TransactionStatus::Paid;
    let state = state.with_replaced(paid);
    assert_eq!(state.card(card.id).unwrap().available_limit, dec("4700"));

    let usage = state.card_usage(card.id, d("2025-02-05")).unwrap();
    assert_eq!(usage.limit_used, dec("300"));

    let state = state.without_group(&gid);
    assert!(state.transactions.is_empty());
    assert_eq!(state.card(card.id).unwrap().available_limit, dec("5000"));
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::models::{EntryKey, PaymentMethod, TransactionStatus};
use pennywise::{cli, commands::transactions, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    store::insert_account(&conn, "default", "Itau", dec("1000")).unwrap();
    store::insert_card(&conn, "default", "Nubank", dec("5000"), 10, 20).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pennywise", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn list(conn: &Connection, args: &[&str]) -> Vec<pennywise::models::LedgerEntry> {
    let mut argv = vec!["pennywise", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_entries(conn, list_m).unwrap();
        }
    }
    panic!("no list subcommand");
}

#[test]
fn add_card_purchase_in_installments() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--description", " Notebook ", "--amount", "3000", "--type", "expense",
            "--date", "2025-01-05", "--card", "Nubank", "--installments", "3",
        ],
    )
    .unwrap();

    let txs = store::list_transactions(&conn, "default").unwrap();
    assert_eq!(txs.len(), 3);
    assert!(txs.iter().all(|t| t.payment_method == PaymentMethod::Credit));
    assert!(txs.iter().all(|t| t.status == TransactionStatus::Pending));
    assert_eq!(txs[0].description, "Notebook (3/3)");
    assert_eq!(txs[0].date.to_string(), "2025-03-05");

    let card = store::card_by_bank(&conn, "default", "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("2000"));

    let grouped = list(&conn, &["--grouped"]);
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].description, "Notebook (3x)");
    assert_eq!(grouped[0].amount, dec("3000"));
    assert!(matches!(grouped[0].key, EntryKey::Group(_)));
}

#[test]
fn add_debit_defaults_to_paid_and_moves_balance() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--description", "Salary", "--amount", "4200", "--type", "income",
            "--date", "2025-02-01", "--account", "Itau",
        ],
    )
    .unwrap();
    let txs = store::list_transactions(&conn, "default").unwrap();
    assert_eq!(txs[0].status, TransactionStatus::Paid);
    assert_eq!(txs[0].payment_method, PaymentMethod::Debit);
    let acct = store::account_by_bank(&conn, "default", "Itau").unwrap();
    assert_eq!(acct.balance, dec("5200"));
}

#[test]
fn add_rejects_bad_input() {
    let mut conn = setup();
    assert!(run(
        &mut conn,
        &["add", "--description", "X", "--amount", "0", "--type", "expense", "--date", "2025-02-01"],
    )
    .is_err());
    assert!(run(
        &mut conn,
        &["add", "--description", "X", "--amount", "5", "--type", "transfer", "--date", "2025-02-01"],
    )
    .is_err());
    assert!(run(
        &mut conn,
        &["add", "--description", "X", "--amount", "5", "--type", "expense", "--card", "Nope"],
    )
    .is_err());
    assert!(store::list_transactions(&conn, "default").unwrap().is_empty());
}

#[test]
fn list_filters_limit_and_month() {
    let mut conn = setup();
    for (desc, date) in [("A", "2025-01-03"), ("B", "2025-01-09"), ("C", "2025-02-01")] {
        run(
            &mut conn,
            &[
                "add", "--description", desc, "--amount", "10", "--type", "expense",
                "--date", date, "--account", "Itau",
            ],
        )
        .unwrap();
    }
    let rows = list(&conn, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description, "C");

    let jan = list(&conn, &["--month", "2025-01"]);
    assert_eq!(jan.len(), 2);
    assert_eq!(jan[0].date.to_string(), "2025-01-09");

    assert!(list(&conn, &["--card", "Nubank"]).is_empty());
    assert_eq!(list(&conn, &["--account", "Itau"]).len(), 3);
}

#[test]
fn edit_pay_and_remove_a_group() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--description", "TV", "--amount", "1200", "--type", "expense",
            "--date", "2025-01-15", "--card", "Nubank", "--installments", "4",
        ],
    )
    .unwrap();
    let gid = store::list_transactions(&conn, "default").unwrap()[0]
        .installment_id
        .clone()
        .unwrap();

    assert!(run(&mut conn, &["edit", "--group", gid.as_str(), "--amount", "10"]).is_err());
    run(&mut conn, &["edit", "--group", gid.as_str(), "--description", "Smart TV"]).unwrap();
    let members = store::group_members(&conn, "default", &gid).unwrap();
    assert_eq!(members[3].description, "Smart TV (4/4)");

    run(&mut conn, &["pay", "--group", gid.as_str()]).unwrap();
    let card = store::card_by_bank(&conn, "default", "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("5000"));

    run(&mut conn, &["rm", "--group", gid.as_str()]).unwrap();
    assert!(store::list_transactions(&conn, "default").unwrap().is_empty());
}

#[test]
fn edit_and_remove_single_transaction() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--description", "Dinner", "--amount", "90", "--type", "expense",
            "--date", "2025-03-03", "--card", "Nubank",
        ],
    )
    .unwrap();
    let id = store::list_transactions(&conn, "default").unwrap()[0].id;
    let id_s = id.to_string();

    run(&mut conn, &["edit", "--id", id_s.as_str(), "--amount", "120", "--date", "2025-03-04"]).unwrap();
    let t = store::get_transaction(&conn, "default", id).unwrap();
    assert_eq!(t.amount, dec("120"));
    assert_eq!(t.date.to_string(), "2025-03-04");
    let card = store::card_by_bank(&conn, "default", "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("4880"));

    run(&mut conn, &["pay", "--id", id_s.as_str()]).unwrap();
    let card = store::card_by_bank(&conn, "default", "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("5000"));

    run(&mut conn, &["rm", "--id", id_s.as_str()]).unwrap();
    assert!(store::get_transaction(&conn, "default", id).is_err());
    assert!(run(&mut conn, &["rm", "--id", id_s.as_str()]).is_err());
}

#[test]
fn unpadded_month_filter_matches() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--description", "Pharmacy", "--amount", "45", "--type", "expense",
            "--date", "2025-03-05", "--account", "Itau",
        ],
    )
    .unwrap();
    assert_eq!(list(&conn, &["--month", "2025-3"]).len(), 1);
    assert_eq!(list(&conn, &["--month", "2025-03"]).len(), 1);
    assert!(list(&conn, &["--month", "2025-4"]).is_empty());
}

#[test]
fn card_income_is_rejected() {
    let mut conn = setup();
    let refund = [
        "add", "--description", "Refund", "--amount", "40", "--type", "income",
        "--date", "2025-03-05", "--card", "Nubank",
    ];
    assert!(run(&mut conn, &refund).is_err());
    assert!(store::list_transactions(&conn, "default").unwrap().is_empty());

    run(
        &mut conn,
        &[
            "add", "--description", "Shoes", "--amount", "100", "--type", "expense",
            "--date", "2025-03-05", "--card", "Nubank",
        ],
    )
    .unwrap();
    let id_s = store::list_transactions(&conn, "default").unwrap()[0].id.to_string();
    assert!(run(&mut conn, &["edit", "--id", id_s.as_str(), "--type", "income"]).is_err());

    let card = store::card_by_bank(&conn, "default", "Nubank").unwrap();
    assert_eq!(card.available_limit, dec("4900"));
    let state = pennywise::state::AppState::load(&conn, "default").unwrap();
    let usage = state
        .card_usage(card.id, chrono::NaiveDate::from_ymd_opt(2025, 3, 6).unwrap())
        .unwrap();
    assert_eq!(usage.available_limit, card.available_limit);
}

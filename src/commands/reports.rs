// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::state::AppState;
use crate::store;
use crate::summary::{
    account_history, monthly_totals, next_month, overview, project_month, MonthTotals,
};
use crate::utils::{
    current_user, display_currency, fmt_money, maybe_print_json, month_end, parse_month,
    pretty_table, today_arg,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("forecast", sub)) => forecast(conn, sub)?,
        Some(("account", sub)) => account(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    pub month: String,
    pub income: rust_decimal::Decimal,
    pub expense: rust_decimal::Decimal,
    pub balance: rust_decimal::Decimal,
}

impl MonthRow {
    fn new(month: String, t: MonthTotals) -> MonthRow {
        MonthRow {
            month,
            income: t.income,
            expense: t.expense,
            balance: t.balance(),
        }
    }
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let today = today_arg(sub)?;
    let state = AppState::load(conn, &user)?;
    let o = overview(&state, today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &o)? {
        let ccy = display_currency(conn)?;
        let rows = vec![
            vec!["Total balance".into(), fmt_money(&o.total_balance, &ccy)],
            vec![format!("Income {}", o.month), fmt_money(&o.month_totals.income, &ccy)],
            vec![format!("Expense {}", o.month), fmt_money(&o.month_totals.expense, &ccy)],
            vec!["Income last 30 days".into(), fmt_money(&o.last_30_days.income, &ccy)],
            vec!["Expense last 30 days".into(), fmt_money(&o.last_30_days.expense, &ccy)],
            vec!["Card limit".into(), fmt_money(&o.total_card_limit, &ccy)],
            vec!["Card available".into(), fmt_money(&o.total_card_available, &ccy)],
            vec![
                format!("Expected expenses {}", o.next_month.month),
                fmt_money(&o.next_month.expense(), &ccy),
            ],
        ];
        println!("{}", pretty_table(&["Summary", "Value"], rows));
    }
    Ok(())
}

/// Most recent `months` buckets in chronological order.
pub fn monthly_rows(conn: &Connection, months: usize) -> Result<Vec<MonthRow>> {
    let user = current_user(conn)?;
    let txs = store::list_transactions(conn, &user)?;
    let totals = monthly_totals(&txs);
    let skip = totals.len().saturating_sub(months);
    Ok(totals
        .into_iter()
        .skip(skip)
        .map(|(m, t)| MonthRow::new(m, t))
        .collect())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let data = monthly_rows(conn, months)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        print_months(conn, &data)?;
    }
    Ok(())
}

fn forecast(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => next_month(today_arg(sub)?),
    };
    let txs = store::list_transactions(conn, &user)?;
    let p = project_month(&txs, &month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        let ccy = display_currency(conn)?;
        let rows = vec![
            vec!["Income".into(), fmt_money(&p.income, &ccy)],
            vec!["Debit expenses".into(), fmt_money(&p.debit_expense, &ccy)],
            vec!["Card expenses".into(), fmt_money(&p.credit_expense, &ccy)],
            vec!["Total expenses".into(), fmt_money(&p.expense(), &ccy)],
            vec![
                "Projected balance".into(),
                fmt_money(&(p.income - p.expense()), &ccy),
            ],
        ];
        let header = format!("Forecast through {}", month_end(&month)?);
        println!("{}", pretty_table(&[header.as_str(), "Amount"], rows));
    }
    Ok(())
}

fn account(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let bank = sub.get_one::<String>("bank").unwrap().trim();
    let acct = store::account_by_bank(conn, &user, bank)?;
    let txs = store::list_transactions(conn, &user)?;
    let data: Vec<MonthRow> = account_history(&txs, acct.id)
        .into_iter()
        .map(|(m, t)| MonthRow::new(m, t))
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        print_months(conn, &data)?;
        println!(
            "Current balance: {}",
            fmt_money(&acct.balance, &display_currency(conn)?)
        );
    }
    Ok(())
}

fn print_months(conn: &Connection, data: &[MonthRow]) -> Result<()> {
    let ccy = display_currency(conn)?;
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.month.clone(),
                fmt_money(&r.income, &ccy),
                fmt_money(&r.expense, &ccy),
                fmt_money(&r.balance, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Balance"], rows)
    );
    Ok(())
}

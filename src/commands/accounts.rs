// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{
    current_user, display_currency, fmt_money, maybe_print_json, parse_decimal, pretty_table,
};
use anyhow::{bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            let balance = match sub.get_one::<String>("balance") {
                Some(raw) => parse_decimal(raw)?,
                None => Decimal::ZERO,
            };
            store::insert_account(conn, &user, bank, balance)?;
            println!("Added account '{}' with balance {}", bank, balance);
        }
        Some(("list", sub)) => {
            let accounts = store::list_accounts(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let ccy = display_currency(conn)?;
                let data = accounts
                    .iter()
                    .map(|a| vec![a.bank.clone(), fmt_money(&a.balance, &ccy)])
                    .collect();
                println!("{}", pretty_table(&["Bank", "Balance"], data));
            }
        }
        Some(("edit", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            let mut account = store::account_by_bank(conn, &user, bank)?;
            if let Some(new_bank) = sub.get_one::<String>("new_bank") {
                account.bank = new_bank.trim().to_string();
            }
            if let Some(raw) = sub.get_one::<String>("balance") {
                account.balance = parse_decimal(raw)?;
            }
            store::update_account(conn, &account)?;
            println!("Updated account '{}'", account.bank);
        }
        Some(("rm", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            if store::delete_account(conn, &user, bank)? == 0 {
                bail!("Account '{}' not found", bank);
            }
            println!("Removed account '{}'", bank);
        }
        _ => {}
    }
    Ok(())
}

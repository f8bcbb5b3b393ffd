// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cycle::{card_usage, CardUsage};
use crate::store;
use crate::utils::{
    current_user, display_currency, fmt_money, maybe_print_json, parse_decimal, pretty_table,
    today_arg,
};
use anyhow::{bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn card_limit(raw: &str) -> Result<Decimal> {
    let limit = parse_decimal(raw)?;
    if limit < Decimal::ZERO {
        bail!("Card limit cannot be negative, got {}", limit);
    }
    Ok(limit)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            let limit = card_limit(sub.get_one::<String>("limit").unwrap())?;
            let closing = *sub.get_one::<u32>("closing_day").unwrap();
            let due = *sub.get_one::<u32>("due_day").unwrap();
            store::insert_card(conn, &user, bank, limit, closing, due)?;
            println!(
                "Added card '{}' (limit {}, closes on {}, due on {})",
                bank, limit, closing, due
            );
        }
        Some(("list", sub)) => {
            let cards = store::list_cards(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cards)? {
                let ccy = display_currency(conn)?;
                let data = cards
                    .iter()
                    .map(|c| {
                        vec![
                            c.bank.clone(),
                            fmt_money(&c.limit, &ccy),
                            fmt_money(&c.available_limit, &ccy),
                            c.closing_day.to_string(),
                            c.due_day.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Bank", "Limit", "Available", "Closes", "Due"], data)
                );
            }
        }
        Some(("edit", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            let mut card = store::card_by_bank(conn, &user, bank)?;
            if let Some(new_bank) = sub.get_one::<String>("new_bank") {
                card.bank = new_bank.trim().to_string();
            }
            if let Some(raw) = sub.get_one::<String>("limit") {
                let limit = card_limit(raw)?;
                // keep the amount already committed when the limit changes
                card.available_limit += limit - card.limit;
                card.limit = limit;
            }
            if let Some(day) = sub.get_one::<u32>("closing_day") {
                card.closing_day = *day;
            }
            if let Some(day) = sub.get_one::<u32>("due_day") {
                card.due_day = *day;
            }
            store::update_card(conn, &card)?;
            println!("Updated card '{}'", card.bank);
        }
        Some(("rm", sub)) => {
            let bank = sub.get_one::<String>("bank").unwrap().trim();
            if store::delete_card(conn, &user, bank)? == 0 {
                bail!("Card '{}' not found", bank);
            }
            println!("Removed card '{}'", bank);
        }
        Some(("status", sub)) => status(conn, &user, sub)?,
        _ => {}
    }
    Ok(())
}

fn status(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let data = usage_rows(conn, user, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = display_currency(conn)?;
        let rows = data
            .iter()
            .map(|u| {
                vec![
                    u.bank.clone(),
                    fmt_money(&u.limit, &ccy),
                    fmt_money(&u.limit_used, &ccy),
                    fmt_money(&u.current_invoice, &ccy),
                    fmt_money(&u.available_limit, &ccy),
                    format!("{:.1}%", u.percent_used),
                    u.cycle_end.to_string(),
                    u.due_date.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Card", "Limit", "Used", "Invoice", "Available", "Used %", "Closes", "Due"],
                rows
            )
        );
    }
    Ok(())
}

pub fn usage_rows(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<Vec<CardUsage>> {
    let today = today_arg(sub)?;
    let cards = match sub.get_one::<String>("bank") {
        Some(bank) => vec![store::card_by_bank(conn, user, bank.trim())?],
        None => store::list_cards(conn, user)?,
    };
    let transactions = store::list_transactions(conn, user)?;
    Ok(cards
        .iter()
        .map(|c| card_usage(c, &transactions, today))
        .collect())
}

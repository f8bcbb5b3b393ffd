// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::installments::group_transactions;
use crate::models::LedgerEntry;
use crate::store;
use crate::utils::current_user;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let user = current_user(conn)?;
    let mut txs = store::list_transactions(conn, &user)?;
    txs.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    let entries: Vec<LedgerEntry> = if sub.get_flag("grouped") {
        let mut grouped = group_transactions(&txs);
        grouped.reverse();
        grouped
    } else {
        txs.iter().map(LedgerEntry::from).collect()
    };

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "id",
                "date",
                "description",
                "type",
                "payment_method",
                "amount",
                "status",
                "account_id",
                "card_id",
                "installment_id",
                "installment_num",
                "installments",
            ])?;
            for e in &entries {
                wtr.write_record([
                    e.key.to_string(),
                    e.date.to_string(),
                    e.description.clone(),
                    e.r#type.to_string(),
                    e.payment_method.to_string(),
                    e.amount.to_string(),
                    e.status.to_string(),
                    e.account_id.map(|v| v.to_string()).unwrap_or_default(),
                    e.card_id.map(|v| v.to_string()).unwrap_or_default(),
                    e.installment_id.clone().unwrap_or_default(),
                    e.installment_num.map(|v| v.to_string()).unwrap_or_default(),
                    e.installments.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "id": e.key.to_string(),
                        "date": e.date,
                        "description": e.description,
                        "type": e.r#type,
                        "payment_method": e.payment_method,
                        "amount": e.amount.to_string(),
                        "status": e.status,
                        "account_id": e.account_id,
                        "card_id": e.card_id,
                        "installment_id": e.installment_id,
                        "installment_num": e.installment_num,
                        "installments": e.installments,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    info!(path = %out, count = entries.len(), "exported transactions");
    println!("Exported {} transactions to {}", entries.len(), out);
    Ok(())
}

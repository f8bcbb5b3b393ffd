// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    current_user, display_currency, pretty_table, set_current_user, set_display_currency,
};
use anyhow::{bail, Result};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec!["user".to_string(), current_user(conn)?],
                vec!["currency".to_string(), display_currency(conn)?],
                vec![
                    "database".to_string(),
                    crate::db::db_path()?.display().to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-user", sub)) => {
            let user = sub.get_one::<String>("user").unwrap().trim();
            if user.is_empty() {
                bail!("User id cannot be empty");
            }
            set_current_user(conn, user)?;
            info!(user, "active user changed");
            println!("Active user set to '{}'", user);
        }
        Some(("set-currency", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
            set_display_currency(conn, &ccy)?;
            println!("Display currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}

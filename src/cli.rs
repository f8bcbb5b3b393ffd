// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Evaluate as of this date instead of the local date")
}

fn bank_arg(required: bool) -> Arg {
    Arg::new("bank")
        .long("bank")
        .required(required)
        .help("Bank name")
}

/// `--id N` or `--group G`, exactly one.
fn target_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("id")
            .long("id")
            .value_parser(value_parser!(i64))
            .help("Transaction id"),
    )
    .arg(
        Arg::new("group")
            .long("group")
            .help("Installment group id (applies to every installment)"),
    )
    .group(
        ArgGroup::new("target")
            .args(["id", "group"])
            .required(true),
    )
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal finance tracker: accounts, credit cards, installments and forecasts")
        .version(clap::crate_version!())
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .help("error|warn|info|debug|trace (default: $PENNYWISE_LOG or warn)"),
        )
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("config")
                .about("Active user and display settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-user")
                        .arg(Arg::new("user").long("user").required(true)),
                )
                .subcommand(
                    Command::new("set-currency")
                        .arg(Arg::new("currency").long("currency").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Bank accounts")
                .subcommand(
                    Command::new("add")
                        .arg(bank_arg(true))
                        .arg(Arg::new("balance").long("balance").help("Opening balance")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(bank_arg(true))
                        .arg(Arg::new("new_bank").long("new-bank"))
                        .arg(Arg::new("balance").long("balance")),
                )
                .subcommand(Command::new("rm").arg(bank_arg(true))),
        )
        .subcommand(
            Command::new("card")
                .about("Credit cards")
                .subcommand(
                    Command::new("add")
                        .arg(bank_arg(true))
                        .arg(Arg::new("limit").long("limit").required(true))
                        .arg(
                            Arg::new("closing_day")
                                .long("closing-day")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=31)),
                        )
                        .arg(
                            Arg::new("due_day")
                                .long("due-day")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=31)),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(bank_arg(true))
                        .arg(Arg::new("new_bank").long("new-bank"))
                        .arg(Arg::new("limit").long("limit"))
                        .arg(
                            Arg::new("closing_day")
                                .long("closing-day")
                                .value_parser(value_parser!(u32).range(1..=31)),
                        )
                        .arg(
                            Arg::new("due_day")
                                .long("due-day")
                                .value_parser(value_parser!(u32).range(1..=31)),
                        ),
                )
                .subcommand(Command::new("rm").arg(bank_arg(true)))
                .subcommand(json_flags(
                    Command::new("status")
                        .about("Limit used, open invoice and available limit")
                        .arg(bank_arg(false))
                        .arg(today_arg()),
                )),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .help("Defaults to today"),
                        )
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .help("Debit from / credit to this bank account"),
                        )
                        .arg(
                            Arg::new("card")
                                .long("card")
                                .conflicts_with("account")
                                .help("Charge this credit card"),
                        )
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .value_parser(value_parser!(u32))
                                .requires("card")
                                .help("Split a card purchase into monthly installments"),
                        )
                        .arg(Arg::new("status").long("status").help("pending|paid")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("card").long("card"))
                        .arg(
                            Arg::new("grouped")
                                .long("grouped")
                                .action(ArgAction::SetTrue)
                                .help("Show installment purchases as one row"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(target_args(
                    Command::new("edit")
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("status").long("status")),
                ))
                .subcommand(target_args(Command::new("rm")))
                .subcommand(target_args(
                    Command::new("pay").about("Mark as paid"),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries and projections")
                .subcommand(json_flags(Command::new("summary").arg(today_arg())))
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("months")
                            .long("months")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("forecast")
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_name("YYYY-MM")
                                .help("Defaults to next month"),
                        )
                        .arg(today_arg()),
                ))
                .subcommand(json_flags(Command::new("account").arg(bank_arg(true)))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(
                        Arg::new("grouped")
                            .long("grouped")
                            .action(ArgAction::SetTrue),
                    ),
            ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for integrity problems"))
}

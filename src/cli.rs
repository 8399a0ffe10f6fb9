// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (defaults to the current month)")
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track income and expenses month by month")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    json_flags(
                        Command::new("list")
                            .about("List a month, newest first")
                            .arg(month_arg())
                            .arg(
                                Arg::new("pages")
                                    .long("pages")
                                    .value_parser(value_parser!(usize))
                                    .default_value("1")
                                    .help("How many pages to load"),
                            ),
                    ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .help("expense|income"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD (defaults to today)"),
                        )
                        .arg(
                            Arg::new("receipt")
                                .long("receipt")
                                .help("Path to a receipt image to attach"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of a transaction")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(Command::new("count").about("Number of stored transactions"))
                .subcommand(
                    Command::new("clear")
                        .about("Delete every transaction")
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm deletion"),
                        ),
                ),
        )
        .subcommand(json_flags(
            Command::new("stats")
                .about("Totals, category breakdown and six-month trend")
                .arg(month_arg()),
        ))
        .subcommand(
            Command::new("months")
                .about("Which years and months hold transactions")
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export transactions as CSV")
                .arg(
                    Arg::new("range")
                        .long("range")
                        .value_parser(["month", "year", "all"])
                        .default_value("all"),
                )
                .arg(month_arg())
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value(".")
                        .help("Directory to write the CSV file into"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Read a receipt image and pre-fill an expense")
                .arg(Arg::new("image").long("image").required(true))
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Record the scanned expense"),
                )
                .arg(
                    Arg::new("upload")
                        .long("upload")
                        .action(ArgAction::SetTrue)
                        .help("Store the image and attach it to the transaction"),
                ),
        )
}

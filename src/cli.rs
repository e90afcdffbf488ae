// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

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
            .help("Print one JSON object per line"),
    )
}

fn item_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("label").long("label").help("Short description"))
        .arg(Arg::new("detail").long("detail").help("Long description"))
        .arg(
            Arg::new("amount")
                .long("amount")
                .allow_hyphen_values(true)
                .help("Unit amount"),
        )
        .arg(
            Arg::new("qty")
                .long("qty")
                .allow_hyphen_values(true)
                .help("Quantity"),
        )
}

fn invoice_cmd() -> Command {
    Command::new("invoice")
        .about("Create, edit and file invoices")
        .subcommand_required(true)
        .subcommand(Command::new("new").about("Create an invoice with placeholder values"))
        .subcommand(json_flags(
            Command::new("list")
                .about("List invoices")
                .arg(
                    Arg::new("trash")
                        .long("trash")
                        .action(ArgAction::SetTrue)
                        .help("List the trash bin instead"),
                )
                .arg(Arg::new("client").long("client").help("Client contains"))
                .arg(Arg::new("receipt").long("receipt").help("Receipt number contains"))
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .default_value("created")
                        .help("receipt|client|status|created"),
                )
                .arg(
                    Arg::new("order")
                        .long("order")
                        .default_value("desc")
                        .help("asc|desc"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .default_value("10")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one invoice with its items and totals")
                .arg(Arg::new("id").required(true)),
        ))
        .subcommand(
            Command::new("set")
                .about("Change header fields; totals are recomputed")
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("client").long("client"))
                .arg(Arg::new("tax-id").long("tax-id").help("RNC"))
                .arg(Arg::new("receipt").long("receipt").help("Fiscal receipt number"))
                .arg(Arg::new("term").long("term").help("Payment term"))
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("currency").long("currency").help("RD$|US$"))
                .arg(Arg::new("status").long("status").help("pendiente|pago|rechazado"))
                .arg(
                    Arg::new("discount")
                        .long("discount")
                        .allow_hyphen_values(true),
                )
                .arg(
                    Arg::new("tax")
                        .long("tax")
                        .action(ArgAction::SetTrue)
                        .help("Apply ITBIS"),
                )
                .arg(
                    Arg::new("no-tax")
                        .long("no-tax")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("tax")
                        .help("Do not apply ITBIS"),
                )
                .arg(Arg::new("date").long("date").help("Invoice date YYYY-MM-DD"))
                .arg(Arg::new("paid-on").long("paid-on").help("Payment date YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("dup")
                .about("Duplicate an invoice")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("trash")
                .about("Move an invoice to the trash bin")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("restore")
                .about("Take an invoice out of the trash bin")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an invoice permanently")
                .arg(Arg::new("id").required(true)),
        )
}

fn item_cmd() -> Command {
    Command::new("item")
        .about("Edit invoice line items")
        .subcommand_required(true)
        .subcommand(item_fields(
            Command::new("add")
                .about("Append a line item")
                .arg(Arg::new("invoice").required(true)),
        ))
        .subcommand(item_fields(
            Command::new("set")
                .about("Change a line item")
                .arg(Arg::new("invoice").required(true))
                .arg(Arg::new("item").required(true)),
        ))
        .subcommand(
            Command::new("rm")
                .about("Remove a line item")
                .arg(Arg::new("invoice").required(true))
                .arg(Arg::new("item").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .version(crate_version!())
        .about("Invoice register with line items, ITBIS totals and a trash bin")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("BILLFOLD_DB")
                .help("Database file"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Act as this user instead of the logged-in one"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("login")
                .about("Remember the acting user")
                .arg(Arg::new("user-id").required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the acting user"))
        .subcommand(Command::new("whoami").about("Show the acting user"))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-currency")
                        .about("Currency label for new invoices")
                        .arg(Arg::new("currency").required(true)),
                ),
        )
        .subcommand(invoice_cmd())
        .subcommand(item_cmd())
        .subcommand(
            Command::new("export")
                .about("Export invoices")
                .subcommand_required(true)
                .subcommand(
                    Command::new("invoices")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(
                            Arg::new("trash")
                                .long("trash")
                                .action(ArgAction::SetTrue)
                                .help("Export the trash bin instead"),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored invoices for inconsistencies"))
}

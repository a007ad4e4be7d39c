// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn req(id: &'static str) -> Arg {
    Arg::new(id).long(id).required(true)
}

fn opt(id: &'static str) -> Arg {
    Arg::new(id).long(id)
}

fn month_arg() -> Arg {
    opt("month").help("Calendar month YYYY-MM (defaults to the current month)")
}

pub fn build_cli() -> Command {
    Command::new("hisaab")
        .about("Personal finance ledger with notification capture and a Zakat calculator")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database if it does not exist"))
        .subcommand(account_cmd())
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
        .subcommand(goal_cmd())
        .subcommand(report_cmd())
        .subcommand(rates_cmd())
        .subcommand(zakat_cmd())
        .subcommand(ingest_cmd())
        .subcommand(export_cmd())
        .subcommand(config_cmd())
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand(
            Command::new("add")
                .arg(req("name"))
                .arg(
                    opt("type")
                        .default_value("bank")
                        .help("bank | credit-card"),
                )
                .arg(
                    opt("amount")
                        .default_value("0")
                        .help("Opening balance (bank) or current outstanding (credit card)"),
                )
                .arg(opt("issuer"))
                .arg(opt("statement-day").value_parser(value_parser!(u32).range(1..=31)))
                .arg(opt("color")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("rm").arg(req("name")))
        .subcommand(Command::new("rename").arg(req("name")).arg(req("to")))
        .subcommand(
            Command::new("set-opening")
                .about("Edit a bank account's opening balance")
                .arg(req("name"))
                .arg(req("amount").allow_hyphen_values(true)),
        )
        .subcommand(
            Command::new("set-outstanding")
                .about("Record a credit card's current outstanding")
                .arg(req("name"))
                .arg(req("amount")),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and list transactions")
        .subcommand(
            Command::new("add")
                .arg(req("account"))
                .arg(req("amount"))
                .arg(req("type").help("debit | credit"))
                .arg(req("category"))
                .arg(opt("at").help("RFC 3339 instant or YYYY-MM-DD (defaults to now)")),
        )
        .subcommand(
            Command::new("list")
                .arg(opt("account"))
                .arg(opt("category"))
                .arg(opt("type"))
                .arg(opt("month").help("Calendar month YYYY-MM"))
                .arg(opt("limit").value_parser(value_parser!(usize)))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("edit")
                .arg(req("id").value_parser(value_parser!(i64)))
                .arg(opt("account"))
                .arg(opt("amount"))
                .arg(opt("type"))
                .arg(opt("category"))
                .arg(opt("at")),
        )
        .subcommand(Command::new("rm").arg(req("id").value_parser(value_parser!(i64))))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly category budgets")
        .subcommand(
            Command::new("set")
                .arg(req("category"))
                .arg(req("limit"))
                .arg(opt("icon")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("rm").arg(req("category")))
        .subcommand(Command::new("progress").arg(month_arg()).arg(json_flag()))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand(
            Command::new("add")
                .arg(req("name"))
                .arg(req("target"))
                .arg(opt("deadline").help("YYYY-MM-DD"))
                .arg(opt("icon"))
                .arg(opt("color")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("top-up").arg(req("name")).arg(req("amount")))
        .subcommand(Command::new("withdraw").arg(req("name")).arg(req("amount")))
        .subcommand(Command::new("rm").arg(req("name")))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Derived figures")
        .subcommand(Command::new("balance").arg(json_flag()))
        .subcommand(
            Command::new("spend-by-category")
                .arg(month_arg())
                .arg(json_flag()),
        )
        .subcommand(Command::new("safe-to-spend").arg(json_flag()))
        .subcommand(Command::new("cash-flow").arg(month_arg()).arg(json_flag()))
}

fn rates_cmd() -> Command {
    Command::new("rates")
        .about("Gold and silver market rates")
        .subcommand(
            Command::new("add")
                .arg(req("metal"))
                .arg(opt("per-gram"))
                .arg(opt("per-tola"))
                .group(
                    ArgGroup::new("rate")
                        .args(["per-gram", "per-tola"])
                        .required(true),
                ),
        )
        .subcommand(Command::new("latest").arg(opt("metal")).arg(json_flag()))
        .subcommand(
            Command::new("list")
                .arg(opt("metal"))
                .arg(
                    opt("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Scrape the current rate once and store it")
                .arg(opt("metal"))
                .arg(opt("url")),
        )
        .subcommand(
            Command::new("watch")
                .about("Fetch rates on a fixed period until interrupted")
                .arg(opt("url")),
        )
}

fn zakat_cmd() -> Command {
    Command::new("zakat")
        .about("Zakat calculator")
        .subcommand(
            Command::new("calculate")
                .arg(opt("metal").help("Nisab standard: gold | silver"))
                .arg(opt("cash"))
                .arg(opt("jewelry"))
                .arg(opt("unit").default_value("tola"))
                .arg(opt("other"))
                .arg(opt("debts"))
                .arg(json_flag()),
        )
        .subcommand(Command::new("wizard").about("Step through the calculation interactively"))
        .subcommand(Command::new("history").arg(json_flag()))
}

fn ingest_cmd() -> Command {
    Command::new("ingest")
        .about("Capture transactions from payment-app notifications")
        .subcommand(
            Command::new("notification")
                .arg(req("source").help("Source app id"))
                .arg(req("text"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("file")
                .about("CSV with a source,text header")
                .arg(req("path")),
        )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data")
        .subcommand(
            Command::new("transactions")
                .arg(req("format").help("csv | json"))
                .arg(req("out")),
        )
        .subcommand(
            Command::new("zakat-history")
                .arg(req("format").help("csv | json"))
                .arg(req("out")),
        )
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Settings")
        .subcommand(Command::new("set").arg(req("key")).arg(req("value")))
        .subcommand(Command::new("get").arg(req("key")))
        .subcommand(Command::new("unset").arg(req("key")))
        .subcommand(Command::new("list"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn rates_add_needs_one_rate() {
        let err = build_cli().try_get_matches_from(["hisaab", "rates", "add", "--metal", "gold"]);
        assert!(err.is_err());
        let ok = build_cli().try_get_matches_from([
            "hisaab", "rates", "add", "--metal", "gold", "--per-tola", "240000",
        ]);
        assert!(ok.is_ok());
    }
}

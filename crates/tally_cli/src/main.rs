//! Ledger inspection CLI.
//!
//! # Responsibility
//! - Open a ledger database and print its people, bills and owed amounts.
//! - Without a database path, print the core version as a linkage probe.
//!
//! Usage: `tally_cli [DB_PATH]`. Set `TALLY_LOG_DIR` to an absolute path to
//! enable file logging.

use std::process::ExitCode;
use tally_core::db::open_db;
use tally_core::{LedgerService, SqliteKvRepository};

const LOG_DIR_ENV: &str = "TALLY_LOG_DIR";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = tally_core::init_logging(tally_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(db_path) = std::env::args().nth(1) else {
        println!("tally_core version={}", tally_core::core_version());
        return ExitCode::SUCCESS;
    };

    match print_summary(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_summary module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let ledger = LedgerService::open(SqliteKvRepository::new(&conn))?;
    let amounts = ledger.payer_amounts();

    println!("people:");
    for person in ledger.list_with_status() {
        let status = if person.paid { "paid" } else { "owing" };
        println!("  {} [{status}]", person.name);
        for (date, amount) in amounts.get(&person.name).into_iter().flatten() {
            let mark = if person.paid_on(date) { "x" } else { " " };
            println!("    [{mark}] {date} {amount:.2}");
        }
    }

    println!("bills:");
    for bill in ledger.bills() {
        let payers = bill.payer_names().join(", ");
        println!(
            "  #{} {} {} {:.2} ({payers})",
            bill.id, bill.date, bill.description, bill.amount
        );
    }
    println!("total: {:.2}", ledger.total_amount());

    Ok(())
}

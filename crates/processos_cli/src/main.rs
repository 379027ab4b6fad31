//! Terminal shell for the case list.
//!
//! # Responsibility
//! - Open the slot database, run the load sequence and print the table.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `processos_cli <db_path> [fallback_location]`
//!
//! Without `fallback_location` the seed comes from `PROCESSOS_FALLBACK_URL`,
//! or from `/processos.json` under `PROCESSOS_ASSET_BASE`.

use processos_core::db::open_db;
use processos_core::{Coordinator, CoreConfig, Screen, SqliteSlotRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        eprintln!("usage: processos_cli <db_path> [fallback_location]");
        return ExitCode::from(2);
    };
    let mut config = CoreConfig::from_env();
    if let Some(location) = args.next() {
        config.fallback_location = location;
    }

    match run(&db_path, &config) {
        Ok(screen) => {
            print!("{screen}");
            if matches!(screen, Screen::Error { .. }) {
                println!();
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("processos_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str, config: &CoreConfig) -> Result<Screen, String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let mut coordinator = Coordinator::from_config(SqliteSlotRepository::new(&conn), config);
    let source = config.deferred_fallback_source();
    coordinator.start(&source).map_err(|err| err.to_string())?;
    Ok(coordinator.render())
}

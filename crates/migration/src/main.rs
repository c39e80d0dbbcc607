//! Standalone schema tool for the ledger database.
//!
//! `DATABASE_URL` selects the database (defaults to `./tracefund.db`).
//! Commands: `up [steps]`, `down [steps]`, `fresh`, `status`.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const USAGE: &str = "usage: migration [up [steps] | down [steps] | fresh | status]";

fn steps(arg: Option<String>) -> Result<Option<u32>, Box<dyn std::error::Error + Send + Sync>> {
    match arg {
        None => Ok(None),
        Some(raw) => Ok(Some(raw.parse()?)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "up".to_string());
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./tracefund.db?mode=rwc".to_string());

    let db = Database::connect(&db_url).await?;

    match command.as_str() {
        "up" => {
            let pending = migration::Migrator::get_pending_migrations(&db).await?;
            migration::Migrator::up(&db, steps(args.next())?).await?;
            println!("applied up to {} pending migration(s)", pending.len());
        }
        "down" => {
            // Rolling back the ledger drops matches; one step unless told otherwise.
            migration::Migrator::down(&db, Some(steps(args.next())?.unwrap_or(1))).await?;
            println!("rolled back");
        }
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

use std::{error::Error, io};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use csv::Writer;
use engine::{
    Engine, Match, MediaKind, MoneyCents, NewDonation, NewDonor, NewExpenditure, NewMedia,
    PassOutcome,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tracefund_admin")]
#[command(about = "Admin utilities for Tracefund (record ledger entries, inspect matches)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tracefund.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Donor(Donor),
    Donation(Donation),
    Expenditure(Expenditure),
    Media(Media),
    /// Run a matching pass and print what it created.
    Match,
    /// Print a donor's dashboard.
    Dashboard(DashboardArgs),
    /// Write the whole match ledger as CSV to stdout.
    Export,
}

#[derive(Args, Debug)]
struct Donor {
    #[command(subcommand)]
    command: DonorCommand,
}

#[derive(Subcommand, Debug)]
enum DonorCommand {
    Create(DonorCreateArgs),
    Contact(DonorContactArgs),
}

#[derive(Args, Debug)]
struct DonorCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct DonorContactArgs {
    #[arg(long)]
    id: Uuid,
    /// Omit to clear the email.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct Donation {
    #[command(subcommand)]
    command: DonationCommand,
}

#[derive(Subcommand, Debug)]
enum DonationCommand {
    Record(DonationRecordArgs),
}

#[derive(Args, Debug)]
struct DonationRecordArgs {
    #[arg(long)]
    donor: Uuid,
    /// Decimal amount, e.g. `25.00`.
    #[arg(long)]
    amount: MoneyCents,
    /// RFC3339 timestamp; defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct Expenditure {
    #[command(subcommand)]
    command: ExpenditureCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenditureCommand {
    Record(ExpenditureRecordArgs),
}

#[derive(Args, Debug)]
struct ExpenditureRecordArgs {
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    cause: String,
    #[arg(long)]
    description: Option<String>,
    /// RFC3339 timestamp; defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct Media {
    #[command(subcommand)]
    command: MediaCommand,
}

#[derive(Subcommand, Debug)]
enum MediaCommand {
    Add(MediaAddArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Image,
    Video,
    Document,
    Link,
}

impl From<Kind> for MediaKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Image => MediaKind::Image,
            Kind::Video => MediaKind::Video,
            Kind::Document => MediaKind::Document,
            Kind::Link => MediaKind::Link,
        }
    }
}

#[derive(Args, Debug)]
struct MediaAddArgs {
    #[arg(long)]
    expenditure: Uuid,
    #[arg(long, value_enum)]
    kind: Kind,
    #[arg(long)]
    url: String,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(long)]
    donor: Uuid,
}

#[derive(Serialize)]
struct ExportRow {
    id: String,
    donation_id: String,
    expenditure_id: String,
    allocated_minor: i64,
    created_at: String,
}

impl From<&Match> for ExportRow {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.to_string(),
            donation_id: m.donation_id.to_string(),
            expenditure_id: m.expenditure_id.to_string(),
            allocated_minor: m.allocated.cents(),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

fn write_matches<W: io::Write>(out: W, matches: &[Match]) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut writer = Writer::from_writer(out);
    for m in matches {
        writer.serialize(ExportRow::from(m))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_outcome(outcome: &PassOutcome) {
    match outcome {
        PassOutcome::Completed(created) => println!("matching: {} new match(es)", created.len()),
        PassOutcome::Scheduled => println!("matching: scheduled"),
        PassOutcome::Failed(err) => eprintln!("matching failed, rerun `match`: {err}"),
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build()?;

    match cli.command {
        Command::Donor(Donor {
            command: DonorCommand::Create(args),
        }) => {
            let mut cmd = NewDonor::new(args.name);
            if let Some(email) = args.email {
                cmd = cmd.email(email);
            }
            let donor = engine.new_donor(cmd).await?;
            println!("created donor: {} ({})", donor.name, donor.id);
        }
        Command::Donor(Donor {
            command: DonorCommand::Contact(args),
        }) => {
            let donor = engine
                .update_donor_contact(args.id, args.email.as_deref())
                .await?;
            println!(
                "updated donor {}: email {}",
                donor.id,
                donor.email.as_deref().unwrap_or("<none>")
            );
        }
        Command::Donation(Donation {
            command: DonationCommand::Record(args),
        }) => {
            let at = args.at.unwrap_or_else(Utc::now);
            let recorded = engine
                .record_donation(NewDonation::new(args.donor, args.amount, at))
                .await?;
            println!("recorded donation: {} ({})", recorded.record.amount, recorded.record.id);
            print_outcome(&recorded.matching);
        }
        Command::Expenditure(Expenditure {
            command: ExpenditureCommand::Record(args),
        }) => {
            let at = args.at.unwrap_or_else(Utc::now);
            let mut cmd = NewExpenditure::new(args.amount, args.cause, at);
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let recorded = engine.record_expenditure(cmd).await?;
            println!(
                "recorded expenditure: {} for {} ({})",
                recorded.record.amount, recorded.record.cause, recorded.record.id
            );
            print_outcome(&recorded.matching);
        }
        Command::Media(Media {
            command: MediaCommand::Add(args),
        }) => {
            let media = engine
                .attach_media(NewMedia::new(args.expenditure, args.kind.into(), args.url))
                .await?;
            println!(
                "attached {} #{} to expenditure {}",
                media.kind.as_str(),
                media.position,
                media.expenditure_id
            );
        }
        Command::Match => {
            let created = engine.run_matching().await?;
            for m in &created {
                println!(
                    "{} -> {}: {}",
                    m.donation_id, m.expenditure_id, m.allocated
                );
            }
            println!("{} new match(es)", created.len());
        }
        Command::Dashboard(args) => {
            let dashboard = engine.dashboard(args.donor).await?;
            println!("{} ({})", dashboard.donor.name, dashboard.donor.id);
            println!("  donated:   {}", dashboard.total_donated);
            println!("  allocated: {}", dashboard.total_allocated);
            for c in &dashboard.contributions {
                println!(
                    "  {} {} on {}: {} ({} media)",
                    c.expenditure.spent_at.date_naive(),
                    c.expenditure.cause,
                    c.expenditure.id,
                    c.allocated,
                    c.media.len()
                );
            }
        }
        Command::Export => {
            let matches = engine.matches().await?;
            write_matches(io::stdout().lock(), &matches)?;
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod config;
mod db;
mod error;
mod export;
mod league;
mod report;
mod repository;
mod stats;

use config::{Command, Config};
use db::{Database, TeamStore};
use export::Snapshot;
use league::LeagueAggregator;
use repository::{NewTeam, TeamRepository};
use stats::query::{self, ListQuery};

fn main() -> Result<()> {
    // Initialise tracing / logging (stderr; stdout carries command output)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Database::open(&config.database_path)?;
    debug!("Database opened: {}", config.database_path);

    let repo = TeamRepository::new(db, config.limits());
    run(&repo, config.command)
}

fn run<S: TeamStore>(repo: &TeamRepository<S>, command: Command) -> Result<()> {
    let league = LeagueAggregator::new(repo);

    match command {
        Command::Add { id, name, stats } => {
            let team = repo.create(&NewTeam {
                id,
                name,
                stats: stats.into(),
            })?;
            println!("Added {} ({})", team.name(), team.id());
        }
        Command::Show { id } => {
            print!("{}", report::team_report(&league.team_report(&id)?));
        }
        Command::Update { id, changes } => {
            let team = repo.update(&id, &changes)?;
            println!("Updated {} ({})", team.name(), team.id());
        }
        Command::Delete { id } => {
            repo.delete(&id)?;
            println!("Deleted {}", id.trim());
        }
        Command::List {
            search,
            sort,
            desc,
            page,
            page_size,
        } => {
            let query = ListQuery {
                search,
                sort,
                descending: desc,
                page,
                page_size,
            };
            print!("{}", report::listing(&query::run(repo.list_all()?, &query)));
        }
        Command::Ranking { limit } => {
            print!("{}", report::ranking(&league.ranking(limit)?));
        }
        Command::Averages => {
            print!("{}", report::averages(&league.averages()?));
        }
        Command::ExportCsv { path } => {
            export::export_csv(&repo.list_all()?, &path)?;
            println!("Exported to {}", path.display());
        }
        Command::ExportXlsx { path } => {
            export::export_xlsx(&repo.list_all()?, &path)?;
            println!("Exported to {}", path.display());
        }
        Command::ImportCsv { path } => {
            let imported = export::import_csv(repo, &path)?;
            println!("Imported {} team(s) from {}", imported, path.display());
        }
        Command::ExportJson {
            path,
            ranking_limit,
        } => {
            Snapshot::capture(repo, ranking_limit)?.export_json(&path)?;
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

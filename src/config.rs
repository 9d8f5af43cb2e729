use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::league::DEFAULT_RANKING_LIMIT;
use crate::stats::query::{SortKey, DEFAULT_PAGE_SIZE};
use crate::stats::validation::DEFAULT_MAX_GOALS_PER_MATCH;
use crate::stats::{FieldChange, Limits, RawStats};

/// Season statistics manager for a roster of football teams
#[derive(Parser, Debug, Clone)]
#[command(name = "teamstats", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(
        long,
        env = "TEAMSTATS_DATABASE_PATH",
        default_value = "teams.db",
        global = true
    )]
    pub database_path: String,

    /// Sanity bound on goals scored or conceded per match played
    #[arg(
        long,
        env = "TEAMSTATS_MAX_GOALS_PER_MATCH",
        default_value_t = DEFAULT_MAX_GOALS_PER_MATCH,
        global = true
    )]
    pub max_goals_per_match: u32,

    /// Do not require home points + away points to equal total points
    #[arg(
        long,
        env = "TEAMSTATS_NO_POINTS_SPLIT_CHECK",
        default_value = "false",
        global = true
    )]
    pub no_points_split_check: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a new team
    #[command(allow_negative_numbers = true)]
    Add {
        /// Unique team identifier
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        stats: StatsArgs,
    },

    /// Show a team's statistics next to the league averages
    Show { id: String },

    /// Change one or more fields of a team
    Update {
        id: String,
        /// FIELD=VALUE, repeatable (name, played, won, drawn, lost,
        /// goals_for, goals_against, home_points, away_points)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        changes: Vec<FieldChange>,
    },

    /// Delete a team
    Delete { id: String },

    /// List teams with optional search, sorting and paging
    List {
        /// Case-insensitive match on id or name
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Show the top teams by total points
    Ranking {
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        limit: usize,
    },

    /// Show league goals and points per match
    Averages,

    /// Export all teams to a CSV file
    ExportCsv { path: PathBuf },

    /// Export all teams to an Excel spreadsheet
    ExportXlsx { path: PathBuf },

    /// Import teams from a CSV file (all rows or none)
    ImportCsv { path: PathBuf },

    /// Export teams, averages and ranking as JSON
    ExportJson {
        path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        ranking_limit: usize,
    },
}

/// Raw counters for `add`. Parsed as signed integers so negative input is
/// reported by validation with its field name.
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long)]
    pub played: i64,
    #[arg(long)]
    pub won: i64,
    #[arg(long)]
    pub drawn: i64,
    #[arg(long)]
    pub lost: i64,
    #[arg(long)]
    pub goals_for: i64,
    #[arg(long)]
    pub goals_against: i64,
    #[arg(long)]
    pub home_points: i64,
    #[arg(long)]
    pub away_points: i64,
}

impl From<StatsArgs> for RawStats {
    fn from(args: StatsArgs) -> Self {
        RawStats {
            played: args.played,
            won: args.won,
            drawn: args.drawn,
            lost: args.lost,
            goals_for: args.goals_for,
            goals_against: args.goals_against,
            home_points: args.home_points,
            away_points: args.away_points,
        }
    }
}

impl Config {
    pub fn limits(&self) -> Limits {
        Limits {
            max_goals_per_match: self.max_goals_per_match,
            require_points_split: !self.no_points_split_check,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_path.trim().is_empty() {
            anyhow::bail!("database_path must not be empty");
        }
        if self.max_goals_per_match == 0 {
            anyhow::bail!("max_goals_per_match must be positive");
        }
        match &self.command {
            Command::List { page, page_size, .. } => {
                if *page == 0 {
                    anyhow::bail!("page is 1-based");
                }
                if *page_size == 0 {
                    anyhow::bail!("page_size must be positive");
                }
            }
            Command::Ranking { limit } | Command::ExportJson { ranking_limit: limit, .. } => {
                if *limit == 0 {
                    anyhow::bail!("ranking limit must be positive");
                }
            }
            _ => {}
        }
        Ok(())
    }
}

//! Bulk adapters: CSV export/import, an Excel export and a JSON snapshot of
//! the league.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::TeamStore;
use crate::error::{StatsError, StatsResult};
use crate::league::{self, LeagueAverages};
use crate::repository::{NewTeam, TeamRepository};
use crate::stats::{RawStats, TeamRecord};

/// Column order of every tabular export.
pub const COLUMNS: [&str; 14] = [
    "id",
    "name",
    "played",
    "won",
    "drawn",
    "lost",
    "goals_for",
    "goals_against",
    "total_points",
    "home_points",
    "away_points",
    "goal_difference",
    "win_percentage",
    "goals_per_match",
];

/// One CSV row as read back in. Derived columns, if present, are ignored.
#[derive(Debug, Deserialize)]
struct ImportRow {
    id: String,
    name: String,
    played: i64,
    won: i64,
    drawn: i64,
    lost: i64,
    goals_for: i64,
    goals_against: i64,
    home_points: i64,
    away_points: i64,
}

impl From<ImportRow> for NewTeam {
    fn from(row: ImportRow) -> Self {
        NewTeam {
            id: row.id,
            name: row.name,
            stats: RawStats {
                played: row.played,
                won: row.won,
                drawn: row.drawn,
                lost: row.lost,
                goals_for: row.goals_for,
                goals_against: row.goals_against,
                home_points: row.home_points,
                away_points: row.away_points,
            },
        }
    }
}

/// Write a header plus one row per team with all fourteen fields.
pub fn write_csv<W: Write>(teams: &[TeamRecord], writer: W) -> StatsResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for team in teams {
        writer.serialize(team)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv(teams: &[TeamRecord], path: &Path) -> StatsResult<()> {
    if teams.is_empty() {
        return Err(StatsError::EmptyRoster);
    }
    write_csv(teams, File::create(path)?)?;
    info!("Exported {} team(s) to {}", teams.len(), path.display());
    Ok(())
}

fn numeric_cells(team: &TeamRecord) -> [f64; 12] {
    [
        f64::from(team.played()),
        f64::from(team.won()),
        f64::from(team.drawn()),
        f64::from(team.lost()),
        f64::from(team.goals_for()),
        f64::from(team.goals_against()),
        team.total_points() as f64,
        f64::from(team.home_points()),
        f64::from(team.away_points()),
        team.goal_difference() as f64,
        team.win_percentage(),
        team.goals_per_match(),
    ]
}

/// One "Teams" sheet: bold header row, then a row per team in `COLUMNS` order.
pub fn build_workbook(teams: &[TeamRecord]) -> StatsResult<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Teams")?;

    for (col, title) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, team) in (1u32..).zip(teams) {
        sheet.write_string(row, 0, team.id())?;
        sheet.write_string(row, 1, team.name())?;
        for (col, value) in (2u16..).zip(numeric_cells(team)) {
            sheet.write_number(row, col, value)?;
        }
    }
    Ok(workbook)
}

pub fn export_xlsx(teams: &[TeamRecord], path: &Path) -> StatsResult<()> {
    if teams.is_empty() {
        return Err(StatsError::EmptyRoster);
    }
    let mut workbook = build_workbook(teams)?;
    workbook.save(path)?;
    info!("Exported {} team(s) to {}", teams.len(), path.display());
    Ok(())
}

/// Parse rows by header name, so column order does not matter.
pub fn read_csv<R: Read>(reader: R) -> impl Iterator<Item = StatsResult<NewTeam>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<ImportRow>()
        .map(|row| row.map(NewTeam::from).map_err(StatsError::from))
}

pub fn import_csv<S: TeamStore>(repo: &TeamRepository<S>, path: &Path) -> StatsResult<usize> {
    let imported = repo.import(read_csv(File::open(path)?))?;
    info!("Imported {} team(s) from {}", imported, path.display());
    Ok(imported)
}

/// Everything a downstream renderer needs, serialised verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub teams: Vec<TeamRecord>,
    pub averages: LeagueAverages,
    pub ranking: Vec<TeamRecord>,
}

impl Snapshot {
    pub fn capture<S: TeamStore>(repo: &TeamRepository<S>, limit: usize) -> StatsResult<Self> {
        let teams = repo.list_all()?;
        Ok(Snapshot {
            generated_at: Utc::now(),
            averages: league::averages(&teams),
            ranking: league::ranking(&teams, limit),
            teams,
        })
    }

    pub fn write_json<W: Write>(&self, writer: W) -> StatsResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn export_json(&self, path: &Path) -> StatsResult<()> {
        self.write_json(File::create(path)?)?;
        info!("Exported snapshot of {} team(s) to {}", self.teams.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::repository::tests::{new_team, repo};
    use crate::stats::record::tests::raw;
    use crate::stats::Limits;

    fn seeded() -> TeamRepository<Database> {
        let repo = repo();
        repo.create(&new_team("RMA", "Real Madrid", raw(10, 6, 2, 2, 20, 10, 12, 8)))
            .unwrap();
        repo.create(&new_team("CAD", "Cadiz, CF", raw(3, 1, 1, 1, 4, 2, 4, 0)))
            .unwrap();
        repo
    }

    #[test]
    fn test_csv_header_lists_all_fields() {
        let repo = seeded();
        let mut buf = Vec::new();
        write_csv(&repo.list_all().unwrap(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "id,name,played,won,drawn,lost,goals_for,goals_against,total_points,\
             home_points,away_points,goal_difference,win_percentage,goals_per_match"
        );
        assert_eq!(header, COLUMNS.join(","));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_csv_round_trip_preserves_derived_fields() {
        let source = seeded();
        let mut buf = Vec::new();
        write_csv(&source.list_all().unwrap(), &mut buf).unwrap();

        let target = repo();
        assert_eq!(target.import(read_csv(buf.as_slice())).unwrap(), 2);
        assert_eq!(target.list_all().unwrap(), source.list_all().unwrap());
    }

    #[test]
    fn test_csv_import_ignores_column_order() {
        let data = "away_points,home_points,goals_against,goals_for,lost,drawn,won,played,name,id\n\
                    8,12,10,20,2,2,6,10,Real Madrid,RMA\n";
        let target = repo();
        target.import(read_csv(data.as_bytes())).unwrap();
        let team = target.get("RMA").unwrap();
        assert_eq!(team.total_points(), 20);
        assert_eq!(team.goal_difference(), 10);
    }

    #[test]
    fn test_csv_import_reports_failing_row() {
        let data = "id,name,played,won,drawn,lost,goals_for,goals_against,home_points,away_points\n\
                    BAR,Barcelona,1,1,0,0,3,0,3,0\n\
                    GET,Getafe,1,1,1,0,3,0,3,0\n";
        let target = repo();
        let err = target.import(read_csv(data.as_bytes())).unwrap_err();
        assert!(matches!(err, StatsError::Import { row: 2, ref id, .. } if id == "GET"));
        assert!(target.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_csv_import_rejects_non_numeric_counter() {
        let data = "id,name,played,won,drawn,lost,goals_for,goals_against,home_points,away_points\n\
                    BAR,Barcelona,one,1,0,0,3,0,3,0\n";
        let err = repo().import(read_csv(data.as_bytes())).unwrap_err();
        match err {
            StatsError::Import { row, source, .. } => {
                assert_eq!(row, 1);
                assert!(matches!(*source, StatsError::Csv(_)));
            }
            other => panic!("Expected Import error, got {:?}", other),
        }
    }

    #[test]
    fn test_export_empty_roster_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_csv(&[], &dir.path().join("teams.csv")).unwrap_err();
        assert!(matches!(err, StatsError::EmptyRoster));
    }

    #[test]
    fn test_export_and_import_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.csv");
        let source = seeded();
        export_csv(&source.list_all().unwrap(), &path).unwrap();

        let target = TeamRepository::new(Database::open_in_memory().unwrap(), Limits::default());
        assert_eq!(import_csv(&target, &path).unwrap(), 2);
        assert_eq!(target.get("CAD").unwrap().name(), "Cadiz, CF");
    }

    #[test]
    fn test_xlsx_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.xlsx");
        export_xlsx(&seeded().list_all().unwrap(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_xlsx_export_empty_roster_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.xlsx");
        let err = export_xlsx(&[], &path).unwrap_err();
        assert!(matches!(err, StatsError::EmptyRoster));
        assert!(!path.exists());
    }

    #[test]
    fn test_numeric_cells_follow_column_order() {
        let team = seeded().get("RMA").unwrap();
        let cells = numeric_cells(&team);
        assert_eq!(cells.len(), COLUMNS.len() - 2);
        assert_eq!(COLUMNS[8], "total_points");
        assert_eq!(cells[6], 20.0);
        assert_eq!(COLUMNS[11], "goal_difference");
        assert_eq!(cells[9], 10.0);
        assert_eq!(cells[10], 60.0);
    }

    #[test]
    fn test_json_snapshot_contains_league_data() {
        let repo = seeded();
        let snapshot = Snapshot::capture(&repo, 1).unwrap();
        assert_eq!(snapshot.ranking.len(), 1);
        assert_eq!(snapshot.ranking[0].id(), "RMA");

        let mut buf = Vec::new();
        snapshot.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["teams"].as_array().unwrap().len(), 2);
        assert_eq!(value["teams"][0]["total_points"], 20);
        assert!(value["averages"]["goals_per_match"].is_number());
        assert!(value["generated_at"].is_string());
    }
}

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{StatsError, StatsResult};
use crate::stats::record::{Counters, TeamRecord};

/// Persistence boundary for team records.
///
/// Every call must be crash-consistent on its own: a save either fully
/// lands or not at all.
pub trait TeamStore {
    /// All stored records, in insertion order.
    fn load_all(&self) -> StatsResult<Vec<TeamRecord>>;

    /// Insert or replace a single record.
    fn save(&self, team: &TeamRecord) -> StatsResult<()>;

    /// Insert or replace a batch of records atomically.
    fn save_all(&self, teams: &[TeamRecord]) -> StatsResult<()>;

    /// Remove the record with `id`, returning whether a row was deleted.
    fn delete(&self, id: &str) -> StatsResult<bool>;
}

/// SQLite-backed store (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> StatsResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StatsResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StatsResult<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> StatsResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> StatsResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StatsError::LockPoisoned)
    }
}

impl TeamStore for Database {
    fn load_all(&self) -> StatsResult<Vec<TeamRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, played, won, drawn, lost,
                    goals_for, goals_against, home_points, away_points
             FROM teams ORDER BY rowid",
        )?;
        let teams = stmt
            .query_map([], map_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn save(&self, team: &TeamRecord) -> StatsResult<()> {
        let conn = self.lock()?;
        upsert_team(&conn, team)?;
        Ok(())
    }

    fn save_all(&self, teams: &[TeamRecord]) -> StatsResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for team in teams {
            upsert_team(&tx, team)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: &str) -> StatsResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM teams WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

/// Upsert keeps the original rowid so listing order survives updates.
fn upsert_team(conn: &Connection, team: &TeamRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO teams (
            id, name, played, won, drawn, lost,
            goals_for, goals_against, total_points, home_points,
            away_points, goal_difference, win_percentage, goals_per_match
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)
         ON CONFLICT(id) DO UPDATE SET
            name=excluded.name,
            played=excluded.played,
            won=excluded.won,
            drawn=excluded.drawn,
            lost=excluded.lost,
            goals_for=excluded.goals_for,
            goals_against=excluded.goals_against,
            total_points=excluded.total_points,
            home_points=excluded.home_points,
            away_points=excluded.away_points,
            goal_difference=excluded.goal_difference,
            win_percentage=excluded.win_percentage,
            goals_per_match=excluded.goals_per_match",
        params![
            team.id(),
            team.name(),
            team.played(),
            team.won(),
            team.drawn(),
            team.lost(),
            team.goals_for(),
            team.goals_against(),
            team.total_points(),
            team.home_points(),
            team.away_points(),
            team.goal_difference(),
            team.win_percentage(),
            team.goals_per_match(),
        ],
    )
}

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<TeamRecord> {
    let counters = Counters {
        played: row.get(2)?,
        won: row.get(3)?,
        drawn: row.get(4)?,
        lost: row.get(5)?,
        goals_for: row.get(6)?,
        goals_against: row.get(7)?,
        home_points: row.get(8)?,
        away_points: row.get(9)?,
    };
    Ok(TeamRecord::assemble(row.get(0)?, row.get(1)?, counters))
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id              TEXT    PRIMARY KEY,
    name            TEXT    NOT NULL,
    played          INTEGER NOT NULL,
    won             INTEGER NOT NULL,
    drawn           INTEGER NOT NULL,
    lost            INTEGER NOT NULL,
    goals_for       INTEGER NOT NULL,
    goals_against   INTEGER NOT NULL,
    total_points    INTEGER NOT NULL,
    home_points     INTEGER NOT NULL,
    away_points     INTEGER NOT NULL,
    goal_difference INTEGER NOT NULL,
    win_percentage  REAL    NOT NULL,
    goals_per_match REAL    NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::record::tests::raw;
    use crate::stats::validation::Limits;
    use std::collections::HashSet;

    fn team(id: &str, won: i64) -> TeamRecord {
        TeamRecord::construct(
            id,
            &format!("Team {id}"),
            &raw(won, won, 0, 0, won * 2, 0, won * 3, 0),
            &HashSet::new(),
            &Limits::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load_preserves_record() {
        let db = Database::open_in_memory().unwrap();
        let original = team("GIR", 4);
        db.save(&original).unwrap();

        let loaded = db.load_all().unwrap();
        assert_eq!(loaded, vec![original]);
    }

    #[test]
    fn test_load_all_keeps_insertion_order_across_updates() {
        let db = Database::open_in_memory().unwrap();
        db.save(&team("B", 1)).unwrap();
        db.save(&team("A", 2)).unwrap();
        db.save(&team("B", 3)).unwrap();

        let ids: Vec<String> = db
            .load_all()
            .unwrap()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(db.load_all().unwrap()[0].won(), 3);
    }

    #[test]
    fn test_delete_reports_whether_row_existed() {
        let db = Database::open_in_memory().unwrap();
        db.save(&team("OSA", 1)).unwrap();
        assert!(db.delete("OSA").unwrap());
        assert!(!db.delete("OSA").unwrap());
        assert!(db.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_all_writes_batch() {
        let db = Database::open_in_memory().unwrap();
        db.save_all(&[team("X", 1), team("Y", 2)]).unwrap();
        assert_eq!(db.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_open_file_database_is_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.db");
        let path = path.to_str().unwrap();
        {
            let db = Database::open(path).unwrap();
            db.save(&team("CEL", 2)).unwrap();
        }
        let db = Database::open(path).unwrap();
        assert_eq!(db.load_all().unwrap()[0].id(), "CEL");
    }
}

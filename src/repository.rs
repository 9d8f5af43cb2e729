use std::collections::HashSet;

use tracing::{debug, info};

use crate::db::TeamStore;
use crate::error::{StatsError, StatsResult};
use crate::stats::{FieldChange, Limits, RawStats, TeamRecord};

/// Caller-supplied input for a new team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub id: String,
    pub name: String,
    pub stats: RawStats,
}

/// Sole writer of persisted team state.
///
/// Every mutation reads the current state from the store, validates the
/// full resulting record, and only then writes. Nothing is cached between
/// calls; concurrent writers must be serialised by the caller.
pub struct TeamRepository<S: TeamStore> {
    store: S,
    limits: Limits,
}

impl<S: TeamStore> TeamRepository<S> {
    pub fn new(store: S, limits: Limits) -> Self {
        Self { store, limits }
    }

    fn existing_ids(&self) -> StatsResult<HashSet<String>> {
        Ok(self
            .store
            .load_all()?
            .into_iter()
            .map(|t| t.id().to_string())
            .collect())
    }

    /// Validate and persist a new team. Fails with `DuplicateId` if the id
    /// is already taken.
    pub fn create(&self, team: &NewTeam) -> StatsResult<TeamRecord> {
        let existing = self.existing_ids()?;
        let record =
            TeamRecord::construct(&team.id, &team.name, &team.stats, &existing, &self.limits)?;
        self.store.save(&record)?;
        info!(
            "Created team {} ({}) with {} points",
            record.id(),
            record.name(),
            record.total_points()
        );
        Ok(record)
    }

    pub fn get(&self, id: &str) -> StatsResult<TeamRecord> {
        let id = id.trim();
        debug!("Loading team {}", id);
        self.store
            .load_all()?
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| StatsError::NotFound { id: id.to_string() })
    }

    /// Apply a sparse update; the stored record is replaced only if the
    /// merged record passes every rule.
    pub fn update(&self, id: &str, changes: &[FieldChange]) -> StatsResult<TeamRecord> {
        let current = self.get(id)?;
        let updated = current.apply_update(changes, &self.limits)?;
        self.store.save(&updated)?;
        info!(
            "Updated team {} ({} field(s) changed)",
            updated.id(),
            changes.len()
        );
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> StatsResult<()> {
        let id = id.trim();
        if !self.store.delete(id)? {
            return Err(StatsError::NotFound { id: id.to_string() });
        }
        info!("Deleted team {}", id);
        Ok(())
    }

    /// Read snapshot of every stored team, in storage order.
    pub fn list_all(&self) -> StatsResult<Vec<TeamRecord>> {
        let teams = self.store.load_all()?;
        debug!("Loaded {} team(s)", teams.len());
        Ok(teams)
    }

    /// Validate every row against the stored ids and the rows before it,
    /// then persist them all in one batch. The first bad row aborts the
    /// import and nothing is written.
    pub fn import<I>(&self, rows: I) -> StatsResult<usize>
    where
        I: IntoIterator<Item = StatsResult<NewTeam>>,
    {
        let mut ids = self.existing_ids()?;
        let mut records = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let team = row.map_err(|err| StatsError::Import {
                row: row_number,
                id: String::new(),
                source: Box::new(err),
            })?;
            let record =
                TeamRecord::construct(&team.id, &team.name, &team.stats, &ids, &self.limits)
                    .map_err(|err| StatsError::Import {
                        row: row_number,
                        id: team.id.clone(),
                        source: Box::new(err.into()),
                    })?;
            ids.insert(record.id().to_string());
            records.push(record);
        }

        self.store.save_all(&records)?;
        info!("Imported {} team(s)", records.len());
        Ok(records.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::ValidationError;
    use crate::stats::record::tests::raw;
    use crate::stats::CounterField;

    pub(crate) fn repo() -> TeamRepository<Database> {
        TeamRepository::new(Database::open_in_memory().unwrap(), Limits::default())
    }

    pub(crate) fn new_team(id: &str, name: &str, stats: RawStats) -> NewTeam {
        NewTeam {
            id: id.into(),
            name: name.into(),
            stats,
        }
    }

    fn madrid() -> NewTeam {
        new_team("RMA", "Real Madrid", raw(10, 6, 2, 2, 20, 10, 12, 8))
    }

    #[test]
    fn test_create_then_get() {
        let repo = repo();
        let created = repo.create(&madrid()).unwrap();
        assert_eq!(repo.get("RMA").unwrap(), created);
        assert_eq!(created.total_points(), 20);
    }

    #[test]
    fn test_create_invalid_persists_nothing() {
        let repo = repo();
        let err = repo
            .create(&new_team("RMA", "Real Madrid", raw(10, 6, 2, 1, 20, 10, 12, 8)))
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::Validation(ValidationError::ResultsMismatch { .. })
        ));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_create_leaves_original_untouched() {
        let repo = repo();
        let original = repo.create(&madrid()).unwrap();
        let err = repo
            .create(&new_team("RMA", "Impostor", raw(0, 0, 0, 0, 0, 0, 0, 0)))
            .unwrap_err();
        assert!(matches!(err, StatsError::DuplicateId { ref id } if id == "RMA"));
        assert_eq!(repo.get("RMA").unwrap(), original);
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let repo = repo();
        assert!(matches!(
            repo.get("NOPE"),
            Err(StatsError::NotFound { ref id }) if id == "NOPE"
        ));
    }

    #[test]
    fn test_update_persists_recomputed_record() {
        let repo = repo();
        repo.create(&madrid()).unwrap();
        let updated = repo
            .update("RMA", &[FieldChange::Counter(CounterField::GoalsFor, 25)])
            .unwrap();
        assert_eq!(updated.goal_difference(), 15);
        assert_eq!(repo.get("RMA").unwrap(), updated);
    }

    #[test]
    fn test_rejected_update_keeps_stored_record() {
        let repo = repo();
        let original = repo.create(&madrid()).unwrap();
        let err = repo
            .update("RMA", &[FieldChange::Counter(CounterField::GoalsFor, 500)])
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::Validation(ValidationError::GoalsExceeded { .. })
        ));
        assert_eq!(repo.get("RMA").unwrap(), original);
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let repo = repo();
        let err = repo
            .update("NOPE", &[FieldChange::Name("x".into())])
            .unwrap_err();
        assert!(matches!(err, StatsError::NotFound { .. }));
    }

    #[test]
    fn test_delete() {
        let repo = repo();
        repo.create(&madrid()).unwrap();
        repo.delete("RMA").unwrap();
        assert!(matches!(repo.get("RMA"), Err(StatsError::NotFound { .. })));
        assert!(matches!(repo.delete("RMA"), Err(StatsError::NotFound { .. })));
    }

    #[test]
    fn test_deleted_id_can_be_reused() {
        let repo = repo();
        repo.create(&madrid()).unwrap();
        repo.delete("RMA").unwrap();
        assert!(repo.create(&madrid()).is_ok());
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let repo = repo();
        repo.create(&madrid()).unwrap();
        let rows = vec![
            Ok(new_team("BAR", "Barcelona", raw(1, 1, 0, 0, 3, 0, 3, 0))),
            Ok(new_team("RMA", "Duplicate", raw(0, 0, 0, 0, 0, 0, 0, 0))),
        ];
        let err = repo.import(rows).unwrap_err();
        match err {
            StatsError::Import { row, id, source } => {
                assert_eq!(row, 2);
                assert_eq!(id, "RMA");
                assert!(matches!(*source, StatsError::DuplicateId { .. }));
            }
            other => panic!("Expected Import error, got {:?}", other),
        }
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_import_rejects_duplicates_within_batch() {
        let repo = repo();
        let rows = vec![
            Ok(new_team("BAR", "Barcelona", raw(0, 0, 0, 0, 0, 0, 0, 0))),
            Ok(new_team("BAR", "Barcelona B", raw(0, 0, 0, 0, 0, 0, 0, 0))),
        ];
        assert!(matches!(
            repo.import(rows),
            Err(StatsError::Import { row: 2, .. })
        ));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_import_valid_rows() {
        let repo = repo();
        let rows = vec![
            Ok(new_team("BAR", "Barcelona", raw(1, 1, 0, 0, 3, 0, 3, 0))),
            Ok(new_team("ATM", "Atletico", raw(1, 0, 1, 0, 1, 1, 0, 1))),
        ];
        assert_eq!(repo.import(rows).unwrap(), 2);
        assert_eq!(repo.get("ATM").unwrap().total_points(), 1);
    }
}

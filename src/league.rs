//! League-wide aggregates over the current roster.

use serde::Serialize;

use crate::db::TeamStore;
use crate::error::StatsResult;
use crate::repository::TeamRepository;
use crate::stats::record::round2;
use crate::stats::TeamRecord;

pub const DEFAULT_RANKING_LIMIT: usize = 5;

/// Goals and points per match averaged over every recorded match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub goals_per_match: f64,
    pub points_per_match: f64,
}

/// A team's full record next to the league averages. Pure data, no
/// formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReport {
    pub team: TeamRecord,
    pub league: LeagueAverages,
}

/// Sums goals, points and matches across all teams. Zero matches (or no
/// teams) yields `(0, 0)`.
pub fn averages(teams: &[TeamRecord]) -> LeagueAverages {
    let (goals, points, played) = teams.iter().fold((0u64, 0u64, 0u64), |acc, t| {
        (
            acc.0 + u64::from(t.goals_for()),
            acc.1 + t.total_points(),
            acc.2 + u64::from(t.played()),
        )
    });
    if played == 0 {
        return LeagueAverages::default();
    }
    LeagueAverages {
        goals_per_match: round2(goals as f64 / played as f64),
        points_per_match: round2(points as f64 / played as f64),
    }
}

/// Teams by total points, highest first, truncated to `limit`. Equal
/// points keep their input order.
pub fn ranking(teams: &[TeamRecord], limit: usize) -> Vec<TeamRecord> {
    let mut ranked = teams.to_vec();
    ranked.sort_by(|a, b| b.total_points().cmp(&a.total_points()));
    ranked.truncate(limit);
    ranked
}

/// Read-only aggregation over a repository. Every call reloads the roster.
pub struct LeagueAggregator<'a, S: TeamStore> {
    repo: &'a TeamRepository<S>,
}

impl<'a, S: TeamStore> LeagueAggregator<'a, S> {
    pub fn new(repo: &'a TeamRepository<S>) -> Self {
        Self { repo }
    }

    pub fn averages(&self) -> StatsResult<LeagueAverages> {
        Ok(averages(&self.repo.list_all()?))
    }

    pub fn ranking(&self, limit: usize) -> StatsResult<Vec<TeamRecord>> {
        Ok(ranking(&self.repo.list_all()?, limit))
    }

    pub fn team_report(&self, id: &str) -> StatsResult<TeamReport> {
        let team = self.repo.get(id)?;
        let league = self.averages()?;
        Ok(TeamReport { team, league })
    }
}

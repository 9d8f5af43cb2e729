//! Search, sort and pagination over a roster snapshot.

use std::cmp::Ordering;

use clap::ValueEnum;
use serde::Serialize;

use super::record::TeamRecord;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Columns a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Id,
    Name,
    Played,
    Points,
    GoalsFor,
    GoalsAgainst,
    HomePoints,
    AwayPoints,
    GoalDifference,
    WinPercentage,
    GoalsPerMatch,
}

impl SortKey {
    fn compare(self, a: &TeamRecord, b: &TeamRecord) -> Ordering {
        match self {
            SortKey::Id => a.id().cmp(b.id()),
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::Played => a.played().cmp(&b.played()),
            SortKey::Points => a.total_points().cmp(&b.total_points()),
            SortKey::GoalsFor => a.goals_for().cmp(&b.goals_for()),
            SortKey::GoalsAgainst => a.goals_against().cmp(&b.goals_against()),
            SortKey::HomePoints => a.home_points().cmp(&b.home_points()),
            SortKey::AwayPoints => a.away_points().cmp(&b.away_points()),
            SortKey::GoalDifference => a.goal_difference().cmp(&b.goal_difference()),
            SortKey::WinPercentage => a.win_percentage().total_cmp(&b.win_percentage()),
            SortKey::GoalsPerMatch => a.goals_per_match().total_cmp(&b.goals_per_match()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Case-insensitive substring matched against id or name.
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    /// 1-based; clamped to the last page.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            descending: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<TeamRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn matches_search(team: &TeamRecord, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    team.id().to_lowercase().contains(&needle) || team.name().to_lowercase().contains(&needle)
}

/// Filter, sort (stable) and slice `teams` according to `query`.
pub fn run(teams: Vec<TeamRecord>, query: &ListQuery) -> Page {
    let mut filtered: Vec<TeamRecord> = match query.search.as_deref() {
        Some(needle) if !needle.is_empty() => teams
            .into_iter()
            .filter(|t| matches_search(t, needle))
            .collect(),
        _ => teams,
    };

    if let Some(key) = query.sort {
        filtered.sort_by(|a, b| {
            let ord = key.compare(a, b);
            if query.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let page_size = query.page_size.max(1);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);
    let items = filtered
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

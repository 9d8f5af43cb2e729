use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::validation::{self, Limits};
use crate::error::ValidationError;

/// Unvalidated match counters as supplied by a caller.
///
/// Values are signed so that a negative input reaches the `non_negative`
/// rule and is reported with its field name instead of failing to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStats {
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub home_points: i64,
    pub away_points: i64,
}

/// The eight raw counters a caller may set on a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Played,
    Won,
    Drawn,
    Lost,
    GoalsFor,
    GoalsAgainst,
    HomePoints,
    AwayPoints,
}

impl CounterField {
    pub const ALL: [CounterField; 8] = [
        CounterField::Played,
        CounterField::Won,
        CounterField::Drawn,
        CounterField::Lost,
        CounterField::GoalsFor,
        CounterField::GoalsAgainst,
        CounterField::HomePoints,
        CounterField::AwayPoints,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CounterField::Played => "played",
            CounterField::Won => "won",
            CounterField::Drawn => "drawn",
            CounterField::Lost => "lost",
            CounterField::GoalsFor => "goals_for",
            CounterField::GoalsAgainst => "goals_against",
            CounterField::HomePoints => "home_points",
            CounterField::AwayPoints => "away_points",
        }
    }

    fn raw_value(self, raw: &RawStats) -> i64 {
        match self {
            CounterField::Played => raw.played,
            CounterField::Won => raw.won,
            CounterField::Drawn => raw.drawn,
            CounterField::Lost => raw.lost,
            CounterField::GoalsFor => raw.goals_for,
            CounterField::GoalsAgainst => raw.goals_against,
            CounterField::HomePoints => raw.home_points,
            CounterField::AwayPoints => raw.away_points,
        }
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a sparse update. Derived fields cannot be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Name(String),
    Counter(CounterField, i64),
}

/// Parses `field=value`, accepting `goals_for` and `goals-for` spellings.
impl FromStr for FieldChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got {s:?}"))?;
        let field = field.trim().replace('-', "_");
        if field == "name" {
            return Ok(FieldChange::Name(value.to_string()));
        }
        let counter = CounterField::ALL
            .into_iter()
            .find(|c| c.as_str() == field)
            .ok_or_else(|| {
                let allowed: Vec<&str> = CounterField::ALL.iter().map(|c| c.as_str()).collect();
                format!(
                    "unknown or read-only field {field:?} (settable: name, {})",
                    allowed.join(", ")
                )
            })?;
        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid integer for {field}: {e}"))?;
        Ok(FieldChange::Counter(counter, value))
    }
}

/// Validated counters of a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub home_points: u32,
    pub away_points: u32,
}

impl Counters {
    fn from_raw(raw: &RawStats) -> Result<Self, ValidationError> {
        let mut counters = Counters::default();
        for field in CounterField::ALL {
            *counters.slot(field) = validation::non_negative(field.raw_value(raw), field.as_str())?;
        }
        Ok(counters)
    }

    fn slot(&mut self, field: CounterField) -> &mut u32 {
        match field {
            CounterField::Played => &mut self.played,
            CounterField::Won => &mut self.won,
            CounterField::Drawn => &mut self.drawn,
            CounterField::Lost => &mut self.lost,
            CounterField::GoalsFor => &mut self.goals_for,
            CounterField::GoalsAgainst => &mut self.goals_against,
            CounterField::HomePoints => &mut self.home_points,
            CounterField::AwayPoints => &mut self.away_points,
        }
    }
}

/// Season statistics of one team, always internally consistent.
///
/// A `TeamRecord` can only be obtained through [`TeamRecord::construct`],
/// [`TeamRecord::apply_update`] or by loading previously validated rows,
/// and its derived fields are recomputed from the counters every time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRecord {
    id: String,
    name: String,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    total_points: u64,
    home_points: u32,
    away_points: u32,
    goal_difference: i64,
    win_percentage: f64,
    goals_per_match: f64,
}

impl TeamRecord {
    /// Validate every field and cross-field rule, then compute the derived
    /// fields. Nothing is produced unless all checks pass.
    pub fn construct(
        id: &str,
        name: &str,
        raw: &RawStats,
        existing_ids: &HashSet<String>,
        limits: &Limits,
    ) -> Result<Self, ValidationError> {
        let id = validation::unique_id(id, existing_ids)?;
        let name = validation::non_empty_name(name)?;
        let counters = Counters::from_raw(raw)?;
        let record = Self::assemble(id, name, counters);
        record.check_consistency(limits)?;
        Ok(record)
    }

    /// Build a record from counters that were validated when they were
    /// written. Derived fields are recomputed, never trusted.
    pub(crate) fn assemble(id: String, name: String, counters: Counters) -> Self {
        let mut record = Self {
            id,
            name,
            played: counters.played,
            won: counters.won,
            drawn: counters.drawn,
            lost: counters.lost,
            goals_for: counters.goals_for,
            goals_against: counters.goals_against,
            total_points: 0,
            home_points: counters.home_points,
            away_points: counters.away_points,
            goal_difference: 0,
            win_percentage: 0.0,
            goals_per_match: 0.0,
        };
        record.recompute();
        record
    }

    /// Apply a sparse set of changes and re-validate the merged record as a
    /// whole. `self` is never modified; on error the caller keeps the
    /// original.
    pub fn apply_update(
        &self,
        changes: &[FieldChange],
        limits: &Limits,
    ) -> Result<Self, ValidationError> {
        let mut name = self.name.clone();
        let mut counters = self.counters();
        for change in changes {
            match change {
                FieldChange::Name(value) => name = validation::non_empty_name(value)?,
                FieldChange::Counter(field, value) => {
                    *counters.slot(*field) = validation::non_negative(*value, field.as_str())?;
                }
            }
        }
        let next = Self::assemble(self.id.clone(), name, counters);
        next.check_consistency(limits)?;
        Ok(next)
    }

    fn recompute(&mut self) {
        self.total_points = validation::total_points(self.won, self.drawn);
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
        self.win_percentage = ratio(self.won, self.played, 100.0);
        self.goals_per_match = ratio(self.goals_for, self.played, 1.0);
    }

    fn check_consistency(&self, limits: &Limits) -> Result<(), ValidationError> {
        validation::results_match_played(self.played, self.won, self.drawn, self.lost)?;
        validation::points_split_matches_total(
            self.home_points,
            self.away_points,
            self.total_points,
            limits,
        )?;
        validation::points_within_bounds(
            self.played,
            self.home_points,
            self.away_points,
            self.total_points,
        )?;
        validation::goals_within_bounds(self.played, self.goals_for, self.goals_against, limits)
    }

    pub fn counters(&self) -> Counters {
        Counters {
            played: self.played,
            won: self.won,
            drawn: self.drawn,
            lost: self.lost,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            home_points: self.home_points,
            away_points: self.away_points,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn played(&self) -> u32 {
        self.played
    }

    pub fn won(&self) -> u32 {
        self.won
    }

    pub fn drawn(&self) -> u32 {
        self.drawn
    }

    pub fn lost(&self) -> u32 {
        self.lost
    }

    pub fn goals_for(&self) -> u32 {
        self.goals_for
    }

    pub fn goals_against(&self) -> u32 {
        self.goals_against
    }

    pub fn home_points(&self) -> u32 {
        self.home_points
    }

    pub fn away_points(&self) -> u32 {
        self.away_points
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    pub fn goal_difference(&self) -> i64 {
        self.goal_difference
    }

    pub fn win_percentage(&self) -> f64 {
        self.win_percentage
    }

    pub fn goals_per_match(&self) -> f64 {
        self.goals_per_match
    }
}

/// Round to two decimals, ties to even (`0.125` becomes `0.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `numerator / denominator * scale` rounded to two decimals, 0 when the
/// denominator is 0.
fn ratio(numerator: u32, denominator: u32, scale: f64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(f64::from(numerator) / f64::from(denominator) * scale)
}

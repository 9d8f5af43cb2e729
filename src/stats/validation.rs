//! Field and cross-field rules for team statistics.
//!
//! Every rule is a pure function: it either returns the (possibly
//! normalised) value or a `ValidationError` describing the violation.
//! None of them touch storage.

use std::collections::HashSet;

use crate::error::ValidationError;

/// Points awarded for a win.
pub const POINTS_PER_WIN: u32 = 3;
/// Points awarded for a draw.
pub const POINTS_PER_DRAW: u32 = 1;
/// Default sanity bound on goals per match (not a rule of the sport).
pub const DEFAULT_MAX_GOALS_PER_MATCH: u32 = 10;

/// Configurable sanity heuristics applied on top of the hard invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on goals scored or conceded per match played.
    pub max_goals_per_match: u32,
    /// Whether `home_points + away_points` must equal the total.
    pub require_points_split: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_goals_per_match: DEFAULT_MAX_GOALS_PER_MATCH,
            require_points_split: true,
        }
    }
}

/// Reject negative counters; counters are stored as `u32`.
pub fn non_negative(value: i64, field: &str) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field: field.to_string(),
        value,
    })
}

/// Returns the trimmed name, rejecting names that are blank.
pub fn non_empty_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed id, rejecting blank ids and ids already in use.
pub fn unique_id(id: &str, existing_ids: &HashSet<String>) -> Result<String, ValidationError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if existing_ids.contains(trimmed) {
        return Err(ValidationError::DuplicateId {
            id: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Total points and each half of the home/away split are capped at
/// `played * 3`.
pub fn points_within_bounds(
    played: u32,
    home_points: u32,
    away_points: u32,
    total_points: u64,
) -> Result<(), ValidationError> {
    let max = u64::from(played) * u64::from(POINTS_PER_WIN);
    if total_points > max {
        return Err(ValidationError::TotalPointsExceeded {
            total: total_points,
            max,
        });
    }
    if u64::from(home_points) > max || u64::from(away_points) > max {
        return Err(ValidationError::SplitPointsExceeded {
            home: home_points,
            away: away_points,
            max,
        });
    }
    Ok(())
}

pub fn goals_within_bounds(
    played: u32,
    goals_for: u32,
    goals_against: u32,
    limits: &Limits,
) -> Result<(), ValidationError> {
    let max = u64::from(played) * u64::from(limits.max_goals_per_match);
    if u64::from(goals_for) > max || u64::from(goals_against) > max {
        return Err(ValidationError::GoalsExceeded {
            played,
            goals_for,
            goals_against,
            max,
        });
    }
    Ok(())
}

/// `won + drawn + lost == played`
pub fn results_match_played(
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
) -> Result<(), ValidationError> {
    let sum = u64::from(won) + u64::from(drawn) + u64::from(lost);
    if sum != u64::from(played) {
        return Err(ValidationError::ResultsMismatch {
            played,
            won,
            drawn,
            lost,
        });
    }
    Ok(())
}

/// `home_points + away_points == total_points`, unless disabled in `limits`.
pub fn points_split_matches_total(
    home_points: u32,
    away_points: u32,
    total_points: u64,
    limits: &Limits,
) -> Result<(), ValidationError> {
    if !limits.require_points_split {
        return Ok(());
    }
    if u64::from(home_points) + u64::from(away_points) != total_points {
        return Err(ValidationError::PointsSplitMismatch {
            home: home_points,
            away: away_points,
            total: total_points,
        });
    }
    Ok(())
}

/// `won * 3 + drawn`, computed in `u64` so it cannot overflow.
pub fn total_points(won: u32, drawn: u32) -> u64 {
    u64::from(won) * u64::from(POINTS_PER_WIN) + u64::from(drawn) * u64::from(POINTS_PER_DRAW)
}

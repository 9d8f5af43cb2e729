use thiserror::Error;

/// A field or cross-field rule violated by a candidate team record.
///
/// Always recoverable: the caller may correct the input and retry. No
/// partial state is ever persisted when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a non-negative number, got {value}")]
    Negative { field: String, value: i64 },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: String, value: i64 },

    #[error("team name must be a non-empty string")]
    EmptyName,

    #[error("team id must be a non-empty string")]
    EmptyId,

    #[error("team id already exists: {id}")]
    DuplicateId { id: String },

    #[error("won ({won}) + drawn ({drawn}) + lost ({lost}) must equal played ({played})")]
    ResultsMismatch {
        played: u32,
        won: u32,
        drawn: u32,
        lost: u32,
    },

    #[error("home points ({home}) + away points ({away}) must equal total points ({total})")]
    PointsSplitMismatch { home: u32, away: u32, total: u64 },

    #[error("total points ({total}) cannot exceed {max}")]
    TotalPointsExceeded { total: u64, max: u64 },

    #[error("home points ({home}) or away points ({away}) cannot exceed {max}")]
    SplitPointsExceeded { home: u32, away: u32, max: u64 },

    #[error("goals for ({goals_for}) or against ({goals_against}) cannot exceed {max} for {played} matches")]
    GoalsExceeded {
        played: u32,
        goals_for: u32,
        goals_against: u32,
        max: u64,
    },
}

/// Errors surfaced by every core operation.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Validation(ValidationError),

    #[error("team not found: {id}")]
    NotFound { id: String },

    #[error("team id already exists: {id}")]
    DuplicateId { id: String },

    #[error("import failed at row {row} (id {id:?}): {source}")]
    Import {
        row: usize,
        id: String,
        #[source]
        source: Box<StatsError>,
    },

    #[error("no teams to export")]
    EmptyRoster,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage connection lock poisoned")]
    LockPoisoned,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for StatsError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::DuplicateId { id } => StatsError::DuplicateId { id },
            other => StatsError::Validation(other),
        }
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

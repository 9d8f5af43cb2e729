pub mod query;
pub mod record;
pub mod validation;

pub use record::{CounterField, FieldChange, RawStats, TeamRecord};
pub use validation::Limits;

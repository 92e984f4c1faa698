pub mod iso_date;

// Re-export types for convenience.
pub use crate::types::iso_date::{IsoDate, IsoDateError};

//! Typed failures shared by the persistence, validation and export layers.
//!
//! The first five variants are conditions the user can fix from the form; the
//! remaining ones wrap lower-level failures so callers can still use `?`.

use std::fmt;

use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Form fields that can be reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    RollNo,
    Branch,
    Marks,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "Name",
            Field::RollNo => "Roll No",
            Field::Branch => "Branch",
            Field::Marks => "Marks",
        };
        f.write_str(label)
    }
}

/// Why a marks value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarksProblem {
    NotAnInteger,
    OutOfRange,
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Please fill all fields ({0} is empty).")]
    MissingField(Field),

    #[error("{}", invalid_marks_message(.value, .reason))]
    InvalidMarks { value: String, reason: MarksProblem },

    #[error("Roll number {0} already exists. Use a unique roll number.")]
    DuplicateRoll(String),

    #[error("Student #{0} not found.")]
    NotFound(i64),

    #[error("No records to export.")]
    NothingToExport,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl RosterError {
    /// Whether the failure is something the user can correct and retry, as
    /// opposed to a store or filesystem fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RosterError::MissingField(_)
                | RosterError::InvalidMarks { .. }
                | RosterError::DuplicateRoll(_)
                | RosterError::NotFound(_)
                | RosterError::NothingToExport
        )
    }
}

fn invalid_marks_message(value: &str, reason: &MarksProblem) -> String {
    match reason {
        MarksProblem::NotAnInteger => format!("Marks must be an integer (got \"{value}\")."),
        MarksProblem::OutOfRange => format!("Marks must be between 0 and 100 (got {value})."),
    }
}

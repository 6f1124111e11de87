//! Field checks that run before anything touches the database.

use std::num::IntErrorKind;

use crate::error::{Field, MarksProblem, Result, RosterError};

/// Lowest and highest accepted marks, inclusive.
pub const MARKS_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

/// Check raw form values. With `require_all` every field must be non-empty;
/// a non-empty `marks` must always be an integer inside [`MARKS_RANGE`].
pub fn validate(
    name: &str,
    roll_no: &str,
    branch: &str,
    marks: &str,
    require_all: bool,
) -> Result<()> {
    if require_all {
        let fields = [
            (Field::Name, name),
            (Field::RollNo, roll_no),
            (Field::Branch, branch),
            (Field::Marks, marks),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
            return Err(RosterError::MissingField(*field));
        }
    }

    if !marks.is_empty() {
        parse_marks(marks)?;
    }
    Ok(())
}

/// Parse a marks string into the stored integer. Integers too large for
/// `i64` are still integers, so they count as out of range.
pub fn parse_marks(marks: &str) -> Result<i64> {
    let value = marks.parse::<i64>().map_err(|err| {
        let reason = match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => MarksProblem::OutOfRange,
            _ => MarksProblem::NotAnInteger,
        };
        RosterError::InvalidMarks {
            value: marks.to_string(),
            reason,
        }
    })?;
    if !MARKS_RANGE.contains(&value) {
        return Err(RosterError::InvalidMarks {
            value: marks.to_string(),
            reason: MarksProblem::OutOfRange,
        });
    }
    Ok(value)
}

/// Raw form values after trimming and case normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub name: String,
    pub roll_no: String,
    pub branch: String,
    pub marks: String,
}

/// A fully validated record ready for an `INSERT` or `UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    pub branch: String,
    pub marks: i64,
}

impl StudentInput {
    /// Trim every field and uppercase the roll number and branch.
    pub fn normalize(name: &str, roll_no: &str, branch: &str, marks: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            roll_no: roll_no.trim().to_uppercase(),
            branch: branch.trim().to_uppercase(),
            marks: marks.trim().to_string(),
        }
    }

    /// Run the full validation and convert marks to an integer.
    pub fn validated(self) -> Result<NewStudent> {
        validate(&self.name, &self.roll_no, &self.branch, &self.marks, true)?;
        let marks = parse_marks(&self.marks)?;
        Ok(NewStudent {
            name: self.name,
            roll_no: self.roll_no,
            branch: self.branch,
            marks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_bounds() {
        assert!(matches!(
            validate("A", "R1", "CS", "101", true),
            Err(RosterError::InvalidMarks {
                reason: MarksProblem::OutOfRange,
                ..
            })
        ));
        assert!(matches!(
            validate("A", "R1", "CS", "-1", true),
            Err(RosterError::InvalidMarks {
                reason: MarksProblem::OutOfRange,
                ..
            })
        ));
        assert!(validate("A", "R1", "CS", "50", true).is_ok());
        assert!(validate("A", "R1", "CS", "0", true).is_ok());
        assert!(validate("A", "R1", "CS", "100", true).is_ok());
    }

    #[test]
    fn oversized_integers_are_out_of_range() {
        for marks in ["99999999999999999999", "-99999999999999999999"] {
            assert!(matches!(
                validate("A", "R1", "CS", marks, true),
                Err(RosterError::InvalidMarks {
                    reason: MarksProblem::OutOfRange,
                    ..
                })
            ));
        }
    }

    #[test]
    fn non_integer_marks() {
        assert!(matches!(
            validate("A", "R1", "CS", "4.5", true),
            Err(RosterError::InvalidMarks {
                reason: MarksProblem::NotAnInteger,
                ..
            })
        ));
        assert!(matches!(
            validate("", "", "", "abc", false),
            Err(RosterError::InvalidMarks { .. })
        ));
    }

    #[test]
    fn missing_fields_reported_in_form_order() {
        assert!(matches!(
            validate("", "", "CS", "10", true),
            Err(RosterError::MissingField(Field::Name))
        ));
        assert!(matches!(
            validate("A", "R1", "CS", "", true),
            Err(RosterError::MissingField(Field::Marks))
        ));
    }

    #[test]
    fn optional_fields_when_not_required() {
        assert!(validate("", "", "", "", false).is_ok());
        assert!(validate("", "", "", "77", false).is_ok());
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        let input = StudentInput::normalize("  bob ", " r2 ", "ee", " 45 ");
        assert_eq!(input.name, "bob");
        assert_eq!(input.roll_no, "R2");
        assert_eq!(input.branch, "EE");

        let record = input.validated().unwrap();
        assert_eq!(record.marks, 45);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let input = StudentInput::normalize("   ", "R1", "CS", "10");
        assert!(matches!(
            input.validated(),
            Err(RosterError::MissingField(Field::Name))
        ));
    }
}

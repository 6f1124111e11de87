//! Domain models that mirror the `students` table and get passed throughout
//! the TUI. These stay light-weight data holders so the other layers can focus
//! on presentation and persistence.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `students` table.
pub struct Student {
    /// Surrogate key assigned by SQLite. Edit and delete flows bubble it back
    /// to the persistence layer; it is never shown to the user.
    pub id: i64,
    pub name: String,
    /// Human-assigned identifier, stored uppercase and unique.
    pub roll_no: String,
    /// Stored uppercase.
    pub branch: String,
    pub marks: i64,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.roll_no)
    }
}

/// A student as shown in a listing or export, paired with its display serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// 1-based position in the listing. Recomputed on every read, so it has no
    /// relationship with `student.id`.
    pub serial: usize,
    pub student: Student,
}

/// Number an already ordered sequence of students 1..=N.
pub fn number_rows(students: Vec<Student>) -> Vec<RosterRow> {
    students
        .into_iter()
        .enumerate()
        .map(|(idx, student)| RosterRow {
            serial: idx + 1,
            student,
        })
        .collect()
}

/// Which column a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    ByName,
    ByRoll,
}

impl SearchMode {
    /// Flip between name and roll number matching.
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::ByName => SearchMode::ByRoll,
            SearchMode::ByRoll => SearchMode::ByName,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::ByName => "Name",
            SearchMode::ByRoll => "Roll No",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str) -> Student {
        Student {
            id,
            name: name.to_string(),
            roll_no: format!("R{id}"),
            branch: "CS".to_string(),
            marks: 50,
        }
    }

    #[test]
    fn serials_ignore_id_gaps() {
        let rows = number_rows(vec![student(2, "a"), student(7, "b"), student(9, "c")]);
        let serials: Vec<usize> = rows.iter().map(|r| r.serial).collect();
        assert_eq!(serials, vec![1, 2, 3]);
        assert_eq!(rows[1].student.id, 7);
    }

    #[test]
    fn empty_listing_has_no_rows() {
        assert!(number_rows(Vec::new()).is_empty());
    }

    #[test]
    fn search_mode_toggles() {
        assert_eq!(SearchMode::default().toggle(), SearchMode::ByRoll);
        assert_eq!(SearchMode::ByRoll.toggle(), SearchMode::ByName);
        assert_eq!(SearchMode::ByRoll.label(), "Roll No");
    }
}

//! Record operations over the roster. Each method opens its own connection,
//! runs one statement and drops the handle before returning, whichever way it
//! exits.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::db::{
    connect, count_students, delete_student, ensure_schema, fetch_student, fetch_students,
    insert_student, search_students, update_student,
};
use crate::error::{Result, RosterError};
use crate::export;
use crate::models::{number_rows, RosterRow, SearchMode, Student};
use crate::validation::StudentInput;

/// Handle to the on-disk roster. Only the path is held between operations.
#[derive(Debug, Clone)]
pub struct Roster {
    db_path: PathBuf,
}

impl Roster {
    /// Create the schema if needed and return a handle to the database.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        ensure_schema(&db_path)?;
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Add a student and return the id the store assigned.
    pub fn create(&self, name: &str, roll_no: &str, branch: &str, marks: &str) -> Result<i64> {
        let record = StudentInput::normalize(name, roll_no, branch, marks)
            .validated()
            .inspect_err(log_failure)?;

        let conn = connect(&self.db_path)?;
        let id = insert_student(&conn, &record).inspect_err(log_failure)?;
        info!(id, roll_no = %record.roll_no, "student added");
        Ok(id)
    }

    /// Replace name, roll number, branch and marks of student `id`.
    pub fn update(
        &self,
        id: i64,
        name: &str,
        roll_no: &str,
        branch: &str,
        marks: &str,
    ) -> Result<()> {
        let record = StudentInput::normalize(name, roll_no, branch, marks)
            .validated()
            .inspect_err(log_failure)?;

        let conn = connect(&self.db_path)?;
        update_student(&conn, id, &record).inspect_err(log_failure)?;
        info!(id, roll_no = %record.roll_no, "student updated");
        Ok(())
    }

    /// Permanently remove student `id`.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = connect(&self.db_path)?;
        delete_student(&conn, id).inspect_err(log_failure)?;
        info!(id, "student deleted");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Student> {
        let conn = connect(&self.db_path)?;
        fetch_student(&conn, id)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = connect(&self.db_path)?;
        count_students(&conn)
    }

    /// Every student by ascending id, numbered 1..=N.
    pub fn list_all(&self) -> Result<Vec<RosterRow>> {
        let conn = connect(&self.db_path)?;
        Ok(number_rows(fetch_students(&conn)?))
    }

    /// Students whose name or roll number contains `query`, ignoring case. A
    /// blank query lists everything.
    pub fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<RosterRow>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_all();
        }
        let conn = connect(&self.db_path)?;
        Ok(number_rows(search_students(&conn, query, mode)?))
    }

    /// Write the whole roster to a CSV file; see [`export::export`].
    pub fn export(&self, path: &Path) -> Result<usize> {
        export::export(&self.db_path, path).inspect_err(log_failure)
    }
}

fn log_failure(err: &RosterError) {
    if err.is_user_error() {
        warn!("{err}");
    } else {
        tracing::error!(error = %err, "roster operation failed");
    }
}

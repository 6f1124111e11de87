use rusqlite::{ffi, params, Connection, Error as SqlError, OptionalExtension, Row};
use tracing::debug;

use super::connection::UNICODE_LOWER;
use crate::error::{Result, RosterError};
use crate::models::{SearchMode, Student};
use crate::validation::NewStudent;

const SELECT_COLUMNS: &str = "SELECT id, name, roll_no, branch, marks FROM students";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        roll_no: row.get(2)?,
        branch: row.get(3)?,
        marks: row.get(4)?,
    })
}

/// Retrieve every student by ascending id. The query doubles as the single
/// source of truth for listing and export order.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
    let students = stmt
        .query_map([], student_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(count = students.len(), "fetched students");
    Ok(students)
}

/// Case-insensitive substring search on one column, ascending id. The caller
/// supplies an already trimmed, non-empty query. Names are folded on both
/// sides with [`UNICODE_LOWER`]; roll numbers are stored uppercase already.
pub fn search_students(conn: &Connection, query: &str, mode: SearchMode) -> Result<Vec<Student>> {
    let (column, needle) = match mode {
        SearchMode::ByName => (format!("{UNICODE_LOWER}(name)"), query.to_lowercase()),
        SearchMode::ByRoll => ("roll_no".to_string(), query.to_uppercase()),
    };
    let pattern = format!("%{}%", escape_like(&needle));

    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE {column} LIKE ?1 ESCAPE '\\' ORDER BY id ASC"
    ))?;
    let students = stmt
        .query_map(params![pattern], student_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(%column, query, count = students.len(), "searched students");
    Ok(students)
}

/// Look up one student by id.
pub fn fetch_student(conn: &Connection, id: i64) -> Result<Student> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        student_from_row,
    )
    .optional()?
    .ok_or(RosterError::NotFound(id))
}

pub fn count_students(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Insert a new student and return the id SQLite assigned.
pub fn insert_student(conn: &Connection, record: &NewStudent) -> Result<i64> {
    conn.execute(
        "INSERT INTO students (name, roll_no, branch, marks) VALUES (?1, ?2, ?3, ?4)",
        params![record.name, record.roll_no, record.branch, record.marks],
    )
    .map_err(|err| map_unique_constraint(err, &record.roll_no))?;

    Ok(conn.last_insert_rowid())
}

/// Replace every mutable column of an existing student. An id that matches no
/// row is reported instead of silently succeeding.
pub fn update_student(conn: &Connection, id: i64, record: &NewStudent) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE students SET name = ?1, roll_no = ?2, branch = ?3, marks = ?4 WHERE id = ?5",
            params![record.name, record.roll_no, record.branch, record.marks, id],
        )
        .map_err(|err| map_unique_constraint(err, &record.roll_no))?;

    if updated == 0 {
        Err(RosterError::NotFound(id))
    } else {
        Ok(())
    }
}

pub fn delete_student(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM students WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(RosterError::NotFound(id))
    } else {
        Ok(())
    }
}

/// Turn a violation of the `roll_no` uniqueness constraint into
/// [`RosterError::DuplicateRoll`]; anything else stays a database error.
fn map_unique_constraint(err: SqlError, roll_no: &str) -> RosterError {
    match &err {
        SqlError::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RosterError::DuplicateRoll(roll_no.to_string())
        }
        _ => err.into(),
    }
}

/// Escape `LIKE` wildcards so user input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect, ensure_schema};
    use tempfile::TempDir;

    fn record(name: &str, roll_no: &str, marks: i64) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            roll_no: roll_no.to_string(),
            branch: "CS".to_string(),
            marks,
        }
    }

    fn open_temp() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.db");
        ensure_schema(&path).unwrap();
        let conn = connect(&path).unwrap();
        (dir, conn)
    }

    #[test]
    fn insert_and_fetch() {
        let (_dir, conn) = open_temp();
        let id = insert_student(&conn, &record("Alice", "R1", 88)).unwrap();

        let student = fetch_student(&conn, id).unwrap();
        assert_eq!(student.name, "Alice");
        assert_eq!(student.marks, 88);
        assert_eq!(count_students(&conn).unwrap(), 1);
    }

    #[test]
    fn duplicate_roll_is_typed() {
        let (_dir, conn) = open_temp();
        insert_student(&conn, &record("Alice", "R1", 88)).unwrap();

        let err = insert_student(&conn, &record("Other", "R1", 10)).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateRoll(ref roll) if roll == "R1"));
        assert_eq!(count_students(&conn).unwrap(), 1);
    }

    #[test]
    fn update_and_delete_missing_rows() {
        let (_dir, conn) = open_temp();
        assert!(matches!(
            update_student(&conn, 42, &record("A", "R1", 1)),
            Err(RosterError::NotFound(42))
        ));
        assert!(matches!(
            delete_student(&conn, 42),
            Err(RosterError::NotFound(42))
        ));
        assert!(matches!(fetch_student(&conn, 42), Err(RosterError::NotFound(42))));
    }

    #[test]
    fn ids_are_not_reused() {
        let (_dir, conn) = open_temp();
        insert_student(&conn, &record("A", "R1", 1)).unwrap();
        let second = insert_student(&conn, &record("B", "R2", 2)).unwrap();
        delete_student(&conn, second).unwrap();

        let third = insert_student(&conn, &record("C", "R3", 3)).unwrap();
        assert!(third > second);
    }

    #[test]
    fn search_matches_wildcards_literally() {
        let (_dir, conn) = open_temp();
        insert_student(&conn, &record("100% Sure", "R1", 1)).unwrap();
        insert_student(&conn, &record("Plain", "R2", 2)).unwrap();

        let hits = search_students(&conn, "%", SearchMode::ByName).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Sure");

        let hits = search_students(&conn, "_", SearchMode::ByName).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn name_search_folds_non_ascii_case() {
        let (_dir, conn) = open_temp();
        insert_student(&conn, &record("Élodie", "R1", 80)).unwrap();
        insert_student(&conn, &record("ÖZGÜR", "R2", 70)).unwrap();

        let hits = search_students(&conn, "élo", SearchMode::ByName).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Élodie");

        let hits = search_students(&conn, "özgü", SearchMode::ByName).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "ÖZGÜR");
    }

    #[test]
    fn escape_like_handles_backslash() {
        assert_eq!(escape_like(r"a\b%_"), r"a\\b\%\_");
    }
}

//! CSV export of the full roster.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::db::{connect, fetch_students};
use crate::error::{Result, RosterError};
use crate::models::{number_rows, RosterRow};

/// Column headings written as the first CSV record.
pub const HEADER: [&str; 5] = ["S.No", "Name", "Roll No", "Branch", "Marks"];

/// Write every student stored at `db_path` to a CSV file at `path`, returning
/// how many records were exported. An empty roster is reported as
/// [`RosterError::NothingToExport`] and no file is created.
///
/// The CSV is written to a temporary file next to `path` and renamed over it
/// once complete, so a failed export leaves any previous file untouched.
pub fn export(db_path: &Path, path: &Path) -> Result<usize> {
    let rows = {
        let conn = connect(db_path)?;
        number_rows(fetch_students(&conn)?)
    };
    if rows.is_empty() {
        return Err(RosterError::NothingToExport);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write_rows(&mut tmp, &rows)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    info!(count = rows.len(), path = %path.display(), "exported roster");
    Ok(rows.len())
}

/// Encode the header plus one record per row into `writer`.
pub fn write_rows<W: Write>(writer: W, rows: &[RosterRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for row in rows {
        let student = &row.student;
        wtr.write_record([
            row.serial.to_string(),
            student.name.clone(),
            student.roll_no.clone(),
            student.branch.clone(),
            student.marks.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

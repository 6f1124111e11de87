use std::fs;
use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Ensure the database file and the `students` table exist. Safe to call on
/// every start; an existing table is left untouched.
pub fn ensure_schema(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = connect(path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            roll_no TEXT UNIQUE NOT NULL,
            branch TEXT NOT NULL,
            marks INTEGER NOT NULL CHECK(marks >= 0)
        )",
        [],
    )?;
    debug!(path = %path.display(), "students schema ready");

    Ok(())
}

/// SQL function that lowercases with full Unicode case folding. SQLite's
/// built-in `lower()` and `LIKE` only fold ASCII letters.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

/// Open a connection for a single logical operation. The handle closes when
/// it is dropped, so callers keep it scoped to the function doing the work.
pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: String = ctx.get(0)?;
            Ok(text.to_lowercase())
        },
    )?;
    Ok(conn)
}

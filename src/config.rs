//! File locations used by the application.

use std::path::PathBuf;

use directories::BaseDirs;

/// SQLite file name, resolved against the process working directory.
const DB_FILE_NAME: &str = "students.db";
/// Folder name used beneath the user's home directory for the log file.
const LOG_DIR_NAME: &str = ".student-roster";
const LOG_FILE_NAME: &str = "student-roster.log";
/// File name offered in the export prompt.
const EXPORT_FILE_NAME: &str = "students.csv";

/// Where the roster keeps its database and writes its log.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve the default locations. The log lives under the user's home
    /// because stdout is owned by the terminal UI; without a home directory it
    /// falls back next to the database.
    pub fn resolve() -> Self {
        let log_path = match BaseDirs::new() {
            Some(base_dirs) => base_dirs.home_dir().join(LOG_DIR_NAME).join(LOG_FILE_NAME),
            None => PathBuf::from(LOG_FILE_NAME),
        };
        Self {
            db_path: PathBuf::from(DB_FILE_NAME),
            log_path,
        }
    }

    pub fn default_export_path() -> PathBuf {
        PathBuf::from(EXPORT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_is_process_relative() {
        let config = Config::resolve();
        assert_eq!(config.db_path, PathBuf::from("students.db"));
        assert!(config.log_path.ends_with(LOG_FILE_NAME));
    }
}

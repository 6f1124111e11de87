//! Core library surface for the Student Roster TUI application.
//!
//! The persistence, validation and export layers are usable without the
//! terminal front-end; `main.rs` only wires them to [`ui::run_app`].
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod roster;
pub mod ui;
pub mod validation;

pub use config::Config;
pub use db::ensure_schema;
pub use error::{Field, MarksProblem, Result, RosterError};
pub use export::export;
pub use models::{number_rows, RosterRow, SearchMode, Student};
pub use roster::Roster;
pub use validation::{validate, NewStudent, StudentInput};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

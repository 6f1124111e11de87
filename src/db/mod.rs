//! Persistence module split across logical submodules.

mod connection;
mod students;

pub use connection::{connect, ensure_schema};
pub use students::{
    count_students, delete_student, fetch_student, fetch_students, insert_student,
    search_students, update_student,
};

//! End-to-end checks of the record operations against a real SQLite file.

use std::fs;

use student_roster::{validate, Roster, RosterError, SearchMode};
use tempfile::TempDir;

fn temp_roster() -> (TempDir, Roster) {
    let dir = TempDir::new().unwrap();
    let roster = Roster::open(dir.path().join("students.db")).unwrap();
    (dir, roster)
}

fn seed(roster: &Roster) -> Vec<i64> {
    vec![
        roster.create("Alice", "R1", "CS", "88").unwrap(),
        roster.create("bob", "r2", "EE", "45").unwrap(),
        roster.create("Cara", "R3", "ME", "100").unwrap(),
    ]
}

#[test]
fn create_adds_exactly_one_normalized_record() {
    let (_dir, roster) = temp_roster();
    seed(&roster);
    let before = roster.list_all().unwrap();

    let id = roster.create("  Dev ", " cs-9 ", " it ", " 70 ").unwrap();

    let after = roster.list_all().unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let added: Vec<_> = after.iter().filter(|row| row.student.id == id).collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].student.name, "Dev");
    assert_eq!(added[0].student.roll_no, "CS-9");
    assert_eq!(added[0].student.branch, "IT");
    assert_eq!(added[0].serial, after.len());
}

#[test]
fn duplicate_roll_leaves_store_unchanged() {
    let (_dir, roster) = temp_roster();
    seed(&roster);
    let before = roster.list_all().unwrap();

    let err = roster.create("Imposter", "r1", "CS", "10").unwrap_err();
    assert!(matches!(err, RosterError::DuplicateRoll(ref roll) if roll == "R1"));
    assert_eq!(roster.list_all().unwrap(), before);
}

#[test]
fn update_changes_only_the_target_row() {
    let (_dir, roster) = temp_roster();
    let ids = seed(&roster);
    let before = roster.list_all().unwrap();

    roster.update(ids[1], "Bobby", "R2", "ee", "50").unwrap();

    let after = roster.list_all().unwrap();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.student.id, new.student.id);
        if new.student.id == ids[1] {
            assert_eq!(new.student.name, "Bobby");
            assert_eq!(new.student.marks, 50);
        } else {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn update_of_missing_id_is_not_found() {
    let (_dir, roster) = temp_roster();
    seed(&roster);
    assert!(matches!(
        roster.update(999, "X", "R9", "CS", "10"),
        Err(RosterError::NotFound(999))
    ));
}

#[test]
fn delete_keeps_serials_contiguous() {
    let (_dir, roster) = temp_roster();
    let ids = seed(&roster);

    roster.delete(ids[1]).unwrap();

    let rows = roster.list_all().unwrap();
    assert_eq!(rows.len(), 2);
    let serials: Vec<usize> = rows.iter().map(|r| r.serial).collect();
    assert_eq!(serials, vec![1, 2]);
    let stored: Vec<i64> = rows.iter().map(|r| r.student.id).collect();
    assert_eq!(stored, vec![ids[0], ids[2]]);

    assert!(matches!(roster.delete(ids[1]), Err(RosterError::NotFound(_))));
    assert_eq!(roster.count().unwrap(), 2);
}

#[test]
fn blank_search_equals_listing() {
    let (_dir, roster) = temp_roster();
    seed(&roster);

    let all = roster.list_all().unwrap();
    assert_eq!(roster.search("", SearchMode::ByName).unwrap(), all);
    assert_eq!(roster.search("   ", SearchMode::ByRoll).unwrap(), all);
}

#[test]
fn export_matches_expected_lines() {
    let (dir, roster) = temp_roster();
    seed(&roster);
    let path = dir.path().join("students.csv");

    let count = roster.export(&path).unwrap();
    assert_eq!(count, 3);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "S.No,Name,Roll No,Branch,Marks");
    assert_eq!(lines[1], "1,Alice,R1,CS,88");
    assert_eq!(lines[2], "2,bob,R2,EE,45");
    assert_eq!(lines[3], "3,Cara,R3,ME,100");
}

#[test]
fn export_of_empty_store_creates_no_file() {
    let (dir, roster) = temp_roster();
    let path = dir.path().join("students.csv");

    assert!(matches!(
        roster.export(&path),
        Err(RosterError::NothingToExport)
    ));
    assert!(!path.exists());
}

#[test]
fn export_after_delete_renumbers() {
    let (dir, roster) = temp_roster();
    let ids = seed(&roster);
    roster.delete(ids[0]).unwrap();
    let path = dir.path().join("after.csv");

    roster.export(&path).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().nth(1), Some("1,bob,R2,EE,45"));
}

#[test]
fn marks_validation_boundaries() {
    assert!(matches!(
        validate("A", "R1", "CS", "101", true),
        Err(RosterError::InvalidMarks { .. })
    ));
    assert!(matches!(
        validate("A", "R1", "CS", "-1", true),
        Err(RosterError::InvalidMarks { .. })
    ));
    assert!(validate("A", "R1", "CS", "50", true).is_ok());
}

#[test]
fn reopening_keeps_existing_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("students.db");
    {
        let roster = Roster::open(path.clone()).unwrap();
        seed(&roster);
    }
    let roster = Roster::open(path).unwrap();
    assert_eq!(roster.count().unwrap(), 3);
}

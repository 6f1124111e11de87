use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::config::Config;
use crate::models::Student;

/// Internal representation of the student form fields.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) name: String,
    pub(crate) roll_no: String,
    pub(crate) branch: String,
    pub(crate) marks: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

/// Fields available within the student form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum StudentField {
    #[default]
    Name,
    RollNo,
    Branch,
    Marks,
}

impl StudentField {
    pub(crate) const ALL: [StudentField; 4] = [
        StudentField::Name,
        StudentField::RollNo,
        StudentField::Branch,
        StudentField::Marks,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::RollNo => "Roll No",
            StudentField::Branch => "Branch",
            StudentField::Marks => "Marks",
        }
    }

    /// Row offset of the field inside the form popup.
    pub(crate) fn row(self) -> u16 {
        match self {
            StudentField::Name => 0,
            StudentField::RollNo => 1,
            StudentField::Branch => 2,
            StudentField::Marks => 3,
        }
    }

    fn next(self) -> Self {
        match self {
            StudentField::Name => StudentField::RollNo,
            StudentField::RollNo => StudentField::Branch,
            StudentField::Branch => StudentField::Marks,
            StudentField::Marks => StudentField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            StudentField::Name => StudentField::Marks,
            StudentField::RollNo => StudentField::Name,
            StudentField::Branch => StudentField::RollNo,
            StudentField::Marks => StudentField::Branch,
        }
    }
}

impl StudentForm {
    /// Pre-fill the form from the selected record when editing.
    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            branch: student.branch.clone(),
            marks: student.marks.to_string(),
            active: StudentField::Name,
            error: None,
        }
    }

    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.active = self.active.previous();
    }

    fn value(&self, field: StudentField) -> &String {
        match field {
            StudentField::Name => &self.name,
            StudentField::RollNo => &self.roll_no,
            StudentField::Branch => &self.branch,
            StudentField::Marks => &self.marks,
        }
    }

    fn value_mut(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Name => &mut self.name,
            StudentField::RollNo => &mut self.roll_no,
            StudentField::Branch => &mut self.branch,
            StudentField::Marks => &mut self.marks,
        }
    }

    /// Append a character to the active field. Marks only take digits and a
    /// leading minus sign; range checks happen on save.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == StudentField::Marks {
            let allowed = ch.is_ascii_digit() || (ch == '-' && self.marks.is_empty());
            if !allowed {
                return false;
            }
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: StudentField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        self.value(field).chars().count()
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmStudentDelete {
    pub(crate) id: i64,
    /// `Name (ROLL)` as shown in the dialog and the status line.
    pub(crate) label: String,
}

impl ConfirmStudentDelete {
    pub(crate) fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            label: student.to_string(),
        }
    }
}

/// Destination prompt shown before writing the CSV file.
#[derive(Clone)]
pub(crate) struct ExportForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl Default for ExportForm {
    fn default() -> Self {
        Self {
            path: Config::default_export_path().display().to_string(),
            error: None,
        }
    }
}

impl ExportForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }
}

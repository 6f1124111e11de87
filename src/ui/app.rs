use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::error::RosterError;
use crate::roster::Roster;

use super::forms::{ConfirmStudentDelete, ExportForm, StudentField, StudentForm};
use super::helpers::{centered_rect, cursor_column, marks_style, surface_error};
use super::screens::{RosterScreen, SearchFilter, SearchState};

/// Title bar above the table; also hosts the search bar.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const PAGE_STEP: isize = 10;
const TABLE_HEADINGS: [&str; 5] = ["S.No", "Name", "Roll No", "Branch", "Marks"];

/// Fine-grained modes layered over the roster table.
enum Mode {
    Normal,
    Adding(StudentForm),
    Editing { id: i64, form: StudentForm },
    ConfirmDelete(ConfirmStudentDelete),
    Searching(SearchState),
    Exporting(ExportForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

#[derive(Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    roster: Roster,
    screen: RosterScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Load the initial listing and start on the table.
    pub fn new(roster: Roster) -> Result<Self> {
        let rows = roster.list_all().context("failed to load students")?;
        Ok(Self {
            roster,
            screen: RosterScreen::new(rows),
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Route a key press to the handler for the current mode. Returns `true`
    /// when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_student_form(code, None, form)?,
            Mode::Editing { id, form } => self.handle_student_form(code, Some(id), form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::Exporting(form) => self.handle_export(code, form)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.screen.filter.is_some() {
                    self.show_all()?;
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.screen.move_selection(-1),
            KeyCode::Down => self.screen.move_selection(1),
            KeyCode::PageUp => self.screen.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.screen.move_selection(PAGE_STEP),
            KeyCode::Home => self.screen.select_first(),
            KeyCode::End => self.screen.select_last(),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Adding(StudentForm::default()));
            }
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                return self.open_edit_form();
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(row) = self.screen.current_row() {
                    let confirm = ConfirmStudentDelete::from(&row.student);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status(
                    "Select a record from the table to delete.",
                    StatusKind::Error,
                );
            }
            KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState::from_filter(
                    self.screen.filter.as_ref(),
                )));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.show_all()?,
            KeyCode::Char('x') | KeyCode::Char('X') => return self.open_export_prompt(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Re-read the selected record so the form shows what is stored, not what
    /// the table last rendered.
    fn open_edit_form(&mut self) -> Result<Mode> {
        let Some(id) = self.screen.current_row().map(|row| row.student.id) else {
            self.set_status(
                "Select a record from the table to update.",
                StatusKind::Error,
            );
            return Ok(Mode::Normal);
        };

        match self.roster.get(id) {
            Ok(student) => {
                self.clear_status();
                Ok(Mode::Editing {
                    id,
                    form: StudentForm::from_student(&student),
                })
            }
            Err(err @ RosterError::NotFound(_)) => {
                self.reload(None)?;
                self.set_status(err.to_string(), StatusKind::Error);
                Ok(Mode::Normal)
            }
            Err(err) => Err(anyhow::Error::new(err).context("failed to load student")),
        }
    }

    fn handle_student_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: StudentForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if id.is_some() {
                    "Edit cancelled."
                } else {
                    "Add student cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => match self.save_student(id, &form) {
                Ok((saved_id, message)) => {
                    self.refresh_after_save(saved_id, message);
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::Editing { id, form },
            None => Mode::Adding(form),
        })
    }

    /// Write the form to the store. Returns the saved id and the success
    /// message; the listing is refreshed separately.
    fn save_student(&self, id: Option<i64>, form: &StudentForm) -> Result<(i64, &'static str)> {
        match id {
            None => {
                let new_id =
                    self.roster
                        .create(&form.name, &form.roll_no, &form.branch, &form.marks)?;
                Ok((new_id, "Student added successfully."))
            }
            Some(id) => {
                self.roster
                    .update(id, &form.name, &form.roll_no, &form.branch, &form.marks)?;
                Ok((id, "Record updated successfully."))
            }
        }
    }

    /// The record is already committed here, so a failed refresh is only
    /// reported and never reopens the form.
    fn refresh_after_save(&mut self, saved_id: i64, message: &str) {
        match self.reload(Some(saved_id)) {
            Ok(()) => self.set_status(message, StatusKind::Info),
            Err(err) => self.set_status(
                format!("{message} Listing not refreshed: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmStudentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(err) = self.perform_delete(&confirm) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmStudentDelete) -> Result<()> {
        let result = self.roster.delete(confirm.id);
        self.reload(None)?;
        result?;
        self.set_status(
            format!("Deleted {}.", confirm.label),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Filter the table live while the query is typed.
    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.show_all()?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                if self.screen.filter.is_some() {
                    self.set_status(
                        format!("{} matching record(s).", self.screen.rows.len()),
                        StatusKind::Info,
                    );
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.screen.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.screen.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Tab | KeyCode::BackTab => state.mode = state.mode.toggle(),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        self.apply_filter(state.as_filter())?;
        Ok(Mode::Searching(state))
    }

    fn open_export_prompt(&mut self) -> Result<Mode> {
        let count = self.roster.count().context("failed to count students")?;
        if count == 0 {
            self.set_status(RosterError::NothingToExport.to_string(), StatusKind::Info);
            return Ok(Mode::Normal);
        }
        self.clear_status();
        Ok(Mode::Exporting(ExportForm::default()))
    }

    fn handle_export(&mut self, code: KeyCode, mut form: ExportForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Export cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => {
                let path = form.path.trim().to_string();
                if path.is_empty() {
                    form.error = Some("Export path is required.".to_string());
                    return Ok(Mode::Exporting(form));
                }
                match self.roster.export(Path::new(&path)) {
                    Ok(count) => {
                        self.set_status(
                            format!("Exported {count} records to {path}"),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err @ RosterError::NothingToExport) => {
                        self.set_status(err.to_string(), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let err = anyhow::Error::new(err).context("failed to export students");
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::Exporting(form))
                    }
                }
            }
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
                Ok(Mode::Exporting(form))
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Ok(Mode::Exporting(form))
            }
            _ => Ok(Mode::Exporting(form)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Adding(form) => self.draw_student_form(frame, area, "Add Student", form),
            Mode::Editing { form, .. } => {
                self.draw_student_form(frame, area, "Update Student", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[0], state),
            Mode::Exporting(form) => self.draw_export_prompt(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let summary = match &self.screen.filter {
            Some(filter) => Line::from(vec![
                Span::styled(
                    format!("{} contains \"{}\"", filter.mode.label(), filter.query),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(format!(" - {} match(es)", self.screen.rows.len())),
            ]),
            None => Line::from(format!("Showing all {} student(s)", self.screen.rows.len())),
        };

        let block = Block::default()
            .title(Span::styled(
                "Student Management",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL);
        frame.render_widget(Paragraph::new(summary).block(block), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Students");

        if self.screen.rows.is_empty() {
            let text = if self.screen.filter.is_some() {
                "No students match the current search."
            } else {
                "No students yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(TABLE_HEADINGS.map(Cell::from))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.screen.rows.iter().map(|row| {
            let student = &row.student;
            Row::new(vec![
                Cell::from(row.serial.to_string()),
                Cell::from(student.name.clone()),
                Cell::from(student.roll_no.clone()),
                Cell::from(student.branch.clone()),
                Cell::from(student.marks.to_string()).style(marks_style(student.marks)),
            ])
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Length(14),
            Constraint::Min(10),
            Constraint::Length(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.screen.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[+]", " Add  "),
                ("[e]", " Edit  "),
                ("[d]", " Delete  "),
                ("[/]", " Search  "),
                ("[r]", " Show all  "),
                ("[x]", " Export CSV  "),
                ("[q]", " Quit"),
            ],
            Mode::Adding(_) | Mode::Editing { .. } => &[
                ("[Enter]", " Save  "),
                ("[Tab]", " Next field  "),
                ("[Esc]", " Clear"),
            ],
            Mode::ConfirmDelete(_) => &[("[y]", " Delete  "), ("[n]", " Keep")],
            Mode::Searching(_) => &[
                ("[Tab]", " Name/Roll  "),
                ("[Enter]", " Keep filter  "),
                ("[Esc]", " Show all"),
            ],
            Mode::Exporting(_) => &[("[Enter]", " Export  "), ("[Esc]", " Cancel")],
        };

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
            .collect();
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Search by {}", state.mode.label()));
        let inner = block.inner(area);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query))).block(block);
        frame.render_widget(paragraph, area);

        let cursor_x = cursor_column(inner, "Search: ", state.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 45, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = StudentField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let field = form.active;
        let prefix = format!("{}: ", field.label());
        let cursor_x = cursor_column(inner, &prefix, form.value_len(field));
        let cursor_y = inner.y.saturating_add(field.row()).min(inner.bottom().saturating_sub(1));
        frame.set_cursor_position((cursor_x, cursor_y.max(inner.y)));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmStudentDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Are you sure you want to delete {}?",
                confirm.label
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_export_prompt(&self, frame: &mut Frame, area: Rect, form: &ExportForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Export CSV").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("File: "),
                Span::styled(form.path.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        match &form.error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Enter to export • Esc to cancel",
                Style::default().fg(Color::Gray),
            ))),
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = cursor_column(inner, "File: ", form.path.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn show_all(&mut self) -> Result<()> {
        self.apply_filter(None)?;
        self.set_status("Showing all students.", StatusKind::Info);
        Ok(())
    }

    fn apply_filter(&mut self, filter: Option<SearchFilter>) -> Result<()> {
        let focus_id = self.screen.current_row().map(|row| row.student.id);
        self.screen.filter = filter;
        self.reload(focus_id)
    }

    /// Re-run the active query so serial numbers are recomputed after every
    /// change to the underlying rows.
    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        let rows = match &self.screen.filter {
            Some(filter) => self.roster.search(&filter.query, filter.mode),
            None => self.roster.list_all(),
        }
        .context("failed to reload students")?;
        debug!(rows = rows.len(), "listing refreshed");
        self.screen.set_rows(rows, focus_id);
        Ok(())
    }
}

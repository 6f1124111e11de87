use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::error::RosterError;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Column for a text cursor that follows `prefix` and `value_chars` typed
/// characters, kept on the last column of `inner` when the text is wider.
pub(crate) fn cursor_column(inner: Rect, prefix: &str, value_chars: usize) -> u16 {
    let offset = prefix.chars().count().saturating_add(value_chars);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let last = inner.right().saturating_sub(1).max(inner.x);
    inner.x.saturating_add(offset).min(last)
}

/// Pick the message to show for a failed action. Roster errors already carry
/// user-facing text; anything else reports its innermost cause.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(roster) = err.downcast_ref::<RosterError>() {
        if roster.is_user_error() {
            return roster.to_string();
        }
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Color marks so failing and top scores stand out in the table.
pub(crate) fn marks_style(marks: i64) -> Style {
    match marks {
        m if m < 40 => Style::default().fg(Color::Red),
        m if m >= 90 => Style::default().fg(Color::Green),
        _ => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn user_errors_keep_their_message() {
        let err: Error = Error::from(RosterError::DuplicateRoll("R1".to_string()))
            .context("failed to add student");
        assert_eq!(
            surface_error(&err),
            "Roll number R1 already exists. Use a unique roll number."
        );
    }

    #[test]
    fn other_errors_report_root_cause() {
        let err = Err::<(), _>(std::io::Error::other("disk full"))
            .context("failed to write export")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn cursor_follows_short_text() {
        let inner = Rect::new(10, 5, 40, 3);
        assert_eq!(cursor_column(inner, "Name: ", 3), 19);
    }

    #[test]
    fn cursor_stays_inside_for_long_text() {
        let inner = Rect::new(10, 5, 40, 3);
        assert_eq!(cursor_column(inner, "Name: ", 200), 49);
        assert_eq!(cursor_column(inner, "Name: ", 70_000), 49);
        assert_eq!(cursor_column(Rect::new(3, 0, 0, 0), "File: ", 5), 3);
    }

    #[test]
    fn popup_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert!(popup.width > 0 && popup.height > 0);
        assert!(popup.x > 0 && popup.y > 0);
        assert!(popup.right() <= area.right() && popup.bottom() <= area.bottom());
    }
}

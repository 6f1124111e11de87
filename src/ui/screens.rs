use crate::models::{RosterRow, SearchMode};

/// Search currently applied to the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SearchFilter {
    pub(crate) query: String,
    pub(crate) mode: SearchMode,
}

/// State for the inline search bar while it is open.
pub(crate) struct SearchState {
    pub(crate) query: String,
    pub(crate) mode: SearchMode,
}

impl SearchState {
    /// Reopen the bar with whatever filter is already applied.
    pub(crate) fn from_filter(filter: Option<&SearchFilter>) -> Self {
        match filter {
            Some(filter) => Self {
                query: filter.query.clone(),
                mode: filter.mode,
            },
            None => Self {
                query: String::new(),
                mode: SearchMode::default(),
            },
        }
    }

    /// The filter this state represents; blank queries mean "show all".
    pub(crate) fn as_filter(&self) -> Option<SearchFilter> {
        if self.query.trim().is_empty() {
            None
        } else {
            Some(SearchFilter {
                query: self.query.clone(),
                mode: self.mode,
            })
        }
    }
}

/// The listing shown in the main table plus the highlighted row.
pub(crate) struct RosterScreen {
    pub(crate) rows: Vec<RosterRow>,
    pub(crate) selected: usize,
    pub(crate) filter: Option<SearchFilter>,
}

impl RosterScreen {
    pub(crate) fn new(rows: Vec<RosterRow>) -> Self {
        Self {
            rows,
            selected: 0,
            filter: None,
        }
    }

    pub(crate) fn current_row(&self) -> Option<&RosterRow> {
        self.rows.get(self.selected)
    }

    /// Replace the listing, keeping `focus_id` highlighted when it is still
    /// present and otherwise clamping the selection.
    pub(crate) fn set_rows(&mut self, rows: Vec<RosterRow>, focus_id: Option<i64>) {
        self.rows = rows;
        if let Some(id) = focus_id {
            if let Some(idx) = self.rows.iter().position(|row| row.student.id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        let new = (self.selected as isize + offset).clamp(0, last);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

//! Ranked fragment list with status markers and cumulative coverage.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::app::selection::SelectionState;
use crate::app::view::{FragmentStatus, FragmentView};

/// Cursor over the rendered fragment rows. The view itself is rebuilt on
/// every state change, so this only remembers where the user is.
#[derive(Debug, Default)]
pub struct FragmentListState {
    cursor: usize,
}

impl FragmentListState {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn select_next(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor in range after the underlying view shrank.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

#[derive(Debug, Default)]
pub struct FragmentList;

impl FragmentList {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        view: &FragmentView,
        selection: &SelectionState,
        state: &FragmentListState,
        has_focus: bool,
    ) {
        let threshold = selection
            .threshold()
            .map(|boundary| boundary.to_string())
            .unwrap_or_else(|| "none".to_string());
        let title = format!(
            " Fragments ({}) · {} · t={} ",
            view.len(),
            selection.mode().as_str(),
            threshold
        );

        let items: Vec<ListItem> = if view.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "No fragments. Open an event log with :open <path>.",
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            view.rows
                .iter()
                .map(|row| {
                    let percent = if view.total_weight == 0 {
                        0
                    } else {
                        row.cumulative * 100 / view.total_weight
                    };
                    let line = Line::from(vec![
                        Span::styled(
                            format!("{} ", row.status.marker()),
                            Self::marker_style(row.status),
                        ),
                        Span::styled(
                            format!("{:>3} ", row.index),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(row.preview.clone()),
                        Span::styled(
                            format!("  ×{} ({percent:>3}%)", row.frequency),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]);
                    ListItem::new(line)
                })
                .collect()
        };

        let mut list_state = ListState::default();
        if !view.is_empty() {
            list_state.select(Some(state.cursor().min(view.len() - 1)));
        }

        let highlight_style = if has_focus {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().bg(Color::DarkGray)
        };

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(highlight_style)
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn marker_style(status: FragmentStatus) -> Style {
        match status {
            FragmentStatus::ForcedIncluded => {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            }
            FragmentStatus::ForcedExcluded => {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            }
            FragmentStatus::Included => Style::default().fg(Color::Cyan),
            FragmentStatus::Suggested => Style::default().fg(Color::Yellow),
            FragmentStatus::Excluded => Style::default().fg(Color::DarkGray),
        }
    }
}

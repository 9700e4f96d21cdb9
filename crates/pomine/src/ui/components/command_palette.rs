//! Command palette overlay for quick actions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const COMMAND_HINT: &str =
    "open · mode · strategy · threshold · select · export · copy · clear-cache · reset · save · quit";

/// Interactive state backing the command palette overlay. Submitted
/// commands are kept for recall with the arrow keys.
#[derive(Debug, Default, Clone)]
pub struct CommandPaletteState {
    visible: bool,
    input: String,
    history: Vec<String>,
    recall: Option<usize>,
}

impl CommandPaletteState {
    /// Reveal the palette with an empty input buffer.
    pub fn open(&mut self) {
        self.visible = true;
        self.input.clear();
        self.recall = None;
    }

    /// Hide the palette.
    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Whether the palette is currently displayed.
    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Access the current input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Consume the current input, recording it in the history.
    pub fn take_input(&mut self) -> String {
        let input = std::mem::take(&mut self.input);
        self.recall = None;
        let trimmed = input.trim();
        if !trimmed.is_empty() && self.history.last().map(String::as_str) != Some(trimmed) {
            self.history.push(trimmed.to_string());
        }
        input
    }

    /// Append a character to the buffer.
    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
        self.recall = None;
    }

    /// Remove the most recently appended character if present.
    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Replace the buffer with the previous history entry.
    pub fn recall_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let position = match self.recall {
            None => self.history.len() - 1,
            Some(position) => position.saturating_sub(1),
        };
        self.recall = Some(position);
        self.input = self.history[position].clone();
    }

    /// Step forward through the history; past the newest entry the buffer
    /// goes back to empty.
    pub fn recall_next(&mut self) {
        let Some(position) = self.recall else {
            return;
        };
        if position + 1 < self.history.len() {
            self.recall = Some(position + 1);
            self.input = self.history[position + 1].clone();
        } else {
            self.recall = None;
            self.input.clear();
        }
    }
}

/// Visual component that renders the command palette overlay.
#[derive(Debug, Default)]
pub struct CommandPalette;

impl CommandPalette {
    /// Draw the palette if it is visible.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &CommandPaletteState) {
        if !state.is_open() || area.height < 6 {
            return;
        }

        let width = area.width.saturating_sub(10).min(80);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height.saturating_sub(6),
            width,
            height: 5,
        };

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title("Command")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), popup);

        let inner = block.inner(popup);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let prompt = Paragraph::new(format!(":{}", state.input()))
            .style(Style::default().fg(Color::White));
        frame.render_widget(prompt, layout[0]);

        let hint = Paragraph::new(COMMAND_HINT)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, layout[1]);
    }
}

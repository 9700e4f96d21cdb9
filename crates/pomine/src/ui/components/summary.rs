//! Model summary component.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::coordinator::MiningStrategy;

/// Figures shown in the summary panel, rebuilt after every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStats {
    pub places: usize,
    pub transitions: usize,
    pub arcs: usize,
    pub fragments: usize,
    pub selected: usize,
    pub suggested: usize,
    pub included_weight: u64,
    pub total_weight: u64,
    pub strategy: MiningStrategy,
    pub mining: bool,
    pub mining_calls: u64,
    pub cached_pieces: usize,
}

/// Displays the published model and miner statistics.
#[derive(Debug, Default)]
pub struct ModelSummary {
    latest: Option<ModelStats>,
}

impl ModelSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored statistics with fresh data from the coordinator.
    pub fn update(&mut self, stats: ModelStats) {
        self.latest = Some(stats);
    }

    /// Clear the rendered state when no log is open.
    pub fn clear(&mut self) {
        self.latest = None;
    }

    pub fn latest(&self) -> Option<&ModelStats> {
        self.latest.as_ref()
    }

    /// Render the summary inside the provided area.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title("Model").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        match &self.latest {
            Some(stats) => {
                let paragraph =
                    Paragraph::new(summary_lines(stats)).wrap(Wrap { trim: true });
                frame.render_widget(paragraph, inner);
            }
            None => {
                let placeholder = Paragraph::new("No log open")
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(placeholder, inner);
            }
        }
    }
}

fn summary_lines(stats: &ModelStats) -> Vec<Line<'static>> {
    let coverage = if stats.total_weight == 0 {
        0
    } else {
        stats.included_weight * 100 / stats.total_weight
    };
    let coverage_color = if coverage >= 90 {
        Color::Green
    } else if coverage >= 50 {
        Color::Yellow
    } else {
        Color::Red
    };

    let shape = if stats.places == 0 && stats.transitions == 0 {
        Span::styled("empty", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!(
                "{} places, {} transitions, {} arcs",
                stats.places, stats.transitions, stats.arcs
            ),
            Style::default().fg(Color::Cyan),
        )
    };

    let miner_state = if stats.mining {
        Span::styled(
            "working…",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("idle")
    };

    vec![
        Line::from(vec![
            Span::styled("Net", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            shape,
        ]),
        Line::from(vec![
            Span::styled("Coverage", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::styled(
                format!("{}/{}", stats.included_weight, stats.total_weight),
                Style::default().fg(coverage_color),
            ),
            Span::raw(" instances ("),
            Span::styled(format!("{coverage}%"), Style::default().fg(coverage_color)),
            Span::raw(")"),
        ]),
        Line::from(vec![
            Span::styled("Selected", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::raw(format!(
                "{} of {} fragments, {} suggested",
                stats.selected, stats.fragments, stats.suggested
            )),
        ]),
        Line::from(vec![
            Span::styled("Miner", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::raw(format!("{} · ", stats.strategy.as_str())),
            miner_state,
            Span::styled(
                format!(
                    " · {} runs · {} cached",
                    stats.mining_calls, stats.cached_pieces
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn stats() -> ModelStats {
        ModelStats {
            places: 4,
            transitions: 3,
            arcs: 8,
            fragments: 5,
            selected: 2,
            suggested: 1,
            included_weight: 9,
            total_weight: 12,
            strategy: MiningStrategy::Incremental,
            mining: false,
            mining_calls: 3,
            cached_pieces: 4,
        }
    }

    #[test]
    fn renders_empty_state_without_stats() {
        let backend = TestBackend::new(44, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let summary = ModelSummary::new();
        terminal
            .draw(|frame| {
                let area = frame.size();
                summary.render(frame, area);
            })
            .unwrap();
    }

    #[test]
    fn renders_model_and_miner_lines() {
        let backend = TestBackend::new(60, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut summary = ModelSummary::new();
        summary.update(stats());
        terminal
            .draw(|frame| {
                let area = frame.size();
                summary.render(frame, area);
            })
            .unwrap();
    }

    #[test]
    fn update_and_clear_swap_the_latest_stats() {
        let mut summary = ModelSummary::new();
        assert!(summary.latest().is_none());
        summary.update(stats());
        assert_eq!(summary.latest().map(|stats| stats.places), Some(4));
        summary.clear();
        assert!(summary.latest().is_none());
    }
}

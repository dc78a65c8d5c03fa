use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::palette::Palette;
use crate::game::{GameState, Position};

const CELL: &str = "■ ";
const APPLE: &str = "● ";
const EMPTY: &str = ". ";

/// Draws a whole frame from a borrowed game state. Holds no state between frames.
pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_score(state), chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        frame.render_widget(self.render_grid(state), game_area);
        frame.render_widget(self.render_controls(), chunks[2]);
    }

    // Every cell is drawn each frame, so nothing from the previous frame survives
    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let spans: Vec<Span> = (0..state.grid_width)
                .map(|x| self.cell(state, head, Position::new(x as i32, y as i32)))
                .collect();
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn cell(&self, state: &GameState, head: Position, pos: Position) -> Span<'static> {
        if pos == head {
            Span::styled(
                CELL,
                Style::default()
                    .fg(self.palette.head)
                    .add_modifier(Modifier::BOLD),
            )
        } else if state.snake.collides_with_body(pos) {
            Span::styled(CELL, Style::default().fg(self.palette.body))
        } else if pos == state.apple {
            Span::styled(
                APPLE,
                Style::default()
                    .fg(self.palette.apple)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(EMPTY, Style::default().fg(self.palette.empty))
        }
    }

    fn render_score(&self, state: &GameState) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("←↑↓→", Style::default().fg(self.palette.head)),
            Span::raw(" to move | "),
            Span::styled("Q", Style::default().fg(self.palette.apple)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

//! The lawn: planting, the running simulation and its HUD.

use crossterm::event::{KeyCode, KeyEvent};
use derive_getters::Getters;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

use crate::screens::report::format_duration;
use crate::screens::screen::{Screen, ScreenTransition};
use crate::{COLUMNS, GameInfo, Level, LevelConfig, PlantKind, ROWS};

/// State for the level screen.
#[derive(Debug, Getters)]
pub struct LevelScreen {
    level: Level,
    cursor: (usize, usize),
    selected: PlantKind,
    message: Option<String>,
}

impl LevelScreen {
    /// Starts a fresh level.
    #[instrument(skip(config))]
    pub fn new(config: LevelConfig) -> Self {
        Self {
            level: Level::new(config),
            cursor: (ROWS / 2, 0),
            selected: PlantKind::Sunflower,
            message: None,
        }
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let (row, col) = self.cursor;
        let row = row.saturating_add_signed(d_row).min(ROWS - 1);
        let col = col.saturating_add_signed(d_col).min(COLUMNS - 1);
        self.cursor = (row, col);
    }

    fn plant_selected(&mut self) {
        let (row, col) = self.cursor;
        match self.level.place_plant(self.selected, row, col) {
            Ok(()) => self.message = Some(format!("Planted {}", self.selected)),
            Err(e) => {
                debug!(error = %e, "Planting refused");
                self.message = Some(e.to_string());
            }
        }
    }

    fn finish(&self, info: &mut GameInfo) -> ScreenTransition {
        info.record_level(&self.level);
        info!(
            score = self.level.score(),
            elapsed_ms = self.level.elapsed_ms(),
            outcome = ?self.level.outcome(),
            "Level finished"
        );
        ScreenTransition::GoToReport
    }

    fn lawn_lines(&self) -> Vec<Line<'static>> {
        let (cursor_row, cursor_col) = self.cursor;
        (0..ROWS)
            .map(|row| {
                let mower = if self.level.mower_ready(row) { "M " } else { "  " };
                let mut spans = vec![Span::styled(mower, Style::default().fg(Color::Red))];

                // One extra column holds zombies that have not stepped onto the lawn yet.
                for col in 0..=COLUMNS {
                    let plant = self
                        .level
                        .plant_at(row, col)
                        .map_or('.', |p| p.kind().glyph());
                    let pea = if self
                        .level
                        .peas()
                        .iter()
                        .any(|p| *p.row() == row && p.x().floor() as usize == col)
                    {
                        'o'
                    } else {
                        ' '
                    };
                    let zombie = self
                        .level
                        .zombies()
                        .iter()
                        .find(|z| {
                            *z.row() == row
                                && (z.x().max(0.0).floor() as usize).min(COLUMNS) == col
                        })
                        .map_or(' ', |z| z.kind().glyph());

                    let text = if col == COLUMNS {
                        format!(" {}", zombie)
                    } else {
                        format!("{}{}{} ", plant, pea, zombie)
                    };
                    let style = if (row, col) == (cursor_row, cursor_col) {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else if col == COLUMNS {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default().fg(Color::Green)
                    };
                    spans.push(Span::styled(text, style));
                }
                Line::from(spans)
            })
            .collect()
    }

    fn seed_line(&self) -> Line<'static> {
        let spans = PlantKind::iter()
            .enumerate()
            .map(|(i, kind)| {
                let recharge = self.level.recharge_remaining(kind);
                let label = if recharge > 0 {
                    format!(" {}:{} {} ({}s) ", i + 1, kind, kind.cost(), recharge.div_ceil(1000))
                } else {
                    format!(" {}:{} {} ", i + 1, kind, kind.cost())
                };
                let mut style = if *self.level.sun() >= kind.cost() && recharge == 0 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                if kind == self.selected {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Span::styled(label, style)
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }
}

impl Screen for LevelScreen {
    #[instrument(skip(self, frame, _info))]
    fn render(&self, frame: &mut Frame, _info: &GameInfo) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(ROWS as u16 + 2),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(frame.area());

        let hud = format!(
            "{}   Sun: {}   Score: {}   Waves left: {}   Time: {}",
            self.level.config().name(),
            self.level.sun(),
            self.level.score(),
            self.level.waves_remaining(),
            format_duration(*self.level.elapsed_ms()),
        );
        let header = Paragraph::new(hud)
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let seeds = Paragraph::new(self.seed_line())
            .block(Block::default().borders(Borders::ALL).title("Seeds"));
        frame.render_widget(seeds, chunks[1]);

        let lawn = Paragraph::new(self.lawn_lines())
            .block(Block::default().borders(Borders::ALL).title("Lawn"));
        frame.render_widget(lawn, chunks[2]);

        let message = Paragraph::new(self.message.as_deref().unwrap_or(""))
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(message, chunks[3]);

        let help = Paragraph::new("Arrows: Move | 1-4: Seed | Enter/Space: Plant | d: Dig | Esc/q: Surrender")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[4]);
    }

    #[instrument(skip(self, key, info))]
    fn handle_key(&mut self, key: KeyEvent, info: &mut GameInfo) -> ScreenTransition {
        match key.code {
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.plant_selected(),
            KeyCode::Char('d') | KeyCode::Char('D') => {
                let (row, col) = self.cursor;
                if self.level.dig_up(row, col) {
                    self.message = Some("Dug up".to_string());
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(kind) = c.to_digit(10).and_then(PlantKind::from_hotkey) {
                    self.selected = kind;
                    self.message = Some(format!("Selected {}", kind));
                }
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.level.surrender();
                return self.finish(info);
            }
            _ => {}
        }
        ScreenTransition::Stay
    }

    fn update(&mut self, elapsed_ms: u64, info: &mut GameInfo) -> ScreenTransition {
        self.level.update(elapsed_ms);
        if self.level.outcome().is_some() {
            return self.finish(info);
        }
        ScreenTransition::Stay
    }
}

//! End-of-game report: score card, kill breakdown and score submission.

use crossterm::event::{KeyCode, KeyEvent};
use derive_getters::Getters;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{error, info, instrument};

use crate::screens::screen::{Screen, ScreenTransition};
use crate::{GameInfo, KillTally, LeaderboardApi, LevelOutcome};

/// Formats milliseconds as `MM:SS`, dropping partial seconds.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Result of the report's one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Offline, or no registered player.
    NotAttempted,
    /// The server stored the game.
    Recorded {
        /// Stored record id.
        game_record_id: i32,
    },
    /// The submission failed; the report is shown offline.
    Failed {
        /// Why it failed.
        reason: String,
    },
}

/// Report buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// Start another level.
    PlayAgain,
    /// Leave the game.
    Exit,
}

/// State for the report screen.
#[derive(Debug, Getters)]
pub struct ReportScreen {
    score: u32,
    game_duration_ms: u64,
    zombies_killed: KillTally,
    outcome: Option<LevelOutcome>,
    is_offline: bool,
    status: SubmissionStatus,
    selected: ReportAction,
}

impl ReportScreen {
    /// Reads the results from `info` and submits them once when online.
    ///
    /// A failed submission is logged and turns this report offline; the
    /// locally computed score is shown either way.
    #[instrument(skip(info, api))]
    pub async fn startup(info: &GameInfo, api: Option<&dyn LeaderboardApi>) -> Self {
        let mut screen = Self {
            score: *info.final_score(),
            game_duration_ms: *info.game_duration_ms(),
            zombies_killed: info.zombies_killed().clone(),
            outcome: *info.outcome(),
            is_offline: *info.is_offline(),
            status: SubmissionStatus::NotAttempted,
            selected: ReportAction::PlayAgain,
        };

        let (Some(request), Some(api)) = (info.submission(), api) else {
            if !screen.is_offline {
                info!("No registered player or server, report stays local");
            }
            return screen;
        };

        match api.submit_score(&request).await {
            Ok(reply) => {
                info!(game_record_id = reply.game_record_id, "Score submitted");
                screen.status = SubmissionStatus::Recorded {
                    game_record_id: reply.game_record_id,
                };
            }
            Err(e) => {
                error!(error = %e, "Failed to submit score");
                screen.is_offline = true;
                screen.status = SubmissionStatus::Failed {
                    reason: e.to_string(),
                };
            }
        }
        screen
    }

    fn status_line(&self) -> Line<'static> {
        match &self.status {
            SubmissionStatus::Recorded { .. } => Line::from(Span::styled(
                "Score recorded",
                Style::default().fg(Color::Green),
            )),
            SubmissionStatus::Failed { .. } | SubmissionStatus::NotAttempted => {
                Line::from(Span::styled(
                    "Offline - score not recorded",
                    Style::default().fg(Color::DarkGray),
                ))
            }
        }
    }

    fn kill_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            format!("Total kills: {}", self.zombies_killed.total()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))];
        lines.extend(self.zombies_killed.entries().map(|(kind, count)| {
            Line::from(vec![
                Span::styled(format!("{}: ", kind), Style::default().fg(Color::White)),
                Span::raw(format!("x{} ", count)),
                Span::styled(
                    format!("(+{})", count * kind.score_value()),
                    Style::default().fg(Color::Green),
                ),
            ])
        }));
        lines
    }

    fn button(&self, action: ReportAction, label: &'static str) -> Span<'static> {
        if self.selected == action {
            Span::styled(
                format!("[ {} ]", label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!("  {}  ", label))
        }
    }
}

impl Screen for ReportScreen {
    #[instrument(skip(self, frame, _info))]
    fn render(&self, frame: &mut Frame, _info: &GameInfo) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let title_text = match self.outcome {
            Some(outcome) => format!("Game Report - {}", outcome),
            None => "Game Report".to_string(),
        };
        let title = Paragraph::new(title_text)
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, rows[0]);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let score_card = Paragraph::new(vec![
            Line::from("Final score"),
            Line::from(Span::styled(
                self.score.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Duration"),
            Line::from(format_duration(self.game_duration_ms)),
        ])
        .block(Block::default().borders(Borders::ALL).title("Score"));
        frame.render_widget(score_card, cards[0]);

        let kill_card = Paragraph::new(self.kill_lines())
            .block(Block::default().borders(Borders::ALL).title("Zombies Defeated"));
        frame.render_widget(kill_card, cards[1]);

        let status = Paragraph::new(self.status_line()).alignment(Alignment::Center);
        frame.render_widget(status, rows[2]);

        let buttons = Paragraph::new(Line::from(vec![
            self.button(ReportAction::PlayAgain, "Play Again"),
            Span::raw("    "),
            self.button(ReportAction::Exit, "Exit"),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("r: Play Again | m: Menu | q: Exit"),
        );
        frame.render_widget(buttons, rows[3]);
    }

    #[instrument(skip(self, key, _info))]
    fn handle_key(&mut self, key: KeyEvent, _info: &mut GameInfo) -> ScreenTransition {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.selected = match self.selected {
                    ReportAction::PlayAgain => ReportAction::Exit,
                    ReportAction::Exit => ReportAction::PlayAgain,
                };
                ScreenTransition::Stay
            }
            KeyCode::Enter => match self.selected {
                ReportAction::PlayAgain => ScreenTransition::GoToLevel,
                ReportAction::Exit => ScreenTransition::Quit,
            },
            KeyCode::Char('r') | KeyCode::Char('R') => ScreenTransition::GoToLevel,
            KeyCode::Char('m') | KeyCode::Char('M') => ScreenTransition::GoToMenu,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ScreenTransition::Quit,
            _ => ScreenTransition::Stay,
        }
    }
}

//! Main menu: player identity, online toggle and start.

use crossterm::event::{KeyCode, KeyEvent};
use derive_getters::Getters;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{debug, info, instrument};

use crate::screens::screen::{Screen, ScreenTransition};
use crate::{GameInfo, GameSettings, PlayerIdentity};

/// Which menu control has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuField {
    /// Player name input.
    Name,
    /// Employee id input.
    EmployeeId,
    /// Online/offline toggle.
    Online,
    /// Start button.
    Start,
}

impl MenuField {
    const ORDER: [Self; 4] = [Self::Name, Self::EmployeeId, Self::Online, Self::Start];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// State for the main menu.
#[derive(Debug, Getters)]
pub struct MenuScreen {
    name_input: String,
    employee_id_input: String,
    online: bool,
    server_available: bool,
    focus: MenuField,
    error_message: Option<String>,
}

impl MenuScreen {
    /// Creates the menu, prefilled from the current player or the settings.
    #[instrument(skip(settings, info))]
    pub fn new(settings: &GameSettings, server_available: bool, info: &GameInfo) -> Self {
        let (name_input, employee_id_input, online) = match info.player() {
            Some(player) => (
                player.name().clone(),
                player.employee_id().clone(),
                !info.is_offline(),
            ),
            None => (
                settings.player_name().clone(),
                settings.employee_id().clone(),
                true,
            ),
        };
        debug!(server_available, "Initializing MenuScreen");
        Self {
            name_input,
            employee_id_input,
            online: online && server_available,
            server_available,
            focus: MenuField::Name,
            error_message: None,
        }
    }

    fn toggle_online(&mut self) {
        if !self.server_available {
            self.error_message = Some("No leaderboard server configured".to_string());
            return;
        }
        self.online = !self.online;
        self.error_message = None;
        debug!(online = self.online, "Online mode toggled");
    }

    /// Validates the inputs and stores the player in `info`.
    #[instrument(skip(self, info))]
    fn start(&mut self, info: &mut GameInfo) -> ScreenTransition {
        let name = self.name_input.trim();
        let employee_id = self.employee_id_input.trim();
        if name.is_empty() {
            self.error_message = Some("Enter a player name".to_string());
            self.focus = MenuField::Name;
            return ScreenTransition::Stay;
        }
        if self.online && employee_id.is_empty() {
            self.error_message = Some("Online play needs an employee id".to_string());
            self.focus = MenuField::EmployeeId;
            return ScreenTransition::Stay;
        }

        info!(name = %name, online = self.online, "Starting game");
        info.set_player(
            PlayerIdentity::new(name.to_string(), employee_id.to_string()),
            !self.online,
        );
        self.error_message = None;
        ScreenTransition::GoToLevel
    }

    fn input_for_focus(&mut self) -> Option<&mut String> {
        match self.focus {
            MenuField::Name => Some(&mut self.name_input),
            MenuField::EmployeeId => Some(&mut self.employee_id_input),
            MenuField::Online | MenuField::Start => None,
        }
    }

    fn field_style(&self, field: MenuField) -> Style {
        if self.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    }
}

impl Screen for MenuScreen {
    #[instrument(skip(self, frame, _info))]
    fn render(&self, frame: &mut Frame, _info: &GameInfo) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let title = Paragraph::new("Lawn Defense")
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let name = Paragraph::new(self.name_input.as_str())
            .style(self.field_style(MenuField::Name))
            .block(Block::default().borders(Borders::ALL).title("Player Name"));
        frame.render_widget(name, chunks[1]);

        let employee = Paragraph::new(self.employee_id_input.as_str())
            .style(self.field_style(MenuField::EmployeeId))
            .block(Block::default().borders(Borders::ALL).title("Employee ID"));
        frame.render_widget(employee, chunks[2]);

        let mode = if self.online {
            "[x] Online - submit scores to the leaderboard"
        } else {
            "[ ] Offline - scores stay on this machine"
        };
        let online = Paragraph::new(mode)
            .style(self.field_style(MenuField::Online))
            .block(Block::default().borders(Borders::ALL).title("Mode"));
        frame.render_widget(online, chunks[3]);

        let start = Paragraph::new("> Start Game <")
            .style(self.field_style(MenuField::Start))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(start, chunks[4]);

        let error = Paragraph::new(self.error_message.as_deref().unwrap_or(""))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error, chunks[5]);

        let help = Paragraph::new("Tab/↑↓: Move | Space: Toggle | Enter: Start | Esc: Quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[7]);
    }

    #[instrument(skip(self, key, info))]
    fn handle_key(&mut self, key: KeyEvent, info: &mut GameInfo) -> ScreenTransition {
        match key.code {
            KeyCode::Esc => ScreenTransition::Quit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                ScreenTransition::Stay
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.previous();
                ScreenTransition::Stay
            }
            KeyCode::Enter => match self.focus {
                MenuField::Online => {
                    self.toggle_online();
                    ScreenTransition::Stay
                }
                _ => self.start(info),
            },
            KeyCode::Char(' ') if self.focus == MenuField::Online => {
                self.toggle_online();
                ScreenTransition::Stay
            }
            KeyCode::Char(' ') if self.focus == MenuField::Start => self.start(info),
            KeyCode::Char(c) => {
                if let Some(input) = self.input_for_focus() {
                    input.push(c);
                }
                ScreenTransition::Stay
            }
            KeyCode::Backspace => {
                if let Some(input) = self.input_for_focus() {
                    input.pop();
                }
                ScreenTransition::Stay
            }
            _ => ScreenTransition::Stay,
        }
    }
}

//! Game controller: the state machine driving menu, level and report.

use std::sync::Arc;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use derive_getters::Getters;
use ratatui::{Frame, Terminal, backend::Backend};
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::screens::screen::{Screen, ScreenTransition};
use crate::screens::{LevelScreen, MenuScreen, ReportScreen};
use crate::{GameInfo, GameSettings, LeaderboardApi, LevelConfig};

/// Simulation tick used by [`GameController::run`].
const FRAME: Duration = Duration::from_millis(33);

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ScreenId {
    /// Main menu.
    Menu,
    /// A level in progress.
    Level,
    /// End-of-game report.
    Report,
}

/// Active screen in the state machine.
#[derive(Debug)]
enum ActiveScreen {
    Menu(MenuScreen),
    Level(Box<LevelScreen>),
    Report(ReportScreen),
}

/// Controller that owns the [`GameInfo`] record and applies transitions.
///
/// It never touches the terminal directly except in [`GameController::run`],
/// so the flow can be driven key by key in tests.
#[derive(Debug, Getters)]
pub struct GameController {
    settings: GameSettings,
    level_config: LevelConfig,
    #[getter(skip)]
    api: Option<Arc<dyn LeaderboardApi>>,
    info: GameInfo,
    #[getter(skip)]
    screen: ActiveScreen,
    #[getter(skip)]
    running: bool,
}

impl GameController {
    /// Creates a controller showing the main menu.
    ///
    /// Without an `api` the game is offline only.
    #[instrument(skip(settings, level_config, api))]
    pub fn new(
        settings: GameSettings,
        level_config: LevelConfig,
        api: Option<Arc<dyn LeaderboardApi>>,
    ) -> Self {
        info!(online_capable = api.is_some(), "Creating GameController");
        let info = GameInfo::new();
        let screen = ActiveScreen::Menu(MenuScreen::new(&settings, api.is_some(), &info));
        Self {
            settings,
            level_config,
            api,
            info,
            screen,
            running: true,
        }
    }

    /// The screen currently showing.
    pub fn screen_id(&self) -> ScreenId {
        match &self.screen {
            ActiveScreen::Menu(_) => ScreenId::Menu,
            ActiveScreen::Level(_) => ScreenId::Level,
            ActiveScreen::Report(_) => ScreenId::Report,
        }
    }

    /// The report screen, when showing.
    pub fn report(&self) -> Option<&ReportScreen> {
        match &self.screen {
            ActiveScreen::Report(s) => Some(s),
            _ => None,
        }
    }

    /// The level screen, when showing.
    pub fn level(&self) -> Option<&LevelScreen> {
        match &self.screen {
            ActiveScreen::Level(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Whether the player has not quit yet.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Renders the current screen.
    pub fn render(&self, frame: &mut Frame) {
        match &self.screen {
            ActiveScreen::Menu(s) => s.render(frame, &self.info),
            ActiveScreen::Level(s) => s.render(frame, &self.info),
            ActiveScreen::Report(s) => s.render(frame, &self.info),
        }
    }

    /// Feeds one key press to the current screen.
    #[instrument(skip(self, key), fields(screen = %self.screen_id()))]
    pub async fn handle_key(&mut self, key: KeyEvent) {
        // Crossterm reports both press and release on some platforms.
        if key.kind == KeyEventKind::Release {
            return;
        }
        let transition = match &mut self.screen {
            ActiveScreen::Menu(s) => s.handle_key(key, &mut self.info),
            ActiveScreen::Level(s) => s.handle_key(key, &mut self.info),
            ActiveScreen::Report(s) => s.handle_key(key, &mut self.info),
        };
        self.apply_transition(transition).await;
    }

    /// Advances time on the current screen.
    pub async fn tick(&mut self, elapsed_ms: u64) {
        let transition = match &mut self.screen {
            ActiveScreen::Menu(s) => s.update(elapsed_ms, &mut self.info),
            ActiveScreen::Level(s) => s.update(elapsed_ms, &mut self.info),
            ActiveScreen::Report(s) => s.update(elapsed_ms, &mut self.info),
        };
        self.apply_transition(transition).await;
    }

    /// Applies a transition, building the next screen from [`GameInfo`].
    #[instrument(skip(self))]
    async fn apply_transition(&mut self, transition: ScreenTransition) {
        if transition != ScreenTransition::Stay {
            debug!(from = %self.screen_id(), ?transition, "Applying screen transition");
        }
        match transition {
            ScreenTransition::Stay => {}
            ScreenTransition::GoToMenu => {
                info!("Navigating to Menu");
                self.screen = ActiveScreen::Menu(MenuScreen::new(
                    &self.settings,
                    self.api.is_some(),
                    &self.info,
                ));
            }
            ScreenTransition::GoToLevel => {
                if self.screen_id() == ScreenId::Menu {
                    self.register_player().await;
                }
                info!(offline = self.info.is_offline(), "Navigating to Level");
                self.info.reset_results();
                self.screen =
                    ActiveScreen::Level(Box::new(LevelScreen::new(self.level_config.clone())));
            }
            ScreenTransition::GoToReport => {
                info!(score = self.info.final_score(), "Navigating to Report");
                let report = ReportScreen::startup(&self.info, self.api.as_deref()).await;
                self.screen = ActiveScreen::Report(report);
            }
            ScreenTransition::Quit => {
                info!("Quitting");
                self.running = false;
            }
        }
    }

    /// Registers the menu's player with the server when playing online.
    ///
    /// Any failure downgrades the session to offline; the game starts anyway.
    async fn register_player(&mut self) {
        if *self.info.is_offline() {
            return;
        }
        let Some(player) = self.info.player().clone() else {
            self.info.go_offline();
            return;
        };
        let Some(api) = self.api.clone() else {
            self.info.go_offline();
            return;
        };

        match api
            .register_player(player.name(), player.employee_id())
            .await
        {
            Ok(registered) => {
                info!(player_id = registered.id, "Player registered");
                self.info.set_player(player.registered(registered.id), false);
            }
            Err(e) => {
                warn!(error = %e, "Registration failed, playing offline");
                self.info.go_offline();
            }
        }
    }

    /// Runs the event loop until the player quits.
    ///
    /// Polls input without blocking and advances the level by real elapsed
    /// time on every frame.
    #[instrument(skip(self, terminal))]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        info!("Starting game loop");
        let mut last_tick = Instant::now();

        while self.running {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(0))?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key(key).await;
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last_tick).as_millis() as u64;
            last_tick = now;
            self.tick(elapsed).await;

            sleep(FRAME).await;
        }

        info!("Game loop finished");
        Ok(())
    }
}

//! Menu -> level -> report flows driven through the controller.

mod common;

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use common::{RecordingApi, render_to_string};
use lawn_defense::{
    GameController, GameSettings, LeaderboardApi, LevelConfig, LevelOutcome, ScreenId, Spawn,
    SubmissionStatus, Wave, ZombieKind,
};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// One zombie that the row's mower removes, so the level clears after ~41 s.
fn quick_level() -> LevelConfig {
    LevelConfig::new(
        "Quick".to_string(),
        50,
        0,
        vec![Wave {
            at_seconds: 0,
            spawns: vec![Spawn {
                kind: ZombieKind::Normal,
                row: 2,
            }],
        }],
    )
    .expect("Valid level")
}

fn settings() -> GameSettings {
    GameSettings::default()
        .with_server_url(Some("http://leaderboard.test".to_string()))
        .with_player("Ann".to_string(), "E001".to_string())
}

fn online_controller(api: &Arc<RecordingApi>) -> GameController {
    let api = Arc::clone(api) as Arc<dyn LeaderboardApi>;
    GameController::new(settings(), quick_level(), Some(api))
}

#[tokio::test]
async fn test_online_game_registers_and_submits() {
    let api = Arc::new(RecordingApi::default());
    let mut controller = online_controller(&api);
    assert_eq!(controller.screen_id(), ScreenId::Menu);

    controller.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(controller.screen_id(), ScreenId::Level);
    assert_eq!(
        api.registrations(),
        vec![("Ann".to_string(), "E001".to_string())]
    );
    let player = controller.info().player().clone().expect("Player set");
    assert_eq!(*player.player_id(), Some(42));
    assert!(!*controller.info().is_offline());

    controller.tick(60_000).await;
    assert_eq!(controller.screen_id(), ScreenId::Report);
    assert_eq!(*controller.info().outcome(), Some(LevelOutcome::Cleared));
    assert_eq!(*controller.info().final_score(), 10);

    let report = controller.report().expect("Report showing");
    assert_eq!(
        *report.status(),
        SubmissionStatus::Recorded { game_record_id: 1 }
    );
    let sent = api.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].player_id, 42);
    assert_eq!(sent[0].score, 10);
    assert_eq!(sent[0].zombies_killed.get("normal"), Some(&1));
}

#[tokio::test]
async fn test_registration_failure_plays_offline() {
    let api = Arc::new(RecordingApi::failing_registrations());
    let mut controller = online_controller(&api);

    controller.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(controller.screen_id(), ScreenId::Level);
    assert!(*controller.info().is_offline());

    controller.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(controller.screen_id(), ScreenId::Report);
    assert_eq!(
        *controller.info().outcome(),
        Some(LevelOutcome::Surrendered)
    );
    let report = controller.report().expect("Report showing");
    assert_eq!(*report.status(), SubmissionStatus::NotAttempted);
    assert!(api.submissions().is_empty());
}

#[tokio::test]
async fn test_failed_submission_keeps_local_report() {
    let api = Arc::new(RecordingApi::failing_submissions());
    let mut controller = online_controller(&api);

    controller.handle_key(key(KeyCode::Enter)).await;
    controller.tick(60_000).await;

    let report = controller.report().expect("Report showing");
    assert!(matches!(report.status(), SubmissionStatus::Failed { .. }));
    assert_eq!(*report.score(), 10);

    let screen = render_to_string(|f| controller.render(f));
    assert!(screen.contains("Lawn defended"));
    assert!(screen.contains("Offline - score not recorded"));
}

#[tokio::test]
async fn test_menu_requires_a_name() {
    let settings = GameSettings::default();
    let mut controller = GameController::new(settings, quick_level(), None);

    controller.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(controller.screen_id(), ScreenId::Menu);

    for c in "Bo".chars() {
        controller.handle_key(key(KeyCode::Char(c))).await;
    }
    controller.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(controller.screen_id(), ScreenId::Level);
    assert!(*controller.info().is_offline());
    let player = controller.info().player().clone().expect("Player set");
    assert_eq!(player.name(), "Bo");
}

#[tokio::test]
async fn test_offline_toggle_skips_registration() {
    let api = Arc::new(RecordingApi::default());
    let mut controller = online_controller(&api);

    // Name -> Employee ID -> Online
    controller.handle_key(key(KeyCode::Tab)).await;
    controller.handle_key(key(KeyCode::Tab)).await;
    controller.handle_key(key(KeyCode::Char(' '))).await;
    controller.handle_key(key(KeyCode::Tab)).await;
    controller.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(controller.screen_id(), ScreenId::Level);
    assert!(*controller.info().is_offline());
    assert!(api.registrations().is_empty());
}

#[tokio::test]
async fn test_report_navigation() {
    let api = Arc::new(RecordingApi::default());
    let mut controller = online_controller(&api);
    controller.handle_key(key(KeyCode::Enter)).await;
    controller.handle_key(key(KeyCode::Char('q'))).await;
    assert_eq!(controller.screen_id(), ScreenId::Report);

    // Play again: fresh level, same registration, previous results cleared.
    controller.handle_key(key(KeyCode::Char('r'))).await;
    assert_eq!(controller.screen_id(), ScreenId::Level);
    assert_eq!(api.registrations().len(), 1);
    assert_eq!(*controller.info().outcome(), None);
    let level = controller.level().expect("Level showing");
    assert_eq!(*level.level().elapsed_ms(), 0);

    controller.handle_key(key(KeyCode::Esc)).await;
    controller.handle_key(key(KeyCode::Char('m'))).await;
    assert_eq!(controller.screen_id(), ScreenId::Menu);

    let screen = render_to_string(|f| controller.render(f));
    assert!(screen.contains("Ann"));

    controller.handle_key(key(KeyCode::Esc)).await;
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_key_release_is_ignored() {
    let mut controller = GameController::new(settings(), quick_level(), None);
    let release = KeyEvent {
        code: KeyCode::Esc,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    };
    controller.handle_key(release).await;
    assert!(controller.is_running());
}

#[tokio::test]
async fn test_planting_through_level_keys() {
    let mut controller = GameController::new(settings(), quick_level(), None);
    controller.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(controller.screen_id(), ScreenId::Level);

    controller.handle_key(key(KeyCode::Char('1'))).await;
    controller.handle_key(key(KeyCode::Enter)).await;

    let level = controller.level().expect("Level showing");
    let (row, col) = *level.cursor();
    assert!(level.level().plant_at(row, col).is_some());
    assert_eq!(*level.level().sun(), 0);
}

//! Tests for the end-of-game report.

mod common;

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use common::{RecordingApi, render_to_string};
use lawn_defense::{
    GameInfo, KillTally, LeaderboardClient, PlayerIdentity, ReportAction, ReportScreen, Screen,
    ScreenTransition, SubmissionStatus, ZombieKind, format_duration,
};

fn registered_player() -> Option<PlayerIdentity> {
    Some(PlayerIdentity::new("Ann".to_string(), "E001".to_string()).registered(42))
}

fn online_info(score: u32, duration_ms: u64, kills: KillTally) -> GameInfo {
    GameInfo::with_results(registered_player(), false, score, duration_ms, kills)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn sample_kills() -> KillTally {
    [
        (ZombieKind::Normal, 4),
        (ZombieKind::Conehead, 2),
        (ZombieKind::Buckethead, 1),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "00:00");
    assert_eq!(format_duration(999), "00:00");
    assert_eq!(format_duration(61_500), "01:01");
    assert_eq!(format_duration(3_599_000), "59:59");
}

#[tokio::test]
async fn test_successful_submission_is_recorded() {
    let api = RecordingApi::default();
    let info = online_info(110, 95_000, sample_kills());

    let report = ReportScreen::startup(&info, Some(&api)).await;

    assert_eq!(
        *report.status(),
        SubmissionStatus::Recorded { game_record_id: 1 }
    );
    assert!(!*report.is_offline());
    let sent = api.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].player_id, 42);
    assert_eq!(sent[0].score, 110);
    assert_eq!(sent[0].game_duration, 95_000);
    assert_eq!(sent[0].zombies_killed.get("conehead"), Some(&2));

    let screen = render_to_string(|f| report.render(f, &info));
    assert!(screen.contains("Score recorded"));
}

#[tokio::test]
async fn test_failed_submission_still_shows_score() {
    let api = RecordingApi::failing_submissions();
    let info = online_info(110, 95_000, sample_kills());

    let report = ReportScreen::startup(&info, Some(&api)).await;

    assert!(*report.is_offline());
    assert!(matches!(report.status(), SubmissionStatus::Failed { .. }));
    assert_eq!(*report.score(), 110);
    assert_eq!(api.submissions().len(), 1, "exactly one attempt");

    let screen = render_to_string(|f| report.render(f, &info));
    assert!(screen.contains("110"));
    assert!(screen.contains("01:35"));
    assert!(screen.contains("Offline - score not recorded"));
}

#[tokio::test]
async fn test_unreachable_server_falls_back_to_offline() {
    let client = LeaderboardClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
        .expect("Client");
    let info = online_info(30, 20_000, [(ZombieKind::Normal, 3)].into_iter().collect());

    let report = ReportScreen::startup(&info, Some(&client)).await;

    assert!(*report.is_offline());
    assert!(matches!(report.status(), SubmissionStatus::Failed { .. }));
    let screen = render_to_string(|f| report.render(f, &info));
    assert!(screen.contains("30"));
    assert!(screen.contains("Total kills: 3"));
}

#[tokio::test]
async fn test_offline_session_never_submits() {
    let api = RecordingApi::default();
    let info = GameInfo::with_results(registered_player(), true, 50, 10_000, sample_kills());

    let report = ReportScreen::startup(&info, Some(&api)).await;

    assert_eq!(*report.status(), SubmissionStatus::NotAttempted);
    assert!(api.submissions().is_empty());
}

#[tokio::test]
async fn test_kill_breakdown_matches_tally() {
    let info = GameInfo::with_results(None, true, 100, 30_000, sample_kills());
    let report = ReportScreen::startup(&info, None).await;

    let screen = render_to_string(|f| report.render(f, &info));
    assert!(screen.contains("Total kills: 7"));
    assert!(screen.contains("Zombie: x4 (+40)"));
    assert!(screen.contains("Conehead Zombie: x2 (+40)"));
    assert!(screen.contains("Buckethead Zombie: x1 (+30)"));
    assert!(!screen.contains("Flag Zombie"));
}

#[tokio::test]
async fn test_zero_kills_renders_empty_breakdown() {
    let info = GameInfo::with_results(None, true, 0, 5_000, KillTally::new());
    let report = ReportScreen::startup(&info, None).await;

    let screen = render_to_string(|f| report.render(f, &info));
    assert!(screen.contains("Total kills: 0"));
    assert!(!screen.contains("(+"));
    assert!(screen.contains("00:05"));
}

#[tokio::test]
async fn test_report_keys() {
    let info = GameInfo::new();
    let mut report = ReportScreen::startup(&info, None).await;
    let mut info = info;

    assert_eq!(*report.selected(), ReportAction::PlayAgain);
    assert_eq!(
        report.handle_key(key(KeyCode::Enter), &mut info),
        ScreenTransition::GoToLevel
    );

    report.handle_key(key(KeyCode::Right), &mut info);
    assert_eq!(*report.selected(), ReportAction::Exit);
    assert_eq!(
        report.handle_key(key(KeyCode::Enter), &mut info),
        ScreenTransition::Quit
    );

    assert_eq!(
        report.handle_key(key(KeyCode::Char('m')), &mut info),
        ScreenTransition::GoToMenu
    );
    assert_eq!(
        report.handle_key(key(KeyCode::Char('r')), &mut info),
        ScreenTransition::GoToLevel
    );
    assert_eq!(
        report.handle_key(key(KeyCode::Esc), &mut info),
        ScreenTransition::Quit
    );
}

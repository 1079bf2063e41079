//! Shared helpers for the screen tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use ratatui::{Terminal, backend::TestBackend};

use lawn_defense::{
    ClientError, LeaderboardApi, PlayerResponse, SubmitScoreRequest, SubmitScoreResponse,
};

/// In-memory leaderboard that records every call.
#[derive(Debug, Default)]
pub struct RecordingApi {
    pub fail_registration: bool,
    pub fail_submission: bool,
    pub registrations: Mutex<Vec<(String, String)>>,
    pub submissions: Mutex<Vec<SubmitScoreRequest>>,
}

impl RecordingApi {
    pub fn failing_submissions() -> Self {
        Self {
            fail_submission: true,
            ..Self::default()
        }
    }

    pub fn failing_registrations() -> Self {
        Self {
            fail_registration: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<SubmitScoreRequest> {
        self.submissions.lock().expect("Lock poisoned").clone()
    }

    pub fn registrations(&self) -> Vec<(String, String)> {
        self.registrations.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl LeaderboardApi for RecordingApi {
    async fn register_player(
        &self,
        name: &str,
        employee_id: &str,
    ) -> Result<PlayerResponse, ClientError> {
        self.registrations
            .lock()
            .expect("Lock poisoned")
            .push((name.to_string(), employee_id.to_string()));
        if self.fail_registration {
            return Err(ClientError::Rejected {
                status: 500,
                message: "database is locked".to_string(),
            });
        }
        Ok(PlayerResponse {
            id: 42,
            name: name.to_string(),
            employee_id: employee_id.to_string(),
            created_at: chrono::Local::now().naive_local(),
        })
    }

    async fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, ClientError> {
        let mut submissions = self.submissions.lock().expect("Lock poisoned");
        submissions.push(request.clone());
        if self.fail_submission {
            return Err(ClientError::Rejected {
                status: 503,
                message: "leaderboard unavailable".to_string(),
            });
        }
        Ok(SubmitScoreResponse {
            success: true,
            game_record_id: i32::try_from(submissions.len()).expect("Small count"),
        })
    }
}

/// Renders with `draw` into an 80x24 test terminal and returns the screen text.
pub fn render_to_string(draw: impl FnOnce(&mut ratatui::Frame)) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("Test terminal");
    terminal.draw(draw).expect("Draw failed");
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

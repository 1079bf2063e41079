//! HTTP-level tests for the leaderboard API.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use lawn_defense::{
    ErrorResponse, GameHistoryResponse, LeaderboardRepository, LeaderboardResponse,
    LeaderboardService, PlayerProfileResponse, PlayerResponse, SubmitScoreResponse, build_router,
};

fn setup_router() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = LeaderboardRepository::new(db_path);
    repo.run_migrations().expect("Migrations failed");
    (db_file, build_router(LeaderboardService::new(repo)))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Body failed")
        .to_bytes()
        .to_vec();
    (status, body)
}

async fn get_json<T: DeserializeOwned>(router: &Router, uri: &str) -> (StatusCode, T) {
    let request = Request::get(uri).body(Body::empty()).expect("Bad request");
    let (status, body) = send(router, request).await;
    let parsed = serde_json::from_slice(&body).expect("Invalid JSON body");
    (status, parsed)
}

async fn post_json<T: DeserializeOwned>(router: &Router, uri: &str, body: Value) -> (StatusCode, T) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Bad request");
    let (status, body) = send(router, request).await;
    let parsed = serde_json::from_slice(&body).expect("Invalid JSON body");
    (status, parsed)
}

async fn register(router: &Router, name: &str, employee_id: &str) -> PlayerResponse {
    let (status, player) = post_json(
        router,
        "/api/players",
        json!({ "name": name, "employee_id": employee_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    player
}

async fn submit(router: &Router, player_id: i32, score: i32, duration: i32) -> i32 {
    let (status, reply): (_, SubmitScoreResponse) = post_json(
        router,
        "/api/scores",
        json!({
            "player_id": player_id,
            "score": score,
            "game_duration": duration,
            "zombies_killed": { "normal": 2, "conehead": 1 },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply.success);
    reply.game_record_id
}

#[tokio::test]
async fn test_health() {
    let (_db, router) = setup_router();
    let (status, body): (_, Value) = get_json(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body.get("timestamp").is_some());
}

#[tokio::test]
async fn test_index_serves_leaderboard_page() {
    let (_db, router) = setup_router();
    let request = Request::get("/").body(Body::empty()).expect("Bad request");
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).expect("Page is UTF-8");
    assert!(page.contains("/api/leaderboard"));
}

#[tokio::test]
async fn test_register_is_idempotent_and_renames() {
    let (_db, router) = setup_router();
    let first = register(&router, "Ann", "E001").await;
    let again = register(&router, "Ann", "E001").await;
    assert_eq!(first, again);

    let renamed = register(&router, "Ann Lee", "E001").await;
    assert_eq!(renamed.id, first.id);
    assert_eq!(renamed.name, "Ann Lee");
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let (_db, router) = setup_router();
    let (status, body): (_, ErrorResponse) =
        post_json(&router, "/api/players", json!({ "name": "", "employee_id": "E1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.success);

    let (status, body): (_, ErrorResponse) =
        post_json(&router, "/api/players", json!({ "name": "Ann" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (_db, router) = setup_router();
    let request = Request::post("/api/scores")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("Bad request");
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).expect("Error body");
    assert!(!error.success);
}

#[tokio::test]
async fn test_submit_score_for_unknown_player_is_not_found() {
    let (_db, router) = setup_router();
    let (status, body): (_, ErrorResponse) = post_json(
        &router,
        "/api/scores",
        json!({ "player_id": 404, "score": 10, "game_duration": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.success);
}

#[tokio::test]
async fn test_submit_negative_score_is_bad_request() {
    let (_db, router) = setup_router();
    let player = register(&router, "Bo", "E002").await;
    let (status, _): (_, ErrorResponse) = post_json(
        &router,
        "/api/scores",
        json!({ "player_id": player.id, "score": -5, "game_duration": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_ranks_best_game_per_player() {
    let (_db, router) = setup_router();
    let ann = register(&router, "Ann", "E001").await;
    let bo = register(&router, "Bo", "E002").await;

    submit(&router, ann.id, 40, 50_000).await;
    submit(&router, ann.id, 90, 70_000).await;
    submit(&router, bo.id, 60, 30_000).await;

    let (status, board): (_, LeaderboardResponse) = get_json(&router, "/api/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board.leaderboard.len(), 2);
    assert_eq!(board.leaderboard[0].rank, 1);
    assert_eq!(board.leaderboard[0].name, "Ann");
    assert_eq!(board.leaderboard[0].score, 90);
    assert_eq!(board.leaderboard[1].rank, 2);
    assert_eq!(board.leaderboard[1].player_id, bo.id);

    let (_, top): (_, LeaderboardResponse) = get_json(&router, "/api/leaderboard?limit=1").await;
    assert_eq!(top.leaderboard.len(), 1);

    let (_, clamped): (_, LeaderboardResponse) =
        get_json(&router, "/api/leaderboard?limit=0").await;
    assert_eq!(clamped.leaderboard.len(), 1);
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let (_db, router) = setup_router();
    let (status, _): (_, ErrorResponse) =
        get_json(&router, "/api/leaderboard?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_player_profile_and_history() {
    let (_db, router) = setup_router();
    let player = register(&router, "Cy", "E003").await;
    let first = submit(&router, player.id, 20, 10_000).await;
    let second = submit(&router, player.id, 50, 20_000).await;

    let (status, profile): (_, PlayerProfileResponse) =
        get_json(&router, &format!("/api/players/{}", player.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile.player, player);
    assert_eq!(profile.stats.games_played, 2);
    assert_eq!(profile.stats.best_score, 50);
    assert_eq!(profile.stats.total_kills, 6);

    let (status, history): (_, GameHistoryResponse) =
        get_json(&router, &format!("/api/players/{}/history", player.id)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i32> = history.games.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(history.games[0].zombies_killed.get("normal"), Some(&2));

    let (_, limited): (_, GameHistoryResponse) =
        get_json(&router, &format!("/api/players/{}/history?limit=1", player.id)).await;
    assert_eq!(limited.games.len(), 1);
}

#[tokio::test]
async fn test_unknown_player_profile_is_not_found() {
    let (_db, router) = setup_router();
    let (status, body): (_, ErrorResponse) = get_json(&router, "/api/players/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.success);
}

#[tokio::test]
async fn test_non_numeric_player_id_is_json_bad_request() {
    let (_db, router) = setup_router();

    for uri in ["/api/players/abc", "/api/players/abc/history"] {
        let (status, body): (_, ErrorResponse) = get_json(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(!body.success);
        assert!(!body.error.is_empty());
    }
}

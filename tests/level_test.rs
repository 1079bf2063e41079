//! Tests for the lawn simulation and level configuration.

use lawn_defense::{
    GameInfo, KillTally, Level, LevelConfig, LevelError, LevelOutcome, PlantKind, PlayerIdentity,
    Spawn, Wave, ZombieKind,
};

fn wave(at_seconds: u32, spawns: &[(ZombieKind, usize)]) -> Wave {
    Wave {
        at_seconds,
        spawns: spawns
            .iter()
            .map(|&(kind, row)| Spawn { kind, row })
            .collect(),
    }
}

/// Level without sky sun so sun totals are predictable.
fn level(initial_sun: u32, waves: Vec<Wave>) -> Level {
    let config = LevelConfig::new("Test Lawn".to_string(), initial_sun, 0, waves)
        .expect("Valid level");
    Level::new(config)
}

#[test]
fn test_planting_spends_sun() {
    let mut level = level(150, vec![wave(600, &[(ZombieKind::Normal, 0)])]);

    level
        .place_plant(PlantKind::Peashooter, 2, 0)
        .expect("Affordable");
    assert_eq!(*level.sun(), 50);
    assert_eq!(
        level.plant_at(2, 0).map(|p| *p.kind()),
        Some(PlantKind::Peashooter)
    );

    let err = level
        .place_plant(PlantKind::Peashooter, 3, 0)
        .expect_err("Too expensive");
    assert_eq!(
        err,
        LevelError::NotEnoughSun {
            needed: 100,
            available: 50
        }
    );
    assert_eq!(*level.sun(), 50, "a failed planting costs nothing");
}

#[test]
fn test_planting_rejects_bad_cells_and_recharging_packets() {
    let mut level = level(1000, vec![wave(600, &[(ZombieKind::Normal, 0)])]);

    assert_eq!(
        level.place_plant(PlantKind::WallNut, 5, 0),
        Err(LevelError::OutOfBounds { row: 5, col: 0 })
    );

    level
        .place_plant(PlantKind::WallNut, 1, 1)
        .expect("First wall-nut");
    assert!(matches!(
        level.place_plant(PlantKind::Sunflower, 1, 1),
        Err(LevelError::Occupied { row: 1, col: 1 })
    ));
    assert!(matches!(
        level.place_plant(PlantKind::WallNut, 2, 1),
        Err(LevelError::Recharging {
            kind: PlantKind::WallNut,
            ..
        })
    ));
    assert!(level.recharge_remaining(PlantKind::WallNut) > 0);
    assert_eq!(level.recharge_remaining(PlantKind::Sunflower), 0);
}

#[test]
fn test_dig_up_frees_cell() {
    let mut level = level(1000, vec![wave(600, &[(ZombieKind::Normal, 0)])]);
    level
        .place_plant(PlantKind::Sunflower, 0, 0)
        .expect("Planted");
    assert!(level.dig_up(0, 0));
    assert!(level.plant_at(0, 0).is_none());
    assert!(!level.dig_up(0, 0));
}

#[test]
fn test_sunflower_and_sky_produce_sun() {
    let mut sunny = level(50, vec![wave(600, &[(ZombieKind::Normal, 0)])]);
    sunny
        .place_plant(PlantKind::Sunflower, 0, 0)
        .expect("Planted");
    assert_eq!(*sunny.sun(), 0);
    sunny.update(7_000);
    assert_eq!(*sunny.sun(), 25);

    let config = LevelConfig::new(
        "Sky".to_string(),
        0,
        10,
        vec![wave(600, &[(ZombieKind::Normal, 0)])],
    )
    .expect("Valid level");
    let mut sky = Level::new(config);
    sky.update(10_000);
    assert_eq!(*sky.sun(), 25);
}

#[test]
fn test_peashooter_defends_row_and_clears_level() {
    let mut level = level(1000, vec![wave(0, &[(ZombieKind::Normal, 0)])]);
    level
        .place_plant(PlantKind::Peashooter, 0, 0)
        .expect("Planted");

    level.update(30_000);

    assert_eq!(*level.outcome(), Some(LevelOutcome::Cleared));
    assert_eq!(level.kills().count(ZombieKind::Normal), 1);
    assert_eq!(level.score(), 10);
    assert!(level.mower_ready(0), "the mower was never needed");
    assert!(*level.elapsed_ms() < 30_000, "simulation stops at the outcome");
}

#[test]
fn test_mower_clears_row_once_then_zombies_win() {
    let mut level = level(
        0,
        vec![
            wave(0, &[(ZombieKind::Normal, 2)]),
            wave(100, &[(ZombieKind::Conehead, 2)]),
        ],
    );

    level.update(45_000);
    assert_eq!(*level.outcome(), None);
    assert!(!level.mower_ready(2));
    assert!(level.mower_ready(1));
    assert_eq!(level.kills().count(ZombieKind::Normal), 1, "mowed zombies count as kills");
    assert!(level.zombies().is_empty());

    level.update(100_000);
    assert_eq!(*level.outcome(), Some(LevelOutcome::Overrun));
    assert_eq!(level.waves_remaining(), 0);
}

#[test]
fn test_surrender_ends_level() {
    let mut level = Level::new(LevelConfig::front_lawn());
    level.update(1_000);
    level.surrender();
    assert_eq!(*level.outcome(), Some(LevelOutcome::Surrendered));

    let elapsed = *level.elapsed_ms();
    level.update(5_000);
    assert_eq!(*level.elapsed_ms(), elapsed);
    assert_eq!(
        level.place_plant(PlantKind::Sunflower, 0, 0),
        Err(LevelError::Finished)
    );
}

#[test]
fn test_level_config_from_toml_sorts_waves() {
    let config = LevelConfig::from_toml_str(
        r#"
name = "Backyard"
initial_sun = 200

[[waves]]
at_seconds = 30
spawns = [{ kind = "conehead", row = 1 }]

[[waves]]
at_seconds = 10
spawns = [{ kind = "normal", row = 0 }, { kind = "flag", row = 4 }]
"#,
    )
    .expect("Valid level");

    assert_eq!(config.name(), "Backyard");
    assert_eq!(*config.initial_sun(), 200);
    assert_eq!(*config.sky_sun_seconds(), 10);
    assert_eq!(config.waves()[0].at_seconds, 10);
    assert_eq!(config.zombie_count(), 3);
}

#[test]
fn test_level_config_rejects_invalid_levels() {
    let off_lawn = LevelConfig::new(
        "Bad".to_string(),
        50,
        10,
        vec![wave(5, &[(ZombieKind::Normal, 5)])],
    );
    assert!(matches!(off_lawn, Err(LevelError::InvalidConfig { .. })));

    let empty = LevelConfig::from_toml_str("name = \"Empty\"\nwaves = []\n");
    assert!(matches!(empty, Err(LevelError::InvalidConfig { .. })));

    let garbage = LevelConfig::from_toml_str("this is not toml");
    assert!(matches!(garbage, Err(LevelError::InvalidConfig { .. })));
}

#[test]
fn test_deserializing_level_config_validates() {
    let off_lawn = toml::from_str::<LevelConfig>(
        "name = \"Bad\"\n[[waves]]\nat_seconds = 5\nspawns = [{ kind = \"normal\", row = 7 }]\n",
    );
    assert!(off_lawn.is_err());

    let json = r#"{"name":"Json","waves":[
        {"at_seconds":30,"spawns":[{"kind":"normal","row":1}]},
        {"at_seconds":10,"spawns":[{"kind":"normal","row":9}]}
    ]}"#;
    assert!(serde_json::from_str::<LevelConfig>(json).is_err());

    let valid = serde_json::from_str::<LevelConfig>(
        r#"{"name":"Json","waves":[
            {"at_seconds":30,"spawns":[{"kind":"normal","row":1}]},
            {"at_seconds":10,"spawns":[{"kind":"normal","row":3}]}
        ]}"#,
    )
    .expect("Valid level");
    assert_eq!(*valid.initial_sun(), 150);
    let times: Vec<u32> = valid.waves().iter().map(|w| w.at_seconds).collect();
    assert_eq!(times, vec![10, 30]);
}

#[test]
fn test_kill_tally_totals_and_wire_form() {
    let mut tally = KillTally::new();
    tally.record(ZombieKind::Normal);
    tally.add(ZombieKind::Normal, 2);
    tally.record(ZombieKind::Buckethead);

    assert_eq!(tally.total(), 4);
    assert_eq!(tally.score(), 3 * 10 + 30);
    assert_eq!(
        tally.entries().collect::<Vec<_>>(),
        vec![(ZombieKind::Normal, 3), (ZombieKind::Buckethead, 1)]
    );

    let wire = tally.to_wire();
    assert_eq!(wire.get("normal"), Some(&3));
    assert_eq!(wire.get("buckethead"), Some(&1));
    assert!(!wire.contains_key("conehead"));
    assert!(KillTally::new().is_empty());
}

#[test]
fn test_plant_hotkeys() {
    assert_eq!(PlantKind::from_hotkey(1), Some(PlantKind::Sunflower));
    assert_eq!(PlantKind::from_hotkey(4), Some(PlantKind::WallNut));
    assert_eq!(PlantKind::from_hotkey(0), None);
    assert_eq!(PlantKind::from_hotkey(5), None);
}

#[test]
fn test_submission_requires_online_registered_player() {
    let kills: KillTally = [(ZombieKind::Conehead, 2)].into_iter().collect();

    let offline = GameInfo::with_results(
        Some(PlayerIdentity::new("Ann".to_string(), "E1".to_string()).registered(7)),
        true,
        40,
        61_000,
        kills.clone(),
    );
    assert!(offline.submission().is_none());

    let unregistered = GameInfo::with_results(
        Some(PlayerIdentity::new("Ann".to_string(), "E1".to_string())),
        false,
        40,
        61_000,
        kills.clone(),
    );
    assert!(unregistered.submission().is_none());

    let online = GameInfo::with_results(
        Some(PlayerIdentity::new("Ann".to_string(), "E1".to_string()).registered(7)),
        false,
        40,
        61_000,
        kills,
    );
    let request = online.submission().expect("Submission");
    assert_eq!(request.player_id, 7);
    assert_eq!(request.score, 40);
    assert_eq!(request.game_duration, 61_000);
    assert_eq!(request.zombies_killed.get("conehead"), Some(&2));
}

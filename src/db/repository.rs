//! Database repository for players, game records and kill details.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{
    DbError, DbErrorKind, GameRecord, NewGameRecord, NewPlayer, NewZombieKill, Player,
    PlayerStats, ZombieKill, schema,
};

/// Ids of each player's best game, ranked and limited in SQL.
const BEST_GAME_IDS: &str = "\
    SELECT id FROM ( \
        SELECT id, score, game_duration, created_at, \
            ROW_NUMBER() OVER ( \
                PARTITION BY player_id \
                ORDER BY score DESC, game_duration ASC, created_at ASC, id ASC \
            ) AS player_rank \
        FROM game_records \
    ) \
    WHERE player_rank = 1 \
    ORDER BY score DESC, game_duration ASC, created_at ASC, id ASC \
    LIMIT ?";

#[derive(QueryableByName)]
struct GameId {
    #[diesel(sql_type = Integer)]
    id: i32,
}

/// Schema migrations bundled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for leaderboard operations.
///
/// Opens a fresh SQLite connection per call, so it is cheap to clone and
/// safe to move onto blocking worker threads.
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    db_path: String,
}

impl LeaderboardRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// The file is created on first connection if it does not exist.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Self {
        info!(path = %db_path, "Creating LeaderboardRepository");
        Self { db_path }
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Applies any pending schema migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, format!("Migration failed: {}", e)))?
            .len();
        info!(applied, "Migrations up to date");
        Ok(applied)
    }

    /// Creates a new player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a uniqueness constraint rejects the row or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_player(&self, name: String, employee_id: String) -> Result<Player, DbError> {
        let mut conn = self.connection()?;
        let player = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(name, employee_id))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), employee_id = %player.employee_id(), "Player created");
        Ok(player)
    }

    /// Renames a player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn rename_player(&self, player_id: i32, name: String) -> Result<Player, DbError> {
        let mut conn = self.connection()?;
        let player = diesel::update(schema::players::table.find(player_id))
            .set(schema::players::name.eq(name))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id, name = %player.name(), "Player renamed");
        Ok(player)
    }

    /// Gets a player by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player(&self, player_id: i32) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .find(player_id)
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Gets the player registered under exactly this name and employee id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_identity(
        &self,
        name: &str,
        employee_id: &str,
    ) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::name.eq(name))
            .filter(schema::players::employee_id.eq(employee_id))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Gets the earliest-created player with the given employee id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_employee_id(&self, employee_id: &str) -> Result<Option<Player>, DbError> {
        debug!(employee_id = %employee_id, "Looking up player by employee id");
        let mut conn = self.connection()?;

        let player = schema::players::table
            .filter(schema::players::employee_id.eq(employee_id))
            .order((schema::players::created_at.asc(), schema::players::id.asc()))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;

        if let Some(ref p) = player {
            debug!(player_id = p.id(), "Player found");
        } else {
            debug!("Player not found");
        }
        Ok(player)
    }

    /// Lists all players, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;
        let players = schema::players::table
            .order((schema::players::created_at.asc(), schema::players::id.asc()))
            .select(Player::as_select())
            .load(&mut conn)?;

        debug!(count = players.len(), "Players loaded");
        Ok(players)
    }

    /// Records a finished game and its kill details in one transaction.
    ///
    /// Kill rows with a zero count are not stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any insert fails; nothing is stored in that case.
    #[instrument(skip(self, record, kills), fields(player_id = record.player_id(), score = record.score()))]
    pub fn record_game(
        &self,
        record: NewGameRecord,
        kills: &[(String, i32)],
    ) -> Result<(GameRecord, Vec<ZombieKill>), DbError> {
        let mut conn = self.connection()?;

        let (game, stored) = conn.transaction::<_, DbError, _>(|conn| {
            let game = diesel::insert_into(schema::game_records::table)
                .values(&record)
                .returning(GameRecord::as_returning())
                .get_result(conn)?;

            let mut stored = Vec::with_capacity(kills.len());
            for (zombie_type, count) in kills.iter().filter(|(_, count)| *count > 0) {
                let row = diesel::insert_into(schema::zombie_kills::table)
                    .values(&NewZombieKill::new(*game.id(), zombie_type.clone(), *count))
                    .returning(ZombieKill::as_returning())
                    .get_result(conn)?;
                stored.push(row);
            }
            Ok((game, stored))
        })?;

        info!(
            game_record_id = game.id(),
            kill_rows = stored.len(),
            "Game recorded"
        );
        Ok((game, stored))
    }

    /// Loads the kill details of one game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game_kills(&self, game_record_id: i32) -> Result<Vec<ZombieKill>, DbError> {
        let mut conn = self.connection()?;
        let kills = schema::zombie_kills::table
            .filter(schema::zombie_kills::game_record_id.eq(game_record_id))
            .order(schema::zombie_kills::id.asc())
            .select(ZombieKill::as_select())
            .load(&mut conn)?;
        Ok(kills)
    }

    /// Best game per player, ordered by score (desc), duration (asc), then age.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<(GameRecord, Player)>, DbError> {
        use schema::game_records::dsl as gr;

        let mut conn = self.connection()?;
        let ids: Vec<i32> = diesel::sql_query(BEST_GAME_IDS)
            .bind::<BigInt, _>(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<GameId>(&mut conn)?
            .into_iter()
            .map(|row| row.id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let best = gr::game_records
            .inner_join(schema::players::table)
            .filter(gr::id.eq_any(ids))
            .order((
                gr::score.desc(),
                gr::game_duration.asc(),
                gr::created_at.asc(),
                gr::id.asc(),
            ))
            .select((GameRecord::as_select(), Player::as_select()))
            .load::<(GameRecord, Player)>(&mut conn)?;

        debug!(entries = best.len(), "Leaderboard computed");
        Ok(best)
    }

    /// A player's most recent games with their kill details, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn player_history(
        &self,
        player_id: i32,
        limit: i64,
    ) -> Result<Vec<(GameRecord, Vec<ZombieKill>)>, DbError> {
        let mut conn = self.connection()?;

        let records = schema::game_records::table
            .filter(schema::game_records::player_id.eq(player_id))
            .order((
                schema::game_records::created_at.desc(),
                schema::game_records::id.desc(),
            ))
            .limit(limit)
            .select(GameRecord::as_select())
            .load(&mut conn)?;

        let kills = ZombieKill::belonging_to(&records)
            .select(ZombieKill::as_select())
            .load::<ZombieKill>(&mut conn)?
            .grouped_by(&records);

        debug!(player_id, games = records.len(), "History loaded");
        Ok(records.into_iter().zip(kills).collect())
    }

    /// Games played, best score and total kills for a player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn player_stats(&self, player_id: i32) -> Result<PlayerStats, DbError> {
        let mut conn = self.connection()?;

        let scores = schema::game_records::table
            .filter(schema::game_records::player_id.eq(player_id))
            .select(schema::game_records::score)
            .load::<i32>(&mut conn)?;

        let kill_counts = schema::zombie_kills::table
            .filter(
                schema::zombie_kills::game_record_id.eq_any(
                    schema::game_records::table
                        .filter(schema::game_records::player_id.eq(player_id))
                        .select(schema::game_records::id),
                ),
            )
            .select(schema::zombie_kills::count)
            .load::<i32>(&mut conn)?;

        let stats = PlayerStats::new(
            scores.len() as i64,
            scores.iter().copied().max().unwrap_or(0),
            kill_counts.iter().map(|c| i64::from(*c)).sum(),
        );

        info!(
            player_id,
            games = stats.games_played(),
            best = stats.best_score(),
            kills = stats.total_kills(),
            "Player stats computed"
        );
        Ok(stats)
    }
}

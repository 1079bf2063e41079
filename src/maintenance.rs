//! Duplicate-player cleanup.
//!
//! Older databases only enforced `UNIQUE (name, employee_id)`, so one
//! employee could end up with several player rows. [`run_cleanup`] backs the
//! file up, keeps the earliest row per employee id, removes the others along
//! with their games and kill details, and rebuilds `players` with
//! `employee_id UNIQUE`. Everything after the backup happens in a single
//! transaction.

use std::fmt;
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use diesel::connection::SimpleConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use tracing::{debug, error, info, instrument, warn};

use crate::db::{DbError, DbErrorKind, schema};

/// Failure of the cleanup procedure.
#[derive(Debug, Display, Error)]
pub enum MaintenanceError {
    /// Nothing to clean.
    #[display("Database file does not exist: {}", path.display())]
    MissingDatabase {
        /// Path that was checked.
        path: PathBuf,
    },
    /// The backup copy could not be written.
    #[display("Failed to back up database to {}: {}", path.display(), source)]
    Backup {
        /// Intended backup location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The cleanup transaction was rolled back.
    #[display("Cleanup failed and was rolled back ({}); restore from {} if needed", source, backup.display())]
    CleanupFailed {
        /// Backup taken before the transaction started.
        backup: PathBuf,
        /// What went wrong inside the transaction.
        source: DbError,
    },
}

/// One employee id that had more than one player row.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DuplicateGroup {
    employee_id: String,
    kept_id: i32,
    kept_name: String,
    deleted_ids: Vec<i32>,
    deleted_games: usize,
    deleted_kills: usize,
}

/// Row counts after the cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct TableCounts {
    players: i64,
    game_records: i64,
    zombie_kills: i64,
}

/// Outcome of a successful [`run_cleanup`].
#[derive(Debug, Clone, Getters)]
pub struct CleanupReport {
    backup_path: PathBuf,
    groups: Vec<DuplicateGroup>,
    counts: TableCounts,
}

impl CleanupReport {
    /// Player rows removed across all groups.
    pub fn deleted_players(&self) -> usize {
        self.groups.iter().map(|g| g.deleted_ids.len()).sum()
    }

    /// Game records removed across all groups.
    pub fn deleted_games(&self) -> usize {
        self.groups.iter().map(|g| g.deleted_games).sum()
    }

    /// Kill-detail rows removed across all groups.
    pub fn deleted_kills(&self) -> usize {
        self.groups.iter().map(|g| g.deleted_kills).sum()
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backup written to {}", self.backup_path.display())?;
        if self.groups.is_empty() {
            writeln!(f, "No duplicate employee ids found")?;
        } else {
            writeln!(f, "Found {} duplicate employee ids", self.groups.len())?;
            for group in &self.groups {
                writeln!(f)?;
                writeln!(f, "Employee {}:", group.employee_id)?;
                writeln!(f, "  kept player id={} name={}", group.kept_id, group.kept_name)?;
                writeln!(f, "  deleted players {:?}", group.deleted_ids)?;
                if group.deleted_games > 0 {
                    writeln!(f, "  deleted {} game records", group.deleted_games)?;
                }
                if group.deleted_kills > 0 {
                    writeln!(f, "  deleted {} kill details", group.deleted_kills)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "Deleted in total:")?;
            writeln!(f, "  players:      {}", self.deleted_players())?;
            writeln!(f, "  game records: {}", self.deleted_games())?;
            writeln!(f, "  kill details: {}", self.deleted_kills())?;
        }
        writeln!(f)?;
        writeln!(f, "Verified: no duplicate employee ids remain")?;
        writeln!(f, "  players:      {}", self.counts.players)?;
        writeln!(f, "  game records: {}", self.counts.game_records)?;
        write!(f, "  kill details: {}", self.counts.zombie_kills)
    }
}

/// Runs the whole cleanup against the database at `db_path`.
///
/// # Errors
///
/// Fails without touching the database if it is missing or cannot be backed
/// up. Any later failure rolls the transaction back and names the backup.
#[instrument]
pub fn run_cleanup(db_path: &Path) -> Result<CleanupReport, MaintenanceError> {
    if !db_path.exists() {
        error!(path = %db_path.display(), "Database file missing");
        return Err(MaintenanceError::MissingDatabase {
            path: db_path.to_path_buf(),
        });
    }

    info!("Starting duplicate-player cleanup");
    let backup_path = backup_database(db_path)?;

    let cleaned = clean_in_transaction(db_path);
    match cleaned {
        Ok((groups, counts)) => {
            info!(
                groups = groups.len(),
                players = counts.players,
                "Cleanup complete"
            );
            Ok(CleanupReport {
                backup_path,
                groups,
                counts,
            })
        }
        Err(source) => {
            error!(error = %source, backup = %backup_path.display(), "Cleanup rolled back");
            Err(MaintenanceError::CleanupFailed {
                backup: backup_path,
                source,
            })
        }
    }
}

fn clean_in_transaction(db_path: &Path) -> Result<(Vec<DuplicateGroup>, TableCounts), DbError> {
    let url = db_path.to_string_lossy();
    let mut conn = SqliteConnection::establish(&url)?;
    // The rebuild drops a table other tables reference.
    conn.batch_execute("PRAGMA foreign_keys = OFF;")?;

    conn.transaction::<_, DbError, _>(|conn| {
        let groups = clean_duplicate_players(conn)?;
        rebuild_players_table(conn)?;
        let counts = verify_cleanup(conn)?;
        Ok((groups, counts))
    })
}

/// Copies the database next to itself with a timestamp suffix.
///
/// # Errors
///
/// Returns [`MaintenanceError::Backup`] if the copy fails.
#[instrument]
pub fn backup_database(db_path: &Path) -> Result<PathBuf, MaintenanceError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let mut name = db_path.as_os_str().to_os_string();
    name.push(format!(".backup_{}", stamp));
    let backup = PathBuf::from(name);

    std::fs::copy(db_path, &backup).map_err(|source| MaintenanceError::Backup {
        path: backup.clone(),
        source,
    })?;

    info!(backup = %backup.display(), "Database backed up");
    Ok(backup)
}

/// Employee ids with more than one player row, and how many rows each has.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn find_duplicate_employee_ids(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, i64)>, DbError> {
    use schema::players::dsl::*;

    let duplicates = players
        .group_by(employee_id)
        .having(count_star().gt(1))
        .select((employee_id, count_star()))
        .order(employee_id.asc())
        .load::<(String, i64)>(conn)?;

    debug!(groups = duplicates.len(), "Duplicate scan finished");
    Ok(duplicates)
}

/// Deletes every player row but the earliest for each duplicated employee id.
///
/// Kill details go first, then game records, then the players themselves.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
#[instrument(skip(conn))]
pub fn clean_duplicate_players(
    conn: &mut SqliteConnection,
) -> Result<Vec<DuplicateGroup>, DbError> {
    use schema::{game_records, players, zombie_kills};

    let duplicates = find_duplicate_employee_ids(conn)?;
    if duplicates.is_empty() {
        info!("No duplicate employee ids");
        return Ok(Vec::new());
    }
    info!(groups = duplicates.len(), "Duplicate employee ids found");

    let mut groups = Vec::with_capacity(duplicates.len());
    for (employee, rows) in duplicates {
        let members = players::table
            .filter(players::employee_id.eq(&employee))
            .order((players::created_at.asc(), players::id.asc()))
            .select((players::id, players::name))
            .load::<(i32, String)>(conn)?;

        let Some(((kept_id, kept_name), rest)) = members.split_first() else {
            continue;
        };
        let deleted_ids: Vec<i32> = rest.iter().map(|(id, _)| *id).collect();

        let doomed_games = game_records::table
            .filter(game_records::player_id.eq_any(&deleted_ids))
            .select(game_records::id);

        let deleted_kills = diesel::delete(
            zombie_kills::table.filter(zombie_kills::game_record_id.eq_any(doomed_games)),
        )
        .execute(conn)?;

        let deleted_games = diesel::delete(
            game_records::table.filter(game_records::player_id.eq_any(&deleted_ids)),
        )
        .execute(conn)?;

        let deleted_players =
            diesel::delete(players::table.filter(players::id.eq_any(&deleted_ids)))
                .execute(conn)?;

        info!(
            employee_id = %employee,
            rows,
            kept_id,
            deleted_players,
            deleted_games,
            deleted_kills,
            "Duplicate group cleaned"
        );

        groups.push(DuplicateGroup {
            employee_id: employee,
            kept_id: *kept_id,
            kept_name: kept_name.clone(),
            deleted_ids,
            deleted_games,
            deleted_kills,
        });
    }

    Ok(groups)
}

/// Recreates `players` with `employee_id UNIQUE`, preserving every row and id.
///
/// # Errors
///
/// Returns [`DbError`] if the copy fails, e.g. because duplicates remain.
#[instrument(skip(conn))]
pub fn rebuild_players_table(conn: &mut SqliteConnection) -> Result<(), DbError> {
    conn.batch_execute(
        "CREATE TABLE players_new (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            name TEXT NOT NULL,
            employee_id TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        INSERT INTO players_new (id, name, employee_id, created_at)
            SELECT id, name, employee_id, created_at FROM players;
        DROP TABLE players;
        ALTER TABLE players_new RENAME TO players;",
    )?;
    info!("Players table rebuilt with unique employee ids");
    Ok(())
}

/// Checks that no duplicates remain and counts what is left.
///
/// # Errors
///
/// Returns a [`DbErrorKind::Integrity`] error if duplicates are still present.
#[instrument(skip(conn))]
pub fn verify_cleanup(conn: &mut SqliteConnection) -> Result<TableCounts, DbError> {
    let remaining = find_duplicate_employee_ids(conn)?;
    if !remaining.is_empty() {
        for (employee, rows) in &remaining {
            warn!(employee_id = %employee, rows, "Duplicate still present");
        }
        return Err(DbError::new(
            DbErrorKind::Integrity,
            format!("{} duplicate employee ids remain", remaining.len()),
        ));
    }

    let counts = TableCounts {
        players: schema::players::table.count().get_result(conn)?,
        game_records: schema::game_records::table.count().get_result(conn)?,
        zombie_kills: schema::zombie_kills::table.count().get_result(conn)?,
    };
    info!(
        players = counts.players,
        game_records = counts.game_records,
        zombie_kills = counts.zombie_kills,
        "Cleanup verified"
    );
    Ok(counts)
}

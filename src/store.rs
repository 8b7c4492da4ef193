use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use log::info;
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, Params, Row, params};

use crate::error::SourceError;
use crate::schema::{
    Competition, Match, MatchResult, Outcome, Player, PlayerStat, Season, SeasonSnapshot, Team,
    Venue,
};
use crate::source::{DataSource, SourceRequest};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

pub fn default_db_path() -> Option<PathBuf> {
    crate::config::app_data_dir().map(|dir| dir.join("season.sqlite"))
}

/// Open (creating if needed) a writable database with the schema in place.
pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS seasons (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS competitions (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            season_id INTEGER NOT NULL REFERENCES seasons(id) ON DELETE CASCADE
        );
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            nationality TEXT NOT NULL,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE
        );
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            match_date TEXT NOT NULL,
            kickoff TEXT NOT NULL,
            round TEXT NOT NULL,
            venue TEXT NOT NULL CHECK (venue IN ('Home', 'Away', 'Neutral')),
            home_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            away_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            competition_id INTEGER NOT NULL REFERENCES competitions(id) ON DELETE CASCADE,
            season_id INTEGER NOT NULL REFERENCES seasons(id) ON DELETE CASCADE,
            CHECK (home_team_id <> away_team_id)
        );
        CREATE TABLE IF NOT EXISTS match_results (
            id INTEGER PRIMARY KEY,
            match_id INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            goals_for INTEGER NOT NULL,
            goals_against INTEGER NOT NULL,
            outcome TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS player_stats (
            id INTEGER PRIMARY KEY,
            player_id INTEGER NOT NULL UNIQUE REFERENCES players(id) ON DELETE CASCADE,
            goals INTEGER NOT NULL CHECK (goals >= 0),
            assists INTEGER NOT NULL CHECK (assists >= 0),
            matches_played INTEGER NOT NULL CHECK (matches_played >= 0),
            yellow_cards INTEGER NOT NULL CHECK (yellow_cards >= 0),
            red_cards INTEGER NOT NULL CHECK (red_cards >= 0)
        );
        CREATE INDEX IF NOT EXISTS idx_teams_name ON teams(name);
        CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);
        CREATE INDEX IF NOT EXISTS idx_results_team ON match_results(team_id);
        CREATE INDEX IF NOT EXISTS idx_results_match ON match_results(match_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Persist a whole snapshot into a fresh database (demo data, fixtures). Duplicate ids fail.
pub fn write_snapshot(conn: &mut Connection, snapshot: &SeasonSnapshot) -> Result<()> {
    let tx = conn.transaction().context("begin snapshot transaction")?;
    for s in &snapshot.seasons {
        tx.execute(
            "INSERT INTO seasons(id, label) VALUES (?1, ?2)",
            params![s.id, s.label],
        )
        .context("insert season")?;
    }
    for c in &snapshot.competitions {
        tx.execute(
            "INSERT INTO competitions(id, name) VALUES (?1, ?2)",
            params![c.id, c.name],
        )
        .context("insert competition")?;
    }
    for t in &snapshot.teams {
        tx.execute(
            "INSERT INTO teams(id, name, season_id) VALUES (?1, ?2, ?3)",
            params![t.id, t.name, t.season_id],
        )
        .context("insert team")?;
    }
    for p in &snapshot.players {
        tx.execute(
            "INSERT INTO players(id, name, position, nationality, team_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![p.id, p.name, p.position, p.nationality, p.team_id],
        )
        .context("insert player")?;
    }
    for m in &snapshot.matches {
        tx.execute(
            "INSERT INTO matches(id, match_date, kickoff, round, venue,
                home_team_id, away_team_id, competition_id, season_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                m.id,
                m.date.format(DATE_FMT).to_string(),
                m.time.format(TIME_FMT).to_string(),
                m.round,
                m.venue.label(),
                m.home_team_id,
                m.away_team_id,
                m.competition_id,
                m.season_id
            ],
        )
        .context("insert match")?;
    }
    for r in &snapshot.results {
        tx.execute(
            "INSERT INTO match_results(id, match_id, team_id, goals_for, goals_against, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                r.id,
                r.match_id,
                r.team_id,
                r.goals_for,
                r.goals_against,
                r.outcome.label()
            ],
        )
        .context("insert match result")?;
    }
    for s in &snapshot.player_stats {
        tx.execute(
            "INSERT INTO player_stats(id, player_id, goals, assists, matches_played, yellow_cards, red_cards)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                s.id,
                s.player_id,
                s.goals,
                s.assists,
                s.matches_played,
                s.yellow_cards,
                s.red_cards
            ],
        )
        .context("insert player stat")?;
    }
    tx.commit().context("commit snapshot")?;
    Ok(())
}

/// Sort rusqlite failures into the two source error kinds.
fn classify(err: rusqlite::Error, what: &str) -> SourceError {
    let msg = format!("{what}: {err}");
    match &err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnIndex(_)
        | rusqlite::Error::InvalidColumnName(_) => SourceError::SchemaMismatch(msg),
        // Prepare failures carry the detail in the message, whichever variant wraps them.
        _ if msg.contains("no such table") || msg.contains("no such column") => {
            SourceError::SchemaMismatch(msg)
        }
        _ => SourceError::Connectivity(msg),
    }
}

fn parse_text<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Result<T, String>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw)
        .map_err(|msg| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into()))
}

fn query_rows<T>(
    conn: &Connection,
    sql: &str,
    args: impl Params,
    what: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, SourceError> {
    let mut stmt = conn.prepare(sql).map_err(|e| classify(e, what))?;
    let rows = stmt
        .query_map(args, map)
        .map_err(|e| classify(e, what))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| classify(e, what))?);
    }
    Ok(out)
}

fn load_seasons(conn: &Connection) -> Result<Vec<Season>, SourceError> {
    query_rows(
        conn,
        "SELECT id, label FROM seasons ORDER BY id",
        params![],
        "load seasons",
        |row| {
            Ok(Season {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        },
    )
}

fn load_competitions(conn: &Connection) -> Result<Vec<Competition>, SourceError> {
    query_rows(
        conn,
        "SELECT id, name FROM competitions ORDER BY id",
        params![],
        "load competitions",
        |row| {
            Ok(Competition {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
}

fn load_teams(conn: &Connection, team: Option<&str>) -> Result<Vec<Team>, SourceError> {
    query_rows(
        conn,
        "SELECT id, name, season_id FROM teams WHERE ?1 IS NULL OR name = ?1 ORDER BY id",
        params![team],
        "load teams",
        |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                season_id: row.get(2)?,
            })
        },
    )
}

fn load_players(conn: &Connection, team: Option<&str>) -> Result<Vec<Player>, SourceError> {
    query_rows(
        conn,
        r#"
        SELECT p.id, p.name, p.position, p.nationality, p.team_id
        FROM players p
        JOIN teams t ON p.team_id = t.id
        WHERE ?1 IS NULL OR t.name = ?1
        ORDER BY p.id
        "#,
        params![team],
        "load players",
        |row| {
            Ok(Player {
                id: row.get(0)?,
                name: row.get(1)?,
                position: row.get(2)?,
                nationality: row.get(3)?,
                team_id: row.get(4)?,
            })
        },
    )
}

fn load_player_stats(conn: &Connection, team: Option<&str>) -> Result<Vec<PlayerStat>, SourceError> {
    query_rows(
        conn,
        r#"
        SELECT s.id, s.player_id, s.goals, s.assists, s.matches_played, s.yellow_cards, s.red_cards
        FROM player_stats s
        JOIN players p ON s.player_id = p.id
        JOIN teams t ON p.team_id = t.id
        WHERE ?1 IS NULL OR t.name = ?1
        ORDER BY s.id
        "#,
        params![team],
        "load player stats",
        |row| {
            Ok(PlayerStat {
                id: row.get(0)?,
                player_id: row.get(1)?,
                goals: row.get(2)?,
                assists: row.get(3)?,
                matches_played: row.get(4)?,
                yellow_cards: row.get(5)?,
                red_cards: row.get(6)?,
            })
        },
    )
}

fn load_matches(conn: &Connection, team: Option<&str>) -> Result<Vec<Match>, SourceError> {
    query_rows(
        conn,
        r#"
        SELECT m.id, m.match_date, m.kickoff, m.round, m.venue,
               m.home_team_id, m.away_team_id, m.competition_id, m.season_id
        FROM matches m
        WHERE ?1 IS NULL OR EXISTS (
            SELECT 1 FROM teams t
            WHERE t.name = ?1 AND t.id IN (m.home_team_id, m.away_team_id)
        )
        ORDER BY m.match_date, m.kickoff, m.id
        "#,
        params![team],
        "load matches",
        |row| {
            Ok(Match {
                id: row.get(0)?,
                date: parse_text(row, 1, |s| {
                    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| format!("date {s:?}: {e}"))
                })?,
                time: parse_text(row, 2, |s| {
                    NaiveTime::parse_from_str(s, TIME_FMT)
                        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                        .map_err(|e| format!("time {s:?}: {e}"))
                })?,
                round: row.get(3)?,
                venue: parse_text(row, 4, |s| s.parse::<Venue>())?,
                home_team_id: row.get(5)?,
                away_team_id: row.get(6)?,
                competition_id: row.get(7)?,
                season_id: row.get(8)?,
            })
        },
    )
}

fn load_results(conn: &Connection, team: Option<&str>) -> Result<Vec<MatchResult>, SourceError> {
    query_rows(
        conn,
        r#"
        SELECT r.id, r.match_id, r.team_id, r.goals_for, r.goals_against, r.outcome
        FROM match_results r
        JOIN teams t ON r.team_id = t.id
        WHERE ?1 IS NULL OR t.name = ?1
        ORDER BY r.id
        "#,
        params![team],
        "load match results",
        |row| {
            Ok(MatchResult {
                id: row.get(0)?,
                match_id: row.get(1)?,
                team_id: row.get(2)?,
                goals_for: row.get(3)?,
                goals_against: row.get(4)?,
                outcome: parse_text(row, 5, |s| s.parse::<Outcome>())?,
            })
        },
    )
}

/// Everything in the database, optionally restricted to one team.
pub fn load_snapshot(conn: &Connection, team: Option<&str>) -> Result<SeasonSnapshot, SourceError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| classify(e, "begin read"))?;
    let snapshot = SeasonSnapshot {
        seasons: load_seasons(&tx)?,
        competitions: load_competitions(&tx)?,
        teams: load_teams(&tx, team)?,
        players: load_players(&tx, team)?,
        matches: load_matches(&tx, team)?,
        results: load_results(&tx, team)?,
        player_stats: load_player_stats(&tx, team)?,
    };
    tx.finish().map_err(|e| classify(e, "end read"))?;
    Ok(snapshot)
}

/// Only the row sets `request.report` reads, in one read transaction.
pub fn load_for_request(conn: &Connection, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
    let team = request.team.as_deref();
    let report = request.report;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| classify(e, "begin read"))?;
    let mut snapshot = SeasonSnapshot {
        teams: load_teams(&tx, team)?,
        ..SeasonSnapshot::default()
    };
    if report.reads_results() {
        snapshot.results = load_results(&tx, team)?;
    } else {
        snapshot.players = load_players(&tx, team)?;
    }
    if report.reads_player_stats() {
        snapshot.player_stats = load_player_stats(&tx, team)?;
    }
    tx.finish().map_err(|e| classify(e, "end read"))?;
    Ok(snapshot)
}

/// SQLite-backed data source. Each request is served from one read transaction.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SourceError::Connectivity(format!("open {}: {e}", path.display())))?;
        info!("opened season database {}", path.display());
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DataSource for SqliteSource {
    fn load(&self, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
        load_for_request(&self.conn, request)
    }

    fn load_all(&self) -> Result<SeasonSnapshot, SourceError> {
        load_snapshot(&self.conn, None)
    }
}

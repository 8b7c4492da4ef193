#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use datafoot::schema::{
    Competition, Match, MatchResult, Outcome, Player, PlayerStat, Season, SeasonSnapshot, Team,
    Venue,
};

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

/// Scratch path under the system temp dir, unique per test name and process.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("datafoot-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let path = dir.join(name);
    let _ = fs::remove_file(&path);
    let _ = fs::remove_dir_all(&path);
    path
}

/// Builds small seasons row by row. Ids are assigned in insertion order.
pub struct SeasonBuilder {
    snapshot: SeasonSnapshot,
}

impl SeasonBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: SeasonSnapshot {
                seasons: vec![Season {
                    id: 1,
                    label: "2024-2025".to_string(),
                }],
                competitions: vec![Competition {
                    id: 1,
                    name: "Premier League".to_string(),
                }],
                ..SeasonSnapshot::default()
            },
        }
    }

    pub fn team(&mut self, name: &str) -> u32 {
        let id = self.snapshot.teams.len() as u32 + 1;
        self.snapshot.teams.push(Team {
            id,
            name: name.to_string(),
            season_id: 1,
        });
        id
    }

    pub fn player(&mut self, team_id: u32, name: &str, nationality: &str) -> u32 {
        let id = self.snapshot.players.len() as u32 + 1;
        self.snapshot.players.push(Player {
            id,
            name: name.to_string(),
            position: "FW".to_string(),
            nationality: nationality.to_string(),
            team_id,
        });
        id
    }

    /// Player plus one stat row: (goals, assists, yellow, red).
    pub fn scorer(&mut self, team_id: u32, name: &str, line: (u32, u32, u32, u32)) -> u32 {
        let id = self.player(team_id, name, "FRA");
        self.stat(id, line);
        id
    }

    pub fn stat(&mut self, player_id: u32, (goals, assists, yellow, red): (u32, u32, u32, u32)) {
        let id = self.snapshot.player_stats.len() as u32 + 1;
        self.snapshot.player_stats.push(PlayerStat {
            id,
            player_id,
            goals,
            assists,
            matches_played: 10,
            yellow_cards: yellow,
            red_cards: red,
        });
    }

    pub fn fixture(&mut self, home: u32, away: u32) -> u32 {
        let id = self.snapshot.matches.len() as u32 + 1;
        self.snapshot.matches.push(Match {
            id,
            date: NaiveDate::from_ymd_opt(2024, 8, 16).expect("valid date")
                + chrono::Duration::days(i64::from(id) * 7),
            time: NaiveTime::from_hms_opt(15, 0, 0).expect("valid time"),
            round: format!("Matchweek {id}"),
            venue: Venue::Home,
            home_team_id: home,
            away_team_id: away,
            competition_id: 1,
            season_id: 1,
        });
        id
    }

    /// One result row with an explicit outcome, which may contradict the score.
    pub fn result(&mut self, match_id: u32, team_id: u32, goals_for: u32, goals_against: u32, outcome: Outcome) {
        let id = self.snapshot.results.len() as u32 + 1;
        self.snapshot.results.push(MatchResult {
            id,
            match_id,
            team_id,
            goals_for,
            goals_against,
            outcome,
        });
    }

    /// A played match: fixture plus both consistent result rows.
    pub fn game(&mut self, home: u32, away: u32, home_goals: u32, away_goals: u32) -> u32 {
        let id = self.fixture(home, away);
        self.result(id, home, home_goals, away_goals, Outcome::from_goals(home_goals, away_goals));
        self.result(id, away, away_goals, home_goals, Outcome::from_goals(away_goals, home_goals));
        id
    }

    pub fn build(self) -> SeasonSnapshot {
        self.snapshot
    }
}

/// Three clubs, a handful of players, four played matches.
pub fn small_league() -> SeasonSnapshot {
    let mut b = SeasonBuilder::new();
    let lyon = b.team("Lyon");
    let lens = b.team("Lens");
    let brest = b.team("Brest");

    b.scorer(lyon, "Lacazette", (12, 4, 3, 0));
    b.scorer(lyon, "Cherki", (8, 10, 5, 1));
    b.scorer(lyon, "Tolisso", (3, 2, 9, 1));
    b.scorer(lens, "Openda", (15, 3, 2, 0));
    b.scorer(lens, "Sotoca", (6, 6, 4, 0));
    b.scorer(brest, "Bizot", (0, 0, 1, 0));
    b.scorer(brest, "Lees-Melou", (0, 2, 7, 2));

    b.game(lyon, lens, 2, 1);
    b.game(lens, brest, 3, 0);
    b.game(brest, lyon, 1, 1);
    b.game(lyon, brest, 4, 2);
    b.build()
}

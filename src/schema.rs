use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: u32,
    /// Year-range label, e.g. "2024-2025". Unique.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub season_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub nationality: String,
    pub team_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub round: String,
    pub venue: Venue,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub competition_id: u32,
    pub season_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// The outcome implied by a goal tally.
    pub fn from_goals(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Outcome::Win => 3,
            Outcome::Draw => 1,
            Outcome::Loss => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = String;

    // The upstream store writes French labels; accept both.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "win" | "w" | "victoire" => Ok(Outcome::Win),
            "loss" | "l" | "défaite" | "defaite" => Ok(Outcome::Loss),
            "draw" | "d" | "nul" => Ok(Outcome::Draw),
            other => Err(format!("unknown match outcome {other:?}")),
        }
    }
}

impl Venue {
    pub fn label(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
            Venue::Neutral => "Neutral",
        }
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "home" => Ok(Venue::Home),
            "away" => Ok(Venue::Away),
            "neutral" => Ok(Venue::Neutral),
            other => Err(format!("unknown venue {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u32,
    pub match_id: u32,
    pub team_id: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub outcome: Outcome,
}

impl MatchResult {
    pub fn is_consistent(&self) -> bool {
        Outcome::from_goals(self.goals_for, self.goals_against) == self.outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub id: u32,
    pub player_id: u32,
    pub goals: u32,
    pub assists: u32,
    pub matches_played: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// Every row set of one season, loaded once per request and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub results: Vec<MatchResult>,
    #[serde(default)]
    pub player_stats: Vec<PlayerStat>,
}

impl SeasonSnapshot {
    pub fn team_index(&self) -> HashMap<u32, &Team> {
        self.teams.iter().map(|t| (t.id, t)).collect()
    }

    pub fn player_index(&self) -> HashMap<u32, &Player> {
        self.players.iter().map(|p| (p.id, p)).collect()
    }

    /// Result rows whose stored outcome contradicts their goal tally.
    pub fn outcome_inconsistencies(&self) -> Vec<&MatchResult> {
        self.results.iter().filter(|r| !r.is_consistent()).collect()
    }

    /// Keep only rows that belong to `team` (by exact name). Results and players of
    /// other teams are dropped; matches are kept when either side is the team.
    pub fn restricted_to_team(&self, team: &str) -> SeasonSnapshot {
        let team_ids: BTreeSet<u32> = self
            .teams
            .iter()
            .filter(|t| t.name == team)
            .map(|t| t.id)
            .collect();
        let players: Vec<Player> = self
            .players
            .iter()
            .filter(|p| team_ids.contains(&p.team_id))
            .cloned()
            .collect();
        let player_ids: BTreeSet<u32> = players.iter().map(|p| p.id).collect();

        SeasonSnapshot {
            seasons: self.seasons.clone(),
            competitions: self.competitions.clone(),
            teams: self
                .teams
                .iter()
                .filter(|t| team_ids.contains(&t.id))
                .cloned()
                .collect(),
            matches: self
                .matches
                .iter()
                .filter(|m| team_ids.contains(&m.home_team_id) || team_ids.contains(&m.away_team_id))
                .cloned()
                .collect(),
            results: self
                .results
                .iter()
                .filter(|r| team_ids.contains(&r.team_id))
                .cloned()
                .collect(),
            player_stats: self
                .player_stats
                .iter()
                .filter(|s| player_ids.contains(&s.player_id))
                .cloned()
                .collect(),
            players,
        }
    }
}

/// Distinct team names, sorted.
pub fn team_names(snapshot: &SeasonSnapshot) -> Vec<String> {
    snapshot
        .teams
        .iter()
        .map(|t| t.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

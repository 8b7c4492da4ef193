use chrono::{Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::schema::{
    Competition, Match, MatchResult, Outcome, Player, PlayerStat, Season, SeasonSnapshot, Team,
    Venue,
};

const CLUBS: &[&str] = &[
    "Arsenal",
    "Aston Villa",
    "Bournemouth",
    "Brentford",
    "Brighton",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Ipswich Town",
    "Leicester City",
    "Liverpool",
    "Manchester City",
    "Manchester Utd",
    "Newcastle Utd",
    "Nott'ham Forest",
    "Southampton",
    "Tottenham",
    "West Ham",
    "Wolves",
];

const NATIONALITIES: &[&str] = &[
    "ENG", "FRA", "ESP", "BRA", "POR", "NED", "GER", "ARG", "BEL", "SCO", "NOR", "SEN", "JPN",
];

const POSITIONS: &[&str] = &["GK", "DF", "DF", "DF", "DF", "MF", "MF", "MF", "FW", "FW", "FW"];

/// A deterministic, internally consistent season: double round-robin, every result's
/// outcome matches its score, and each player has exactly one stat row.
pub fn generate(seed: u64, teams: usize, players_per_team: usize) -> SeasonSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = teams.clamp(2, CLUBS.len());

    let season = Season {
        id: 1,
        label: "2024-2025".to_string(),
    };
    let competition = Competition {
        id: 1,
        name: "Premier League".to_string(),
    };

    let team_rows: Vec<Team> = CLUBS
        .iter()
        .take(teams)
        .enumerate()
        .map(|(idx, name)| Team {
            id: idx as u32 + 1,
            name: name.to_string(),
            season_id: season.id,
        })
        .collect();

    let mut players = Vec::new();
    let mut player_stats = Vec::new();
    for team in &team_rows {
        for slot in 0..players_per_team {
            let id = players.len() as u32 + 1;
            let position = POSITIONS[slot % POSITIONS.len()];
            let nationality = NATIONALITIES
                .choose(&mut rng)
                .copied()
                .unwrap_or("ENG");
            players.push(Player {
                id,
                name: format!("{} #{}", team.name, slot + 1),
                position: position.to_string(),
                nationality: nationality.to_string(),
                team_id: team.id,
            });
            let (goal_cap, assist_cap) = match position {
                "FW" => (25, 10),
                "MF" => (10, 12),
                "DF" => (4, 5),
                _ => (0, 1),
            };
            player_stats.push(PlayerStat {
                id,
                player_id: id,
                goals: rng.gen_range(0..=goal_cap),
                assists: rng.gen_range(0..=assist_cap),
                matches_played: rng.gen_range(5..=38),
                yellow_cards: rng.gen_range(0..=12),
                red_cards: u32::from(rng.gen_bool(0.08)),
            });
        }
    }

    let start = NaiveDate::from_ymd_opt(2024, 8, 16).unwrap_or_default();
    let kickoff = NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default();
    let per_round = (teams / 2).max(1);
    let mut matches = Vec::new();
    let mut results = Vec::new();
    for home in &team_rows {
        for away in &team_rows {
            if home.id == away.id {
                continue;
            }
            let id = matches.len() as u32 + 1;
            let round = matches.len() / per_round + 1;
            matches.push(Match {
                id,
                date: start + Duration::weeks(round as i64 - 1),
                time: kickoff,
                round: format!("Matchweek {round}"),
                venue: Venue::Home,
                home_team_id: home.id,
                away_team_id: away.id,
                competition_id: competition.id,
                season_id: season.id,
            });

            let home_goals: u32 = rng.gen_range(0..=4);
            let away_goals: u32 = rng.gen_range(0..=3);
            for (team_id, goals_for, goals_against) in [
                (home.id, home_goals, away_goals),
                (away.id, away_goals, home_goals),
            ] {
                results.push(MatchResult {
                    id: results.len() as u32 + 1,
                    match_id: id,
                    team_id,
                    goals_for,
                    goals_against,
                    outcome: Outcome::from_goals(goals_for, goals_against),
                });
            }
        }
    }

    SeasonSnapshot {
        seasons: vec![season],
        competitions: vec![competition],
        teams: team_rows,
        players,
        matches,
        results,
        player_stats,
    }
}

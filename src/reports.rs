use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::ranking::{OrderKey, SortDirection, SortKey, sort_stable, top_per_group};
use crate::schema::{Outcome, Player, PlayerStat, SeasonSnapshot, Team};
use crate::source::{DataSource, SourceRequest};
use crate::table::{Cell, Column, Table};

pub const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    TopScorers,
    MostDecisive,
    Discipline,
    Nationalities,
    TeamGoals,
    Averages,
    Standings,
    BestDefense,
    BestScorerPerTeam,
    MatchesPlayed,
}

impl ReportKind {
    pub const ALL: [ReportKind; 10] = [
        ReportKind::TopScorers,
        ReportKind::MostDecisive,
        ReportKind::Discipline,
        ReportKind::Nationalities,
        ReportKind::TeamGoals,
        ReportKind::Averages,
        ReportKind::Standings,
        ReportKind::BestDefense,
        ReportKind::BestScorerPerTeam,
        ReportKind::MatchesPlayed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::TopScorers => "top-scorers",
            ReportKind::MostDecisive => "most-decisive",
            ReportKind::Discipline => "discipline",
            ReportKind::Nationalities => "nationalities",
            ReportKind::TeamGoals => "team-goals",
            ReportKind::Averages => "averages",
            ReportKind::Standings => "standings",
            ReportKind::BestDefense => "best-defense",
            ReportKind::BestScorerPerTeam => "best-scorer-per-team",
            ReportKind::MatchesPlayed => "matches-played",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::TopScorers => "Top scorers",
            ReportKind::MostDecisive => "Most decisive players (goals + assists)",
            ReportKind::Discipline => "Discipline (yellow + red cards)",
            ReportKind::Nationalities => "Squad nationalities by team",
            ReportKind::TeamGoals => "Goals scored per team",
            ReportKind::Averages => "Scoring and conceding averages",
            ReportKind::Standings => "Standings (3/1/0)",
            ReportKind::BestDefense => "Best defense",
            ReportKind::BestScorerPerTeam => "Best scorer per team",
            ReportKind::MatchesPlayed => "Matches played per team",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.name().replace('-', "_"))
    }

    /// Whether the report reads match results (team reports) rather than player rows.
    pub fn reads_results(self) -> bool {
        matches!(
            self,
            ReportKind::TeamGoals
                | ReportKind::Averages
                | ReportKind::Standings
                | ReportKind::BestDefense
                | ReportKind::MatchesPlayed
        )
    }

    pub fn reads_player_stats(self) -> bool {
        matches!(
            self,
            ReportKind::TopScorers
                | ReportKind::MostDecisive
                | ReportKind::Discipline
                | ReportKind::BestScorerPerTeam
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = DataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_lowercase().replace('_', "-");
        ReportKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| DataError::invalid(format!("unknown report {raw:?}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Row limit for the player leaderboards (top scorers, most decisive, discipline).
    pub limit: usize,
    pub discipline_direction: SortDirection,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TOP_LIMIT,
            discipline_direction: SortDirection::Descending,
        }
    }
}

pub trait ReportRow {
    fn columns() -> Vec<Column>;
    fn cells(&self) -> Vec<Cell>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorerRow {
    pub player: String,
    pub team: String,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisiveRow {
    pub player: String,
    pub team: String,
    pub goals: u32,
    pub assists: u32,
    pub contributions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineRow {
    pub player: String,
    pub team: String,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub discipline_score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalityRow {
    pub team: String,
    pub nationality: String,
    pub players: u32,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalityShare {
    pub nationality: String,
    pub players: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGoalsRow {
    pub team: String,
    pub goals_for: u64,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragesRow {
    pub team: String,
    pub avg_goals_for: Option<f64>,
    pub avg_goals_against: Option<f64>,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseRow {
    pub team: String,
    pub goals_against: u64,
    pub matches: u32,
    pub avg_goals_against: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestScorerRow {
    pub player: String,
    pub team: String,
    pub goals: u32,
    pub assists: u32,
    pub contributions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchesPlayedRow {
    pub team: String,
    pub matches: u32,
    pub distinct_matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl ReportRow for ScorerRow {
    fn columns() -> Vec<Column> {
        vec![Column::text("player"), Column::text("team"), Column::int("goals")]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.player.as_str().into(),
            self.team.as_str().into(),
            self.goals.into(),
        ]
    }
}

impl ReportRow for DecisiveRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("player"),
            Column::text("team"),
            Column::int("goals"),
            Column::int("assists"),
            Column::int("contributions"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.player.as_str().into(),
            self.team.as_str().into(),
            self.goals.into(),
            self.assists.into(),
            self.contributions.into(),
        ]
    }
}

impl ReportRow for DisciplineRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("player"),
            Column::text("team"),
            Column::int("yellow_cards"),
            Column::int("red_cards"),
            Column::int("discipline_score"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.player.as_str().into(),
            self.team.as_str().into(),
            self.yellow_cards.into(),
            self.red_cards.into(),
            self.discipline_score.into(),
        ]
    }
}

impl ReportRow for NationalityRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("team"),
            Column::text("nationality"),
            Column::int("players"),
            Column::float("share_pct"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.nationality.as_str().into(),
            self.players.into(),
            self.share_pct.into(),
        ]
    }
}

impl ReportRow for TeamGoalsRow {
    fn columns() -> Vec<Column> {
        vec![Column::text("team"), Column::int("goals_for"), Column::int("matches")]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.goals_for.into(),
            self.matches.into(),
        ]
    }
}

impl ReportRow for AveragesRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("team"),
            Column::float("avg_goals_for"),
            Column::float("avg_goals_against"),
            Column::int("matches"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.avg_goals_for.into(),
            self.avg_goals_against.into(),
            self.matches.into(),
        ]
    }
}

impl ReportRow for StandingRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("team"),
            Column::int("played"),
            Column::int("wins"),
            Column::int("draws"),
            Column::int("losses"),
            Column::int("goals_for"),
            Column::int("goals_against"),
            Column::int("goal_difference"),
            Column::int("points"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.played.into(),
            self.wins.into(),
            self.draws.into(),
            self.losses.into(),
            self.goals_for.into(),
            self.goals_against.into(),
            self.goal_difference.into(),
            self.points.into(),
        ]
    }
}

impl ReportRow for DefenseRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("team"),
            Column::int("goals_against"),
            Column::int("matches"),
            Column::float("avg_goals_against"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.goals_against.into(),
            self.matches.into(),
            self.avg_goals_against.into(),
        ]
    }
}

impl ReportRow for BestScorerRow {
    fn columns() -> Vec<Column> {
        DecisiveRow::columns()
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.player.as_str().into(),
            self.team.as_str().into(),
            self.goals.into(),
            self.assists.into(),
            self.contributions.into(),
        ]
    }
}

impl ReportRow for MatchesPlayedRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("team"),
            Column::int("matches"),
            Column::int("distinct_matches"),
            Column::int("wins"),
            Column::int("draws"),
            Column::int("losses"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.team.as_str().into(),
            self.matches.into(),
            self.distinct_matches.into(),
            self.wins.into(),
            self.draws.into(),
            self.losses.into(),
        ]
    }
}

pub fn to_table<R: ReportRow>(rows: &[R], default_order: Vec<SortKey>, search: &[&str]) -> Table {
    let mut table = Table::new(R::columns())
        .with_default_order(default_order)
        .with_search_columns(search);
    for row in rows {
        table.push_row(row.cells());
    }
    table
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(total: u64, count: u32) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(round2(total as f64 / f64::from(count)))
    }
}

// PlayerStat -> Player -> Team, in PlayerStat row order. Orphans are dropped.
#[derive(Debug, Clone, Copy)]
struct PlayerLine<'a> {
    player: &'a Player,
    team: &'a Team,
    stat: &'a PlayerStat,
}

fn player_lines(snapshot: &SeasonSnapshot) -> Vec<PlayerLine<'_>> {
    let players = snapshot.player_index();
    let teams = snapshot.team_index();
    snapshot
        .player_stats
        .iter()
        .filter_map(|stat| {
            let player = *players.get(&stat.player_id)?;
            let team = *teams.get(&player.team_id)?;
            Some(PlayerLine { player, team, stat })
        })
        .collect()
}

fn leaderboard<'a>(
    snapshot: &'a SeasonSnapshot,
    metric: impl Fn(&PlayerStat) -> u64 + 'a,
    direction: SortDirection,
    limit: usize,
) -> Vec<PlayerLine<'a>> {
    let mut lines = player_lines(snapshot);
    sort_stable(
        &mut lines,
        &[OrderKey::new(direction, move |l: &PlayerLine<'_>| {
            Cell::from(metric(l.stat))
        })],
    );
    lines.truncate(limit);
    lines
}

/// Goals leaderboard. Ties keep stat row order.
pub fn top_scorers(snapshot: &SeasonSnapshot, limit: usize) -> Vec<ScorerRow> {
    leaderboard(snapshot, |s| u64::from(s.goals), SortDirection::Descending, limit)
        .into_iter()
        .map(|l| ScorerRow {
            player: l.player.name.clone(),
            team: l.team.name.clone(),
            goals: l.stat.goals,
        })
        .collect()
}

/// Goals plus assists leaderboard.
pub fn most_decisive(snapshot: &SeasonSnapshot, limit: usize) -> Vec<DecisiveRow> {
    leaderboard(
        snapshot,
        |s| u64::from(s.goals) + u64::from(s.assists),
        SortDirection::Descending,
        limit,
    )
    .into_iter()
    .map(|l| DecisiveRow {
        player: l.player.name.clone(),
        team: l.team.name.clone(),
        goals: l.stat.goals,
        assists: l.stat.assists,
        contributions: u64::from(l.stat.goals) + u64::from(l.stat.assists),
    })
    .collect()
}

/// Yellow plus red cards per player. Descending surfaces the most carded players.
pub fn discipline(
    snapshot: &SeasonSnapshot,
    limit: usize,
    direction: SortDirection,
) -> Vec<DisciplineRow> {
    leaderboard(
        snapshot,
        |s| u64::from(s.yellow_cards) + u64::from(s.red_cards),
        direction,
        limit,
    )
    .into_iter()
    .map(|l| DisciplineRow {
        player: l.player.name.clone(),
        team: l.team.name.clone(),
        yellow_cards: l.stat.yellow_cards,
        red_cards: l.stat.red_cards,
        discipline_score: u64::from(l.stat.yellow_cards) + u64::from(l.stat.red_cards),
    })
    .collect()
}

/// Player count per (team, nationality), by team name then count descending. `share_pct`
/// is the group's share of its team, rounded so each team sums to exactly 100.
pub fn nationality_breakdown(snapshot: &SeasonSnapshot) -> Vec<NationalityRow> {
    let teams = snapshot.team_index();
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<(&str, &str, u32)> = Vec::new();
    let mut team_totals: HashMap<&str, u32> = HashMap::new();

    for player in &snapshot.players {
        let Some(team) = teams.get(&player.team_id) else {
            continue;
        };
        let key = (team.name.as_str(), player.nationality.as_str());
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key.0, key.1, 0));
            groups.len() - 1
        });
        groups[slot].2 += 1;
        *team_totals.entry(key.0).or_insert(0) += 1;
    }

    let hundredths = share_hundredths(&groups, &team_totals);
    let mut rows: Vec<NationalityRow> = groups
        .into_iter()
        .zip(hundredths)
        .map(|((team, nationality, players), share)| NationalityRow {
            team: team.to_string(),
            nationality: nationality.to_string(),
            players,
            share_pct: share as f64 / 100.0,
        })
        .collect();
    sort_stable(
        &mut rows,
        &[
            OrderKey::asc(|r: &NationalityRow| Cell::from(r.team.as_str())),
            OrderKey::desc(|r: &NationalityRow| Cell::from(r.players)),
        ],
    );
    rows
}

// Each group's share of its team in hundredths of a percent. Floors are topped up by
// largest remainder (ties in group order) so every team's shares add up to exactly 10000.
fn share_hundredths(groups: &[(&str, &str, u32)], team_totals: &HashMap<&str, u32>) -> Vec<u64> {
    let mut shares = Vec::with_capacity(groups.len());
    let mut remainders: HashMap<&str, Vec<(u64, usize)>> = HashMap::new();
    for (idx, (team, _, players)) in groups.iter().enumerate() {
        let total = u64::from(team_totals.get(team).copied().unwrap_or(*players).max(1));
        let scaled = u64::from(*players) * 10_000;
        shares.push(scaled / total);
        remainders.entry(*team).or_default().push((scaled % total, idx));
    }
    for mut members in remainders.into_values() {
        let floor_sum: u64 = members.iter().map(|(_, idx)| shares[*idx]).sum();
        let missing = 10_000u64.saturating_sub(floor_sum) as usize;
        members.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        for (_, idx) in members.into_iter().take(missing) {
            shares[idx] += 1;
        }
    }
    shares
}

/// Unrounded nationality proportions for one team (sums to 100 when the team has players).
pub fn nationality_shares(rows: &[NationalityRow], team: &str) -> Vec<NationalityShare> {
    let selected: Vec<&NationalityRow> = rows.iter().filter(|r| r.team == team).collect();
    let total: u32 = selected.iter().map(|r| r.players).sum();
    if total == 0 {
        return Vec::new();
    }
    selected
        .into_iter()
        .map(|r| NationalityShare {
            nationality: r.nationality.clone(),
            players: r.players,
            percent: f64::from(r.players) * 100.0 / f64::from(total),
        })
        .collect()
}

#[derive(Debug, Default)]
struct TeamTally {
    rows: u32,
    match_ids: HashSet<u32>,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u64,
    goals_against: u64,
}

// MatchResult -> Team, grouped by team name in order of first appearance.
fn tally_by_team(snapshot: &SeasonSnapshot) -> Vec<(String, TeamTally)> {
    let teams = snapshot.team_index();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(String, TeamTally)> = Vec::new();

    for result in &snapshot.results {
        let Some(team) = teams.get(&result.team_id) else {
            continue;
        };
        let slot = *slots.entry(team.name.as_str()).or_insert_with(|| {
            out.push((team.name.clone(), TeamTally::default()));
            out.len() - 1
        });
        let tally = &mut out[slot].1;
        tally.rows += 1;
        tally.match_ids.insert(result.match_id);
        tally.goals_for += u64::from(result.goals_for);
        tally.goals_against += u64::from(result.goals_against);
        match result.outcome {
            Outcome::Win => tally.wins += 1,
            Outcome::Draw => tally.draws += 1,
            Outcome::Loss => tally.losses += 1,
        }
    }
    out
}

/// Sum of goals scored per team, most first.
pub fn team_goals(snapshot: &SeasonSnapshot) -> Vec<TeamGoalsRow> {
    let mut rows: Vec<TeamGoalsRow> = tally_by_team(snapshot)
        .into_iter()
        .map(|(team, t)| TeamGoalsRow {
            team,
            goals_for: t.goals_for,
            matches: t.rows,
        })
        .collect();
    sort_stable(
        &mut rows,
        &[OrderKey::desc(|r: &TeamGoalsRow| Cell::from(r.goals_for))],
    );
    rows
}

/// Mean goals scored and conceded per team. Teams without result rows never form a group,
/// so they are absent.
pub fn scoring_averages(snapshot: &SeasonSnapshot) -> Vec<AveragesRow> {
    let mut rows: Vec<AveragesRow> = tally_by_team(snapshot)
        .into_iter()
        .map(|(team, t)| AveragesRow {
            team,
            avg_goals_for: mean(t.goals_for, t.rows),
            avg_goals_against: mean(t.goals_against, t.rows),
            matches: t.rows,
        })
        .collect();
    sort_stable(
        &mut rows,
        &[OrderKey::desc(|r: &AveragesRow| Cell::from(r.avg_goals_for))],
    );
    rows
}

/// League table: 3 points a win, 1 a draw; points then goal difference, both descending.
pub fn standings(snapshot: &SeasonSnapshot) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = tally_by_team(snapshot)
        .into_iter()
        .map(|(team, t)| StandingRow {
            team,
            played: t.rows,
            wins: t.wins,
            draws: t.draws,
            losses: t.losses,
            goals_for: t.goals_for,
            goals_against: t.goals_against,
            goal_difference: t.goals_for as i64 - t.goals_against as i64,
            points: u64::from(t.wins) * u64::from(Outcome::Win.points())
                + u64::from(t.draws) * u64::from(Outcome::Draw.points()),
        })
        .collect();
    sort_stable(
        &mut rows,
        &[
            OrderKey::desc(|r: &StandingRow| Cell::from(r.points)),
            OrderKey::desc(|r: &StandingRow| Cell::from(r.goal_difference)),
        ],
    );
    rows
}

/// Goals conceded per team, fewest first.
pub fn best_defense(snapshot: &SeasonSnapshot) -> Vec<DefenseRow> {
    let mut rows: Vec<DefenseRow> = tally_by_team(snapshot)
        .into_iter()
        .map(|(team, t)| DefenseRow {
            team,
            goals_against: t.goals_against,
            matches: t.rows,
            avg_goals_against: mean(t.goals_against, t.rows),
        })
        .collect();
    sort_stable(
        &mut rows,
        &[OrderKey::asc(|r: &DefenseRow| Cell::from(r.goals_against))],
    );
    rows
}

/// Top scorer of each team. Only players with at least one goal compete; a team with no
/// scorer has no row.
pub fn best_scorer_per_team(snapshot: &SeasonSnapshot) -> Vec<BestScorerRow> {
    let scorers: Vec<PlayerLine<'_>> = player_lines(snapshot)
        .into_iter()
        .filter(|l| l.stat.goals > 0)
        .collect();
    let best = top_per_group(
        scorers,
        |l| l.team.id,
        &[
            OrderKey::desc(|l: &PlayerLine<'_>| Cell::from(l.stat.goals)),
            OrderKey::desc(|l: &PlayerLine<'_>| Cell::from(l.stat.assists)),
        ],
    );

    let mut rows: Vec<BestScorerRow> = best
        .into_iter()
        .map(|l| BestScorerRow {
            player: l.player.name.clone(),
            team: l.team.name.clone(),
            goals: l.stat.goals,
            assists: l.stat.assists,
            contributions: u64::from(l.stat.goals) + u64::from(l.stat.assists),
        })
        .collect();
    sort_stable(
        &mut rows,
        &[
            OrderKey::desc(|r: &BestScorerRow| Cell::from(r.goals)),
            OrderKey::desc(|r: &BestScorerRow| Cell::from(r.contributions)),
        ],
    );
    rows
}

/// Result rows, distinct matches and outcome counts per team, busiest first.
pub fn matches_played(snapshot: &SeasonSnapshot) -> Vec<MatchesPlayedRow> {
    let mut rows: Vec<MatchesPlayedRow> = tally_by_team(snapshot)
        .into_iter()
        .map(|(team, t)| MatchesPlayedRow {
            team,
            matches: t.rows,
            distinct_matches: t.match_ids.len() as u32,
            wins: t.wins,
            draws: t.draws,
            losses: t.losses,
        })
        .collect();
    sort_stable(
        &mut rows,
        &[
            OrderKey::desc(|r: &MatchesPlayedRow| Cell::from(r.matches)),
            OrderKey::desc(|r: &MatchesPlayedRow| Cell::from(r.wins)),
        ],
    );
    rows
}

fn normalize_team(team_filter: Option<&str>) -> Option<&str> {
    team_filter.map(str::trim).filter(|t| !t.is_empty())
}

/// Compute one report over an in-memory snapshot. A team filter narrows the input
/// before ranking, so leaderboard limits apply to the filtered set.
pub fn build_report(
    snapshot: &SeasonSnapshot,
    kind: ReportKind,
    team_filter: Option<&str>,
    opts: &ReportOptions,
) -> Table {
    let restricted;
    let snapshot = match normalize_team(team_filter) {
        Some(team) => {
            restricted = snapshot.restricted_to_team(team);
            &restricted
        }
        None => snapshot,
    };

    let player_search: &[&str] = &["player", "team"];
    let team_search: &[&str] = &["team"];
    match kind {
        ReportKind::TopScorers => to_table(
            &top_scorers(snapshot, opts.limit),
            vec![SortKey::desc("goals")],
            player_search,
        ),
        ReportKind::MostDecisive => to_table(
            &most_decisive(snapshot, opts.limit),
            vec![SortKey::desc("contributions")],
            player_search,
        ),
        ReportKind::Discipline => to_table(
            &discipline(snapshot, opts.limit, opts.discipline_direction),
            vec![SortKey {
                column: "discipline_score".to_string(),
                direction: opts.discipline_direction,
            }],
            player_search,
        ),
        ReportKind::Nationalities => to_table(
            &nationality_breakdown(snapshot),
            vec![SortKey::asc("team"), SortKey::desc("players")],
            &["team", "nationality"],
        ),
        ReportKind::TeamGoals => to_table(
            &team_goals(snapshot),
            vec![SortKey::desc("goals_for")],
            team_search,
        ),
        ReportKind::Averages => to_table(
            &scoring_averages(snapshot),
            vec![SortKey::desc("avg_goals_for")],
            team_search,
        ),
        ReportKind::Standings => to_table(
            &standings(snapshot),
            vec![SortKey::desc("points"), SortKey::desc("goal_difference")],
            team_search,
        ),
        ReportKind::BestDefense => to_table(
            &best_defense(snapshot),
            vec![SortKey::asc("goals_against")],
            team_search,
        ),
        ReportKind::BestScorerPerTeam => to_table(
            &best_scorer_per_team(snapshot),
            vec![SortKey::desc("goals"), SortKey::desc("contributions")],
            player_search,
        ),
        ReportKind::MatchesPlayed => to_table(
            &matches_played(snapshot),
            vec![SortKey::desc("matches"), SortKey::desc("wins")],
            team_search,
        ),
    }
}

/// Fetch the rows a report needs from `source` and compute it. Source failures surface
/// as [`DataError::InputUnavailable`]; a report with no data is an empty table.
pub fn compute_report(
    source: &dyn DataSource,
    kind: ReportKind,
    team_filter: Option<&str>,
    opts: &ReportOptions,
) -> Result<Table, DataError> {
    let team = normalize_team(team_filter);
    let request = SourceRequest {
        report: kind,
        team: team.map(str::to_string),
    };
    let snapshot = source.load(&request)?;

    let inconsistent = snapshot.outcome_inconsistencies();
    if !inconsistent.is_empty() {
        warn!(
            "{} result rows have an outcome that contradicts the score (first: result {})",
            inconsistent.len(),
            inconsistent[0].id
        );
    }

    let table = build_report(&snapshot, kind, team, opts);
    debug!(
        "report {kind} team={} stats={} results={} -> {} rows",
        team.unwrap_or("*"),
        snapshot.player_stats.len(),
        snapshot.results.len(),
        table.len()
    );
    Ok(table)
}

/// Every report over one snapshot. Reports are independent, so they run in parallel.
pub fn compute_all_reports(
    snapshot: &SeasonSnapshot,
    opts: &ReportOptions,
) -> Vec<(ReportKind, Table)> {
    ReportKind::ALL
        .as_slice()
        .par_iter()
        .map(|kind| (*kind, build_report(snapshot, *kind, None, opts)))
        .collect()
}

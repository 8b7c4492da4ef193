mod common;

use std::collections::BTreeSet;

use datafoot::error::{DataError, SourceError};
use datafoot::ranking::SortDirection;
use datafoot::reports::{
    self, ReportKind, ReportOptions, best_defense, best_scorer_per_team, build_report,
    compute_all_reports, compute_report, discipline, matches_played, most_decisive,
    nationality_breakdown, nationality_shares, round2, scoring_averages, standings, team_goals,
    top_scorers,
};
use datafoot::schema::{Outcome, SeasonSnapshot, team_names};
use datafoot::source::{DataSource, InMemorySource, SourceRequest};
use datafoot::table::Cell;
use datafoot::fake_season;

use common::{SeasonBuilder, small_league};

fn alpha_beta() -> SeasonSnapshot {
    let mut b = SeasonBuilder::new();
    let alpha = b.team("Team Alpha");
    let beta = b.team("Team Beta");
    b.scorer(alpha, "P1", (10, 5, 0, 0));
    b.scorer(alpha, "P2", (10, 8, 0, 0));
    b.scorer(beta, "P3", (3, 1, 0, 0));
    b.build()
}

#[test]
fn top_scorers_keep_row_order_on_ties() {
    let rows = top_scorers(&alpha_beta(), 2);
    let names: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(names, ["P1", "P2"]);
    assert!(rows.iter().all(|r| r.goals == 10));
    assert!(rows.iter().all(|r| r.team == "Team Alpha"));
}

#[test]
fn most_decisive_orders_by_goals_plus_assists() {
    let rows = most_decisive(&alpha_beta(), 10);
    let order: Vec<(&str, u64)> = rows
        .iter()
        .map(|r| (r.player.as_str(), r.contributions))
        .collect();
    assert_eq!(order, [("P2", 18), ("P1", 15), ("P3", 4)]);
}

#[test]
fn standings_count_stored_outcomes() {
    let mut b = SeasonBuilder::new();
    let x = b.team("Team X");
    let y = b.team("Team Y");
    let outcomes = [Outcome::Win, Outcome::Win, Outcome::Draw, Outcome::Loss];
    let goals_for = [3, 2, 0, 1];
    let goals_against = [1, 2, 2, 3];
    for idx in 0..4 {
        let m = b.fixture(x, y);
        b.result(m, x, goals_for[idx], goals_against[idx], outcomes[idx]);
    }
    let snapshot = b.build();

    let rows = standings(&snapshot);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.team, "Team X");
    assert_eq!((row.wins, row.draws, row.losses), (2, 1, 1));
    assert_eq!(row.points, 7);
    assert_eq!(row.goals_for, 6);
    assert_eq!(row.goals_against, 8);
    assert_eq!(row.goal_difference, -2);
    assert_eq!(row.played, 4);

    // The stored outcomes disagree with two of the scores; that is reported, not corrected.
    assert_eq!(snapshot.outcome_inconsistencies().len(), 2);
}

#[test]
fn averages_skip_teams_without_results() {
    let mut b = SeasonBuilder::new();
    let a = b.team("Played");
    let c = b.team("Opponent");
    b.team("Idle");
    b.game(a, c, 2, 1);
    b.game(c, a, 0, 0);
    b.game(a, c, 3, 3);
    let snapshot = b.build();

    let rows = scoring_averages(&snapshot);
    let teams: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
    assert!(!teams.contains(&"Idle"));
    let played = rows.iter().find(|r| r.team == "Played").expect("played row");
    assert_eq!(played.avg_goals_for, Some(1.67));
    assert_eq!(played.avg_goals_against, Some(1.33));
    assert_eq!(played.matches, 3);

    let table = build_report(&snapshot, ReportKind::Averages, Some("Idle"), &ReportOptions::default());
    assert!(table.is_empty());
    assert_eq!(table.column_names(), ["team", "avg_goals_for", "avg_goals_against", "matches"]);
}

#[test]
fn averages_and_defense_round_the_same_way() {
    assert_eq!(round2(2.0 / 3.0), 0.67);
    assert_eq!(round2(0.125), 0.13);

    let snapshot = small_league();
    let averages = scoring_averages(&snapshot);
    for row in best_defense(&snapshot) {
        let avg = averages
            .iter()
            .find(|a| a.team == row.team)
            .expect("same teams in both reports");
        assert_eq!(row.avg_goals_against, avg.avg_goals_against);
    }
}

#[test]
fn standings_points_and_totals_hold_for_every_team() {
    let snapshot = fake_season::generate(7, 12, 5);
    let rows = standings(&snapshot);
    assert_eq!(rows.len(), 12);
    for row in &rows {
        assert_eq!(row.points, u64::from(3 * row.wins + row.draws));
        assert_eq!(row.wins + row.draws + row.losses, row.played);
        assert_eq!(row.played, 22);
    }
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.points > b.points || (a.points == b.points && a.goal_difference >= b.goal_difference),
            "{} ({}, {}) ranked above {} ({}, {})",
            a.team,
            a.points,
            a.goal_difference,
            b.team,
            b.points,
            b.goal_difference
        );
    }
}

#[test]
fn defense_and_team_goals_agree_on_match_counts() {
    let snapshot = small_league();
    let goals = team_goals(&snapshot);
    let defense = best_defense(&snapshot);
    assert_eq!(goals.len(), defense.len());
    for row in &goals {
        let def = defense
            .iter()
            .find(|d| d.team == row.team)
            .expect("team present in both reports");
        assert_eq!(def.matches, row.matches);
    }

    let order: Vec<&str> = defense.iter().map(|d| d.team.as_str()).collect();
    // Lyon concede 4, Lens 2, Brest 8.
    assert_eq!(order, ["Lens", "Lyon", "Brest"]);
    let order: Vec<(&str, u64)> = goals.iter().map(|g| (g.team.as_str(), g.goals_for)).collect();
    assert_eq!(order, [("Lyon", 7), ("Lens", 4), ("Brest", 3)]);
}

#[test]
fn matches_played_counts_rows_and_distinct_matches() {
    let mut b = SeasonBuilder::new();
    let a = b.team("A");
    let c = b.team("C");
    let m = b.game(a, c, 1, 0);
    // A duplicated result row for the same match counts as a row but not a new match.
    b.result(m, a, 1, 0, Outcome::Win);
    b.game(c, a, 2, 2);
    let rows = matches_played(&b.build());

    let a_row = rows.iter().find(|r| r.team == "A").expect("A row");
    assert_eq!(a_row.matches, 3);
    assert_eq!(a_row.distinct_matches, 2);
    assert_eq!((a_row.wins, a_row.draws, a_row.losses), (2, 1, 0));
    assert_eq!(rows[0].team, "A");
}

#[test]
fn nationality_breakdown_orders_by_team_then_count() {
    let mut b = SeasonBuilder::new();
    let nice = b.team("Nice");
    let ajaccio = b.team("Ajaccio");
    b.player(nice, "N1", "FRA");
    b.player(nice, "N2", "SEN");
    b.player(nice, "N3", "SEN");
    b.player(ajaccio, "A1", "FRA");
    b.player(ajaccio, "A2", "FRA");
    b.player(ajaccio, "A3", "ALG");
    let rows = nationality_breakdown(&b.build());

    let got: Vec<(&str, &str, u32)> = rows
        .iter()
        .map(|r| (r.team.as_str(), r.nationality.as_str(), r.players))
        .collect();
    assert_eq!(
        got,
        [
            ("Ajaccio", "FRA", 2),
            ("Ajaccio", "ALG", 1),
            ("Nice", "SEN", 2),
            ("Nice", "FRA", 1),
        ]
    );
    assert_eq!(rows[0].share_pct, 66.67);
}

#[test]
fn nationality_shares_sum_to_one_hundred() {
    let snapshot = fake_season::generate(11, 6, 23);
    let rows = nationality_breakdown(&snapshot);
    for team in team_names(&snapshot) {
        let shares = nationality_shares(&rows, &team);
        assert!(!shares.is_empty());
        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() <= 0.01, "{team}: {total}");
    }
    assert!(nationality_shares(&rows, "Nobody").is_empty());
}

#[test]
fn rounded_shares_add_up_for_each_team() {
    let mut b = SeasonBuilder::new();
    let monaco = b.team("Monaco");
    let metz = b.team("Metz");
    for (idx, nat) in ["FRA", "SUI", "USA", "JPN", "BRA", "DEN", "POL"].iter().enumerate() {
        b.player(monaco, &format!("M{idx}"), nat);
    }
    b.player(metz, "Z1", "FRA");
    b.player(metz, "Z2", "GEO");
    b.player(metz, "Z3", "SEN");
    let snapshot = b.build();

    let rows = nationality_breakdown(&snapshot);
    for team in ["Monaco", "Metz"] {
        let hundredths: i64 = rows
            .iter()
            .filter(|r| r.team == team)
            .map(|r| (r.share_pct * 100.0).round() as i64)
            .sum();
        assert_eq!(hundredths, 10_000, "{team}");
    }
    let monaco_shares: Vec<f64> = rows.iter().filter(|r| r.team == "Monaco").map(|r| r.share_pct).collect();
    assert_eq!(monaco_shares, [14.29, 14.29, 14.29, 14.29, 14.28, 14.28, 14.28]);
    let metz_shares: Vec<f64> = rows.iter().filter(|r| r.team == "Metz").map(|r| r.share_pct).collect();
    assert_eq!(metz_shares, [33.34, 33.33, 33.33]);

    let table = build_report(&snapshot, ReportKind::Nationalities, Some("Monaco"), &ReportOptions::default());
    let total: f64 = table
        .column_values("share_pct")
        .iter()
        .filter_map(|c| match c {
            Cell::Float(v) => Some(*v),
            _ => None,
        })
        .sum();
    assert!((total - 100.0).abs() < 0.005, "{total}");
}

#[test]
fn huge_counts_widen_instead_of_overflowing() {
    let mut b = SeasonBuilder::new();
    let giants = b.team("Giants");
    let dwarves = b.team("Dwarves");
    b.scorer(giants, "Huge", (u32::MAX, 1, u32::MAX, 1));
    let first = b.fixture(giants, dwarves);
    b.result(first, giants, u32::MAX, 0, Outcome::Win);
    b.result(first, dwarves, 0, u32::MAX, Outcome::Loss);
    let second = b.fixture(dwarves, giants);
    b.result(second, giants, u32::MAX, 0, Outcome::Win);
    b.result(second, dwarves, 0, u32::MAX, Outcome::Loss);
    let snapshot = b.build();
    let big = u64::from(u32::MAX);

    let decisive = most_decisive(&snapshot, 10);
    assert_eq!(decisive[0].contributions, big + 1);
    let carded = discipline(&snapshot, 10, SortDirection::Descending);
    assert_eq!(carded[0].discipline_score, big + 1);
    let best = best_scorer_per_team(&snapshot);
    assert_eq!(best[0].contributions, big + 1);

    let goals = team_goals(&snapshot);
    assert_eq!(goals[0].team, "Giants");
    assert_eq!(goals[0].goals_for, 2 * big);
    let table = standings(&snapshot);
    assert_eq!(table[0].goals_for, 2 * big);
    assert_eq!(table[0].goal_difference, 2 * big as i64);
    assert_eq!(table[1].goals_against, 2 * big);
    assert_eq!(best_defense(&snapshot)[1].goals_against, 2 * big);
    assert_eq!(scoring_averages(&snapshot)[0].avg_goals_for, Some(big as f64));

    let report = build_report(&snapshot, ReportKind::MostDecisive, None, &ReportOptions::default());
    assert_eq!(report.cell(0, "contributions"), Some(&Cell::Int(i64::from(u32::MAX) + 1)));
}

#[test]
fn best_scorer_breaks_goal_ties_on_assists() {
    let mut b = SeasonBuilder::new();
    let a = b.team("A");
    let c = b.team("C");
    let d = b.team("D");
    b.scorer(a, "A-low-assists", (9, 1, 0, 0));
    b.scorer(a, "A-high-assists", (9, 4, 0, 0));
    b.scorer(a, "A-bench", (2, 9, 0, 0));
    b.scorer(c, "C-striker", (11, 0, 0, 0));
    b.scorer(d, "D-keeper", (0, 3, 0, 0));
    let rows = best_scorer_per_team(&b.build());

    let got: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.team.as_str(), r.player.as_str()))
        .collect();
    assert_eq!(got, [("C", "C-striker"), ("A", "A-high-assists")]);
    assert!(rows.iter().all(|r| r.team != "D"));
}

#[test]
fn best_scorer_ties_on_goals_then_contributions() {
    let mut b = SeasonBuilder::new();
    let a = b.team("A");
    let c = b.team("C");
    b.scorer(a, "A1", (7, 1, 0, 0));
    b.scorer(c, "C1", (7, 5, 0, 0));
    let rows = best_scorer_per_team(&b.build());
    assert_eq!(rows[0].player, "C1");
    assert_eq!(rows[1].player, "A1");
}

#[test]
fn discipline_direction_is_a_parameter() {
    let snapshot = small_league();
    let most = discipline(&snapshot, 3, SortDirection::Descending);
    let least = discipline(&snapshot, 3, SortDirection::Ascending);

    assert_eq!(most[0].player, "Tolisso");
    assert_eq!(most[0].discipline_score, 10);
    assert_eq!(least[0].player, "Bizot");
    assert_eq!(least[0].discipline_score, 1);
    assert!(least.windows(2).all(|w| w[0].discipline_score <= w[1].discipline_score));

    let opts = ReportOptions {
        limit: 3,
        discipline_direction: SortDirection::Ascending,
    };
    let table = build_report(&snapshot, ReportKind::Discipline, None, &opts);
    assert_eq!(table.cell(0, "player"), Some(&Cell::from("Bizot")));
    assert_eq!(table.default_order[0].direction, SortDirection::Ascending);
}

#[test]
fn team_filter_applies_before_the_limit() {
    let snapshot = small_league();
    let opts = ReportOptions {
        limit: 2,
        ..ReportOptions::default()
    };

    let all = build_report(&snapshot, ReportKind::TopScorers, None, &opts);
    let players: Vec<String> = all.column_values("player").iter().map(|c| c.to_string()).collect();
    assert_eq!(players, ["Openda", "Lacazette"]);

    let lyon = build_report(&snapshot, ReportKind::TopScorers, Some("Lyon"), &opts);
    let players: Vec<String> = lyon.column_values("player").iter().map(|c| c.to_string()).collect();
    assert_eq!(players, ["Lacazette", "Cherki"]);

    let nobody = build_report(&snapshot, ReportKind::TopScorers, Some("lyon"), &opts);
    assert!(nobody.is_empty());

    let blank = build_report(&snapshot, ReportKind::TopScorers, Some("  "), &opts);
    assert_eq!(blank, all);
}

#[test]
fn orphaned_rows_are_dropped() {
    let mut snapshot = small_league();
    // Stat for a player that does not exist, and a player on a missing team.
    let mut ghost = snapshot.player_stats[0].clone();
    ghost.id = 900;
    ghost.player_id = 999;
    ghost.goals = 50;
    snapshot.player_stats.push(ghost);
    let mut stray = snapshot.players[0].clone();
    stray.id = 901;
    stray.team_id = 77;
    snapshot.players.push(stray);
    let mut stray_stat = snapshot.player_stats[0].clone();
    stray_stat.id = 902;
    stray_stat.player_id = 901;
    stray_stat.goals = 40;
    snapshot.player_stats.push(stray_stat);
    let mut stray_result = snapshot.results[0].clone();
    stray_result.id = 903;
    stray_result.team_id = 77;
    snapshot.results.push(stray_result);

    assert_eq!(top_scorers(&snapshot, 10)[0].player, "Openda");
    assert_eq!(standings(&snapshot).len(), 3);
    let rows = nationality_breakdown(&snapshot);
    assert_eq!(rows.iter().map(|r| r.players).sum::<u32>(), 7);
}

#[test]
fn team_reports_only_name_known_teams() {
    let snapshot = fake_season::generate(3, 8, 6);
    let known: BTreeSet<String> = team_names(&snapshot).into_iter().collect();
    for (kind, table) in compute_all_reports(&snapshot, &ReportOptions::default()) {
        for cell in table.column_values("team") {
            assert!(known.contains(&cell.to_string()), "{kind}: {cell}");
        }
    }
}

#[test]
fn empty_input_gives_empty_tables_with_columns() {
    let snapshot = SeasonSnapshot::default();
    for kind in ReportKind::ALL {
        let table = build_report(&snapshot, kind, None, &ReportOptions::default());
        assert!(table.is_empty(), "{kind}");
        assert!(!table.columns.is_empty(), "{kind}");
        assert!(!table.default_order.is_empty(), "{kind}");
    }
}

#[test]
fn compute_all_reports_follows_catalog_order() {
    let snapshot = small_league();
    let tables = compute_all_reports(&snapshot, &ReportOptions::default());
    let kinds: Vec<ReportKind> = tables.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, ReportKind::ALL);
    for (kind, table) in &tables {
        assert_eq!(*table, build_report(&snapshot, *kind, None, &ReportOptions::default()));
    }
}

#[test]
fn report_names_parse_back() {
    for kind in ReportKind::ALL {
        assert_eq!(kind.name().parse::<ReportKind>(), Ok(kind));
        assert!(kind.file_name().ends_with(".csv"));
    }
    assert_eq!("Best_Scorer_Per_Team".parse::<ReportKind>(), Ok(ReportKind::BestScorerPerTeam));
    assert!(matches!(
        "league-table".parse::<ReportKind>(),
        Err(DataError::InvalidParameter(_))
    ));
}

#[test]
fn compute_report_reads_through_the_source() {
    let source = InMemorySource::new(small_league());
    let table = compute_report(&source, ReportKind::Standings, None, &ReportOptions::default())
        .expect("in-memory source never fails");
    assert_eq!(table.cell(0, "team"), Some(&Cell::from("Lyon")));
    assert_eq!(table.cell(0, "points"), Some(&Cell::Int(7)));

    let lens = compute_report(&source, ReportKind::Standings, Some("Lens"), &ReportOptions::default())
        .expect("filtered report");
    assert_eq!(lens.len(), 1);
    assert_eq!(lens.cell(0, "points"), Some(&Cell::Int(3)));
}

struct Unreachable;

impl DataSource for Unreachable {
    fn load(&self, _request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
        Err(SourceError::Connectivity("connection refused".to_string()))
    }

    fn load_all(&self) -> Result<SeasonSnapshot, SourceError> {
        Err(SourceError::Connectivity("connection refused".to_string()))
    }
}

#[test]
fn source_failures_surface_unchanged() {
    let err = reports::compute_report(&Unreachable, ReportKind::TopScorers, None, &ReportOptions::default())
        .expect_err("source is down");
    assert_eq!(
        err,
        DataError::InputUnavailable(SourceError::Connectivity("connection refused".to_string()))
    );
}

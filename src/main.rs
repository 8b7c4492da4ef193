use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use env_logger::Env;
use log::{info, warn};

use datafoot::config::Settings;
use datafoot::ranking::SortDirection;
use datafoot::reports::{self, ReportKind, ReportOptions};
use datafoot::source::{DataSource, JsonFileSource, SourceRequest};
use datafoot::store::{self, SqliteSource};
use datafoot::table::Table;
use datafoot::view::{ViewOutcome, ViewParams, apply_view};
use datafoot::{export, fake_season, schema};

const USAGE: &str = "\
usage: datafoot <command> [options]

commands:
  reports                     list the available reports
  teams                       list team names
  report <name>               run one report through the view pipeline
      --team <name>           restrict the input to one team before ranking
      --search <text>         case-insensitive search on the report's text columns
      --sort <column>         sort override
      --order asc|desc        sort direction (default desc)
      --page-size <n>         rows per page
      --page <n>              page number (clamped to the last page)
      --limit <n>             leaderboard size for player reports
      --least-carded          discipline ascending
      --csv <path>            write the filtered, sorted, unpaged table
  export                      compute every report
      --xlsx <path>           one workbook, one sheet per report
      --csv-dir <dir>         one csv file per report
  check                       list results whose outcome contradicts the score
  seed-demo                   write a synthetic season into --db
      --seed <n> --teams <n> --players <n>

global:
  --db <path>                 sqlite database (default DATAFOOT_DB)
  --snapshot <path>           read a JSON season snapshot instead of sqlite";

fn main() -> Result<()> {
    let settings = Settings::from_env();
    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_filter.as_str()))
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().cloned() else {
        println!("{USAGE}");
        return Ok(());
    };
    let args = &args[1..];

    match command.as_str() {
        "reports" => {
            for kind in ReportKind::ALL {
                println!("{:<22} {}", kind.name(), kind.title());
            }
            Ok(())
        }
        "teams" => run_teams(&settings, args),
        "report" => run_report(&settings, args),
        "export" => run_export(&settings, args),
        "check" => run_check(&settings, args),
        "seed-demo" => run_seed(&settings, args),
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    }
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_number(args: &[String], name: &str) -> Result<Option<usize>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<usize>()
                .with_context(|| format!("{name} expects a number, got {raw:?}"))
        })
        .transpose()
}

fn db_path(settings: &Settings, args: &[String]) -> Result<PathBuf> {
    arg_value(args, "--db")
        .map(PathBuf::from)
        .or_else(|| settings.db_path.clone())
        .context("unable to resolve sqlite path (set --db or DATAFOOT_DB)")
}

fn open_source(settings: &Settings, args: &[String]) -> Result<Box<dyn DataSource>> {
    if let Some(path) = arg_value(args, "--snapshot") {
        return Ok(Box::new(JsonFileSource::new(path)));
    }
    let path = db_path(settings, args)?;
    Ok(Box::new(SqliteSource::open(&path)?))
}

fn report_options(settings: &Settings, args: &[String]) -> Result<ReportOptions> {
    let limit = parse_number(args, "--limit")?.unwrap_or(settings.top_limit);
    if limit == 0 {
        bail!("--limit must be at least 1");
    }
    Ok(ReportOptions {
        limit,
        discipline_direction: if has_flag(args, "--least-carded") {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        },
    })
}

fn run_teams(settings: &Settings, args: &[String]) -> Result<()> {
    let source = open_source(settings, args)?;
    let snapshot = source.load(&SourceRequest {
        report: ReportKind::Nationalities,
        team: None,
    })?;
    for name in schema::team_names(&snapshot) {
        println!("{name}");
    }
    Ok(())
}

fn run_report(settings: &Settings, args: &[String]) -> Result<()> {
    let name = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow!("report needs a name; see `datafoot reports`"))?;
    let kind: ReportKind = name.parse()?;
    let opts = report_options(settings, args)?;
    let source = open_source(settings, args)?;
    let team = arg_value(args, "--team");

    let table = reports::compute_report(source.as_ref(), kind, team.as_deref(), &opts)?;

    let params = ViewParams {
        search: arg_value(args, "--search"),
        sort_column: arg_value(args, "--sort"),
        sort_direction: match arg_value(args, "--order") {
            Some(raw) => raw.parse()?,
            None => SortDirection::Descending,
        },
        page_size: parse_number(args, "--page-size")?.unwrap_or(settings.page_size),
        page: parse_number(args, "--page")?.unwrap_or(1),
    };
    let outcome = apply_view(&table, &params)?;

    println!("{}", kind.title());
    match &outcome {
        ViewOutcome::Empty { .. } => println!("No rows match the selected criteria."),
        ViewOutcome::Page(page) => {
            print!("{}", render_table(&page.rows));
            println!(
                "Page {}/{} ({} of {} rows)",
                page.page,
                page.total_pages,
                page.rows.len(),
                page.full.len()
            );
        }
    }

    if let Some(path) = arg_value(args, "--csv") {
        export::write_csv(&PathBuf::from(&path), outcome.full())?;
        println!("CSV: {path}");
    }
    Ok(())
}

fn run_export(settings: &Settings, args: &[String]) -> Result<()> {
    let xlsx = arg_value(args, "--xlsx");
    let csv_dir = arg_value(args, "--csv-dir");
    if xlsx.is_none() && csv_dir.is_none() {
        bail!("export needs --xlsx <path> and/or --csv-dir <dir>");
    }
    let opts = report_options(settings, args)?;
    let source = open_source(settings, args)?;
    let snapshot = source.load_all()?;

    let tables = reports::compute_all_reports(&snapshot, &opts);
    if let Some(path) = xlsx {
        let sheets: Vec<(String, &Table)> = tables
            .iter()
            .map(|(kind, table)| (kind.name().to_string(), table))
            .collect();
        export::write_workbook(&PathBuf::from(&path), &sheets)?;
        println!("Workbook: {path}");
    }
    if let Some(dir) = csv_dir {
        let written = export::write_csv_dir(&PathBuf::from(&dir), &tables)?;
        println!("CSV files: {written} in {dir}");
    }
    Ok(())
}

fn run_check(settings: &Settings, args: &[String]) -> Result<()> {
    let source = open_source(settings, args)?;
    let snapshot = source.load(&SourceRequest {
        report: ReportKind::Standings,
        team: arg_value(args, "--team"),
    })?;
    let bad = snapshot.outcome_inconsistencies();
    if bad.is_empty() {
        println!("All {} result rows are consistent.", snapshot.results.len());
        return Ok(());
    }
    for r in &bad {
        println!(
            "result {} (match {}, team {}): {}-{} recorded as {}",
            r.id, r.match_id, r.team_id, r.goals_for, r.goals_against, r.outcome
        );
    }
    warn!("{} inconsistent result rows", bad.len());
    Ok(())
}

fn run_seed(settings: &Settings, args: &[String]) -> Result<()> {
    let path = db_path(settings, args)?;
    if path.exists() {
        bail!("{} already exists; seed-demo only writes fresh databases", path.display());
    }
    let seed = parse_number(args, "--seed")?.unwrap_or(2024) as u64;
    let teams = parse_number(args, "--teams")?.unwrap_or(20);
    let players = parse_number(args, "--players")?.unwrap_or(25);

    let snapshot = fake_season::generate(seed, teams, players);
    let mut conn = store::open_db(&path)?;
    store::write_snapshot(&mut conn, &snapshot)?;
    info!(
        "seeded {} teams, {} players, {} matches",
        snapshot.teams.len(),
        snapshot.players.len(),
        snapshot.matches.len()
    );
    println!("Demo season written to {}", path.display());
    Ok(())
}

fn render_table(table: &Table) -> String {
    let header = table.column_names();
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            cells
                .iter()
                .filter_map(|r| r.get(idx))
                .map(|s| s.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    out.push_str(&line(header.clone()));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::SourceError;
use crate::reports::ReportKind;
use crate::schema::SeasonSnapshot;

/// What a report asks its data source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub report: ReportKind,
    /// Exact team-name equality, applied before aggregation.
    pub team: Option<String>,
}

/// Supplies the row sets behind a report. One call is one consistent read.
pub trait DataSource {
    /// Row sets for one report, with the team filter pushed down when given.
    fn load(&self, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError>;

    /// The whole season, unfiltered.
    fn load_all(&self) -> Result<SeasonSnapshot, SourceError>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn load(&self, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
        (**self).load(request)
    }

    fn load_all(&self) -> Result<SeasonSnapshot, SourceError> {
        (**self).load_all()
    }
}

/// Snapshot already held in memory (tests, benches, the JSON source).
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshot: SeasonSnapshot,
}

impl InMemorySource {
    pub fn new(snapshot: SeasonSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &SeasonSnapshot {
        &self.snapshot
    }
}

impl DataSource for InMemorySource {
    fn load(&self, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
        Ok(match request.team.as_deref() {
            Some(team) => self.snapshot.restricted_to_team(team),
            None => self.snapshot.clone(),
        })
    }

    fn load_all(&self) -> Result<SeasonSnapshot, SourceError> {
        Ok(self.snapshot.clone())
    }
}

/// Snapshot serialized as JSON on disk; re-read on every request.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn read_snapshot_json(path: &Path) -> Result<SeasonSnapshot, SourceError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| SourceError::Connectivity(format!("read {}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| SourceError::SchemaMismatch(format!("parse {}: {err}", path.display())))
}

impl DataSource for JsonFileSource {
    fn load(&self, request: &SourceRequest) -> Result<SeasonSnapshot, SourceError> {
        InMemorySource::new(self.load_all()?).load(request)
    }

    fn load_all(&self) -> Result<SeasonSnapshot, SourceError> {
        let snapshot = read_snapshot_json(&self.path)?;
        info!(
            "loaded snapshot {} ({} teams, {} results)",
            self.path.display(),
            snapshot.teams.len(),
            snapshot.results.len()
        );
        Ok(snapshot)
    }
}

pub mod config;
pub mod error;
pub mod export;
pub mod fake_season;
pub mod ranking;
pub mod reports;
pub mod schema;
pub mod source;
pub mod store;
pub mod table;
pub mod view;

pub use error::{DataError, SourceError};
pub use reports::{ReportKind, ReportOptions, build_report, compute_report};
pub use table::{Cell, Table};
pub use view::{ViewOutcome, ViewParams, apply_view};

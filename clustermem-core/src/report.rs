//! Rendering of aggregation results

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ClusterMemError, ClusterMemResult};
use crate::types::AggregationResult;

/// Output format of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Total reservation and total limit, one integer per line
    #[default]
    Plain,
    /// Single JSON object including the cluster name
    Json,
}

impl FromStr for ReportFormat {
    type Err = ClusterMemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(ReportFormat::Plain),
            "json" => Ok(ReportFormat::Json),
            other => Err(ClusterMemError::invalid_input(
                "format",
                format!("unknown report format '{}', expected 'plain' or 'json'", other),
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Plain => write!(f, "plain"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    cluster: &'a str,
    total_reservation_mb: i64,
    total_limit_mb: i64,
}

/// Render the two totals: reservation on the first line, limit on the second
pub fn report(result: &AggregationResult) -> String {
    format!("{}\n{}\n", result.total_reservation, result.total_limit)
}

/// Render a result in the requested format
pub fn render(
    cluster_name: &str,
    result: &AggregationResult,
    format: ReportFormat,
) -> ClusterMemResult<String> {
    match format {
        ReportFormat::Plain => Ok(report(result)),
        ReportFormat::Json => {
            let body = serde_json::to_string(&JsonReport {
                cluster: cluster_name,
                total_reservation_mb: result.total_reservation,
                total_limit_mb: result.total_limit,
            })?;
            Ok(format!("{}\n", body))
        }
    }
}

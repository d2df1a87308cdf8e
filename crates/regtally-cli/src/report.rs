//! Report writers: CSV, JSON, and a human-readable summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use regtally_core::{DocumentCount, RunSummary};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

const TOP_AGENCIES: usize = 10;
const LISTED_FAILURES: usize = 5;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialise JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes run reports into one output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    agency_name: &'a str,
    agency_slug: &'a str,
    cfr_citation: &'a str,
    parent_agency: &'a str,
    active: bool,
    document_count: u64,
    query_successful: bool,
    error_message: String,
    observed_at: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: JsonMetadata,
    summary: String,
    agencies: Vec<JsonRecord<'a>>,
}

#[derive(Serialize)]
struct JsonMetadata {
    generated_at: String,
    total_agencies: usize,
    succeeded: usize,
    failed: usize,
    with_documents: usize,
    without_documents: usize,
    total_documents: u64,
    success_rate_percent: f64,
    elapsed_seconds: f64,
    finished_at: String,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    agency: &'a regtally_core::Agency,
    document_count: u64,
    query_successful: bool,
    error_message: Option<&'a str>,
    observed_at: String,
}

impl ReportWriter {
    /// Create the writer, making the output directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Write the per-agency records as CSV. Returns the file path.
    pub fn write_csv(
        &self,
        summary: &RunSummary,
        filename: Option<&str>,
    ) -> Result<PathBuf, ReportError> {
        let path = self.report_path(filename, "csv");
        let mut writer = csv::Writer::from_path(&path)?;

        for record in &summary.records {
            writer.serialize(CsvRow {
                agency_name: &record.agency.name,
                agency_slug: &record.agency.slug,
                cfr_citation: &record.agency.cfr_citation,
                parent_agency: &record.agency.parent_agency,
                active: record.agency.active,
                document_count: record.count(),
                query_successful: record.succeeded(),
                error_message: clean_field(record.error().unwrap_or_default()),
                observed_at: record.observed_at.to_rfc3339(),
            })?;
        }
        writer.flush()?;

        info!(path = %path.display(), "CSV report written");
        Ok(path)
    }

    /// Write the full results as JSON with a metadata block.
    pub fn write_json(
        &self,
        summary: &RunSummary,
        filename: Option<&str>,
    ) -> Result<PathBuf, ReportError> {
        let path = self.report_path(filename, "json");

        let report = JsonReport {
            metadata: JsonMetadata {
                generated_at: Utc::now().to_rfc3339(),
                total_agencies: summary.total,
                succeeded: summary.succeeded,
                failed: summary.failed,
                with_documents: summary.with_documents,
                without_documents: summary.without_documents,
                total_documents: summary.total_documents,
                success_rate_percent: summary.success_rate(),
                elapsed_seconds: summary.elapsed_seconds,
                finished_at: summary.finished_at.to_rfc3339(),
            },
            summary: summary.overview(),
            agencies: summary
                .records
                .iter()
                .map(|record| JsonRecord {
                    agency: &record.agency,
                    document_count: record.count(),
                    query_successful: record.succeeded(),
                    error_message: record.error(),
                    observed_at: record.observed_at.to_rfc3339(),
                })
                .collect(),
        };

        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        info!(path = %path.display(), "JSON report written");
        Ok(path)
    }

    /// Write the human-readable summary report.
    pub fn write_summary(
        &self,
        summary: &RunSummary,
        filename: Option<&str>,
    ) -> Result<PathBuf, ReportError> {
        let path = self.report_path(filename, "txt");
        fs::write(&path, summary_text(summary))?;
        info!(path = %path.display(), "summary report written");
        Ok(path)
    }

    fn report_path(&self, filename: Option<&str>, extension: &str) -> PathBuf {
        match filename {
            Some(name) => self.output_dir.join(name),
            None => self
                .output_dir
                .join(format!("{}.{extension}", default_base_name())),
        }
    }
}

pub fn default_base_name() -> String {
    format!(
        "agency_document_counts_{}",
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

/// Strip null bytes and collapse line breaks and runs of whitespace, so
/// free-text fields stay on one CSV row.
fn clean_field(value: &str) -> String {
    value
        .replace('\u{0}', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary_text(summary: &RunSummary) -> String {
    let mut lines: Vec<String> = Vec::new();
    let rule = "=".repeat(72);
    let dash = "-".repeat(40);

    lines.push(rule.clone());
    lines.push("AGENCY DOCUMENT COUNTS - SUMMARY REPORT".to_string());
    lines.push(rule.clone());
    lines.push(format!(
        "Finished: {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(String::new());

    lines.push("OVERALL".to_string());
    lines.push(dash.clone());
    lines.push(format!("Total agencies processed: {}", summary.total));
    lines.push(format!("Successful queries: {}", summary.succeeded));
    lines.push(format!("Failed queries: {}", summary.failed));
    lines.push(format!("Success rate: {:.1}%", summary.success_rate()));
    lines.push(format!("Execution time: {:.1} seconds", summary.elapsed_seconds));
    lines.push(String::new());

    lines.push("DOCUMENTS".to_string());
    lines.push(dash.clone());
    lines.push(format!("Agencies with documents: {}", summary.with_documents));
    lines.push(format!(
        "Agencies without documents: {}",
        summary.without_documents
    ));
    lines.push(format!("Total documents found: {}", summary.total_documents));
    if summary.with_documents > 0 {
        lines.push(format!(
            "Average documents per agency (with docs): {:.1}",
            summary.total_documents as f64 / summary.with_documents as f64
        ));
    }
    lines.push(String::new());

    let mut counted: Vec<&DocumentCount> = summary
        .records
        .iter()
        .filter(|r| r.succeeded() && r.count() > 0)
        .collect();
    if !counted.is_empty() {
        counted.sort_by(|a, b| b.count().cmp(&a.count()));
        lines.push(format!("TOP {} AGENCIES BY DOCUMENT COUNT", TOP_AGENCIES));
        lines.push(dash.clone());
        for (rank, record) in counted.iter().take(TOP_AGENCIES).enumerate() {
            lines.push(format!(
                "{:2}. {}: {} documents",
                rank + 1,
                record.agency.name,
                record.count()
            ));
        }
        lines.push(String::new());
    }

    let failed: Vec<&DocumentCount> = summary.records.iter().filter(|r| !r.succeeded()).collect();
    if !failed.is_empty() {
        lines.push("FAILED QUERIES".to_string());
        lines.push(dash.clone());
        lines.push(format!("Total failed: {}", failed.len()));

        let mut by_error: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for record in &failed {
            by_error
                .entry(record.error().unwrap_or("unknown error"))
                .or_default()
                .push(record.agency.name.as_str());
        }
        for (error, mut names) in by_error {
            names.sort_unstable();
            lines.push(String::new());
            lines.push(format!("Error: {error}"));
            lines.push(format!("Affected agencies ({}):", names.len()));
            for name in names.iter().take(LISTED_FAILURES) {
                lines.push(format!("  - {name}"));
            }
            if names.len() > LISTED_FAILURES {
                lines.push(format!("  ... and {} more", names.len() - LISTED_FAILURES));
            }
        }
        lines.push(String::new());
    }

    let mut zero_docs: Vec<&DocumentCount> = summary
        .records
        .iter()
        .filter(|r| r.succeeded() && r.count() == 0)
        .collect();
    if !zero_docs.is_empty() {
        zero_docs.sort_by(|a, b| a.agency.name.cmp(&b.agency.name));
        lines.push("AGENCIES WITH ZERO DOCUMENTS".to_string());
        lines.push(dash.clone());
        lines.push(format!("Total: {}", zero_docs.len()));
        for record in zero_docs.iter().take(TOP_AGENCIES) {
            lines.push(format!("  - {}", record.agency.name));
        }
        if zero_docs.len() > TOP_AGENCIES {
            lines.push(format!("  ... and {} more", zero_docs.len() - TOP_AGENCIES));
        }
        lines.push(String::new());
    }

    lines.push(rule);
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regtally_core::Agency;

    fn agency(name: &str, slug: &str) -> Agency {
        Agency::new(name, slug, "1 CFR", "", true, "").unwrap()
    }

    fn sample_summary() -> RunSummary {
        let now = Utc::now();
        let records = vec![
            DocumentCount::counted(agency("Environmental Protection Agency", "epa"), 120, now),
            DocumentCount::counted(agency("Quiet Commission", "quiet-commission"), 0, now),
            DocumentCount::failed(
                agency("Ghost Board", "ghost-board"),
                "agency not found in Federal Register API",
                now,
            ),
        ];
        RunSummary::from_records(records, 2.5, now)
    }

    #[test]
    fn csv_report_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let path = writer.write_csv(&sample_summary(), Some("counts.csv")).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert!(headers.iter().any(|h| h == "agency_slug"));
        assert!(headers.iter().any(|h| h == "document_count"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "epa");
        assert_eq!(&rows[0][5], "120");
        assert_eq!(&rows[2][6], "false");
    }

    #[test]
    fn json_report_contains_metadata_and_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let path = writer.write_json(&sample_summary(), Some("counts.json")).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["total_agencies"], 3);
        assert_eq!(value["metadata"]["succeeded"], 2);
        assert_eq!(value["metadata"]["total_documents"], 120);
        assert_eq!(value["agencies"].as_array().unwrap().len(), 3);
        assert_eq!(value["agencies"][0]["agency"]["slug"], "epa");
        assert_eq!(value["agencies"][2]["query_successful"], false);
    }

    #[test]
    fn summary_report_sections() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let path = writer
            .write_summary(&sample_summary(), Some("summary.txt"))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Total agencies processed: 3"));
        assert!(text.contains("TOP 10 AGENCIES BY DOCUMENT COUNT"));
        assert!(text.contains("Environmental Protection Agency: 120 documents"));
        assert!(text.contains("FAILED QUERIES"));
        assert!(text.contains("agency not found"));
        assert!(text.contains("AGENCIES WITH ZERO DOCUMENTS"));
        assert!(text.contains("Quiet Commission"));
    }

    #[test]
    fn default_base_name_is_timestamped() {
        let name = default_base_name();
        assert!(name.starts_with("agency_document_counts_"));
        assert_eq!(name.len(), "agency_document_counts_".len() + 15);
    }

    #[test]
    fn clean_field_flattens_whitespace() {
        assert_eq!(clean_field("a\nb\r\n  c"), "a b c");
        assert_eq!(clean_field("plain"), "plain");
        assert_eq!(clean_field(""), "");
    }
}

//! Agency CSV loading and filtering.
//!
//! Reads the Federal Register agencies CSV, derives each agency's slug
//! from its name, and skips malformed rows with a warning instead of
//! failing the whole load.

use std::path::{Path, PathBuf};

use regtally_core::{Agency, slugify};
use thiserror::Error;
use tracing::{info, warn};

const REQUIRED_COLUMNS: &[&str] = &[
    "agency_name",
    "active",
    "cfr_citation",
    "parent_agency_name",
    "description",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("agencies file not found: {0}")]
    NotFound(PathBuf),
    #[error("missing required columns in CSV: {0}")]
    MissingColumns(String),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Load agencies from a CSV file.
///
/// Rows with an empty name, an unparsable active flag, or an empty
/// derived slug are skipped with a warning.
pub fn load_agencies(path: &Path) -> Result<Vec<Agency>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    info!(path = %path.display(), "loading agencies");

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| column(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing.join(", ")));
    }

    let name_idx = column("agency_name").unwrap();
    let active_idx = column("active").unwrap();
    let cfr_idx = column("cfr_citation").unwrap();
    let parent_idx = column("parent_agency_name").unwrap();
    let description_idx = column("description").unwrap();

    let mut agencies = Vec::new();
    for (row_number, record) in reader.records().enumerate() {
        // Row 1 is the header line.
        let row_number = row_number + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(row = row_number, error = %err, "skipping unreadable row");
                continue;
            }
        };

        let field = |idx: usize| record.get(idx).unwrap_or_default().trim();

        let name = field(name_idx);
        if name.is_empty() {
            warn!(row = row_number, "skipping row with empty agency name");
            continue;
        }

        let active = match field(active_idx) {
            "1" => true,
            "0" => false,
            other => {
                warn!(row = row_number, active = %other, "skipping row with invalid active flag");
                continue;
            }
        };

        match Agency::new(
            name,
            slugify(name),
            field(cfr_idx),
            field(parent_idx),
            active,
            field(description_idx),
        ) {
            Ok(agency) => agencies.push(agency),
            Err(err) => {
                warn!(row = row_number, error = %err, "skipping invalid row");
            }
        }
    }

    info!(agencies = agencies.len(), "loaded agencies from CSV");
    Ok(agencies)
}

/// Keep only agencies that carry a CFR citation.
pub fn with_cfr_citation(agencies: Vec<Agency>) -> Vec<Agency> {
    let filtered: Vec<Agency> = agencies.into_iter().filter(Agency::has_cfr_citation).collect();
    info!(agencies = filtered.len(), "filtered to agencies with CFR citations");
    filtered
}

/// Keep only active agencies.
pub fn active_only(agencies: Vec<Agency>) -> Vec<Agency> {
    let filtered: Vec<Agency> = agencies.into_iter().filter(|a| a.active).collect();
    info!(agencies = filtered.len(), "filtered to active agencies");
    filtered
}

/// Headline statistics over a loaded agency list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AgencyStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub with_cfr: usize,
    pub without_cfr: usize,
    pub with_parent: usize,
}

impl AgencyStats {
    pub fn collect(agencies: &[Agency]) -> Self {
        let mut stats = Self {
            total: agencies.len(),
            ..Self::default()
        };
        for agency in agencies {
            if agency.active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            if agency.has_cfr_citation() {
                stats.with_cfr += 1;
            } else {
                stats.without_cfr += 1;
            }
            if !agency.parent_agency.is_empty() {
                stats.with_parent += 1;
            }
        }
        stats
    }
}

//! Agency records shared read-only across the fetcher and reconciler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgencyError {
    #[error("agency name is required")]
    EmptyName,
    #[error("agency slug is required for {0}")]
    EmptySlug(String),
}

/// A federal regulatory agency, identified by its stable slug.
///
/// Built once per run from the agencies CSV and never mutated; the slug
/// is the join key against the API's per-agency document counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    pub slug: String,
    pub cfr_citation: String,
    pub parent_agency: String,
    pub active: bool,
    pub description: String,
}

impl Agency {
    /// Build an agency record. Name and slug must be non-empty.
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        cfr_citation: impl Into<String>,
        parent_agency: impl Into<String>,
        active: bool,
        description: impl Into<String>,
    ) -> Result<Self, AgencyError> {
        let name = name.into();
        let slug = slug.into();
        if name.is_empty() {
            return Err(AgencyError::EmptyName);
        }
        if slug.is_empty() {
            return Err(AgencyError::EmptySlug(name));
        }
        Ok(Self {
            name,
            slug,
            cfr_citation: cfr_citation.into(),
            parent_agency: parent_agency.into(),
            active,
            description: description.into(),
        })
    }

    /// Whether this agency carries a CFR citation.
    pub fn has_cfr_citation(&self) -> bool {
        !self.cfr_citation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_agency() {
        let agency = Agency::new(
            "Environmental Protection Agency",
            "environmental-protection-agency",
            "40 CFR",
            "",
            true,
            "",
        )
        .unwrap();
        assert_eq!(agency.slug, "environmental-protection-agency");
        assert!(agency.has_cfr_citation());
    }

    #[test]
    fn empty_name_rejected() {
        let result = Agency::new("", "some-slug", "", "", true, "");
        assert!(matches!(result, Err(AgencyError::EmptyName)));
    }

    #[test]
    fn empty_slug_rejected() {
        let result = Agency::new("Some Agency", "", "", "", true, "");
        assert!(matches!(result, Err(AgencyError::EmptySlug(name)) if name == "Some Agency"));
    }

    #[test]
    fn agency_json_roundtrip() {
        let agency = Agency::new(
            "Federal Aviation Administration",
            "federal-aviation-administration",
            "14 CFR",
            "Department of Transportation",
            true,
            "Regulates civil aviation.",
        )
        .unwrap();
        let json = serde_json::to_string(&agency).unwrap();
        let parsed: Agency = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.slug, "federal-aviation-administration");
        assert_eq!(parsed.parent_agency, "Department of Transportation");
        assert!(parsed.active);
    }
}

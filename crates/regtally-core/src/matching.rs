//! Matching views between the local agency list and the API count map.
//!
//! These are pure set operations over `(agencies, counts)` — they never
//! touch the network and never fail. Validation collects every issue it
//! can find rather than stopping at the first; the caller decides whether
//! any of them are fatal.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::Agency;

/// Agency slug → document count, as translated from the facet endpoint.
pub type CountMap = BTreeMap<String, i64>;

/// Slugs present in the agency list but absent from the count map.
pub fn missing_from_api(agencies: &[Agency], counts: &CountMap) -> BTreeSet<String> {
    agencies
        .iter()
        .filter(|a| !counts.contains_key(&a.slug))
        .map(|a| a.slug.clone())
        .collect()
}

/// Slugs present in the count map but absent from the agency list.
pub fn extra_in_api(agencies: &[Agency], counts: &CountMap) -> BTreeSet<String> {
    let known: BTreeSet<&str> = agencies.iter().map(|a| a.slug.as_str()).collect();
    counts
        .keys()
        .filter(|slug| !known.contains(slug.as_str()))
        .cloned()
        .collect()
}

/// Advisory validation of the agency list against a count map.
///
/// Reports duplicate slugs (one issue per duplicated slug), negative
/// counts, and agencies with empty slugs. An empty result means the
/// matching is clean.
pub fn validate_matching(agencies: &[Agency], counts: &CountMap) -> Vec<String> {
    let mut issues = Vec::new();

    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    for agency in agencies {
        if !seen.insert(agency.slug.as_str()) {
            duplicated.insert(agency.slug.as_str());
        }
    }
    for slug in duplicated {
        issues.push(format!("duplicate agency slug: {slug}"));
    }

    for (slug, count) in counts {
        if *count < 0 {
            issues.push(format!("invalid document count for {slug}: {count}"));
        }
    }

    for agency in agencies {
        if agency.slug.is_empty() {
            issues.push(format!("agency with empty slug: {}", agency.name));
        }
    }

    issues
}

/// Comprehensive coverage mapping between the agency list and the API.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    /// Slug → count for agencies found in the map.
    pub matched: BTreeMap<String, i64>,
    /// Slugs of listed agencies the map does not mention, in input order.
    pub unmatched: Vec<String>,
    pub missing_from_api: BTreeSet<String>,
    pub extra_in_api: BTreeSet<String>,
    pub total_agencies: usize,
    pub total_in_api: usize,
    pub total_documents: i64,
}

impl Coverage {
    pub fn build(agencies: &[Agency], counts: &CountMap) -> Self {
        let mut matched = BTreeMap::new();
        let mut unmatched = Vec::new();
        for agency in agencies {
            match counts.get(&agency.slug) {
                Some(&count) => {
                    matched.insert(agency.slug.clone(), count);
                }
                None => unmatched.push(agency.slug.clone()),
            }
        }

        Self {
            matched,
            unmatched,
            missing_from_api: missing_from_api(agencies, counts),
            extra_in_api: extra_in_api(agencies, counts),
            total_agencies: agencies.len(),
            total_in_api: counts.len(),
            total_documents: counts.values().sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agency(slug: &str) -> Agency {
        Agency::new(slug.to_uppercase(), slug, "", "", true, "").unwrap()
    }

    fn counts(entries: &[(&str, i64)]) -> CountMap {
        entries
            .iter()
            .map(|(slug, count)| (slug.to_string(), *count))
            .collect()
    }

    #[test]
    fn missing_is_list_minus_map() {
        let agencies = vec![agency("a"), agency("b")];
        let map = counts(&[("a", 1)]);
        let missing = missing_from_api(&agencies, &map);
        assert_eq!(missing, BTreeSet::from(["b".to_string()]));
    }

    #[test]
    fn extra_is_map_minus_list() {
        let agencies = vec![agency("a")];
        let map = counts(&[("a", 1), ("c", 2)]);
        let extra = extra_in_api(&agencies, &map);
        assert_eq!(extra, BTreeSet::from(["c".to_string()]));
    }

    #[test]
    fn clean_matching_has_no_issues() {
        let agencies = vec![agency("a"), agency("b")];
        let map = counts(&[("a", 1), ("b", 0)]);
        assert!(validate_matching(&agencies, &map).is_empty());
    }

    #[test]
    fn duplicate_slug_reported_once() {
        let agencies = vec![agency("x"), agency("y"), agency("x"), agency("x")];
        let issues = validate_matching(&agencies, &CountMap::new());
        let duplicate_issues: Vec<_> = issues.iter().filter(|i| i.contains("duplicate")).collect();
        assert_eq!(duplicate_issues.len(), 1);
        assert!(duplicate_issues[0].contains("x"));
    }

    #[test]
    fn negative_count_reported() {
        let issues = validate_matching(&[agency("a")], &counts(&[("a", -3)]));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("invalid document count for a: -3"));
    }

    #[test]
    fn validation_collects_all_issues() {
        let agencies = vec![agency("x"), agency("x")];
        let map = counts(&[("bad", -1)]);
        let issues = validate_matching(&agencies, &map);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn coverage_partitions_agencies() {
        let agencies = vec![agency("a"), agency("b")];
        let map = counts(&[("a", 10), ("c", 5)]);
        let coverage = Coverage::build(&agencies, &map);

        assert_eq!(coverage.matched.get("a"), Some(&10));
        assert_eq!(coverage.unmatched, vec!["b".to_string()]);
        assert_eq!(coverage.missing_from_api, BTreeSet::from(["b".to_string()]));
        assert_eq!(coverage.extra_in_api, BTreeSet::from(["c".to_string()]));
        assert_eq!(coverage.total_agencies, 2);
        assert_eq!(coverage.total_in_api, 2);
        assert_eq!(coverage.total_documents, 15);
    }
}

//! Slug normalisation for agency names.
//!
//! The Federal Register keys its per-agency facets by slug, so the local
//! agency list must derive slugs the same way: lowercase, with every run
//! of non-alphanumeric characters collapsed to a single hyphen and no
//! leading or trailing hyphens.

/// Normalise an agency name into its API slug.
///
/// "Department of the Interior" → "department-of-the-interior"
/// "U.S. Customs & Border Protection" → "u-s-customs-border-protection"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        assert_eq!(slugify("Department of Energy"), "department-of-energy");
    }

    #[test]
    fn punctuation_collapsed() {
        assert_eq!(
            slugify("U.S. Customs & Border Protection"),
            "u-s-customs-border-protection"
        );
    }

    #[test]
    fn leading_and_trailing_junk_trimmed() {
        assert_eq!(slugify("  Office of (the) Secretary  "), "office-of-the-secretary");
        assert_eq!(slugify("--already-hyphenated--"), "already-hyphenated");
    }

    #[test]
    fn consecutive_separators_become_one_hyphen() {
        assert_eq!(slugify("A  --  B"), "a-b");
    }

    #[test]
    fn digits_preserved() {
        assert_eq!(slugify("Title 21 Review Board"), "title-21-review-board");
    }

    #[test]
    fn already_lowercase_slug_unchanged() {
        assert_eq!(slugify("federal-aviation-administration"), "federal-aviation-administration");
    }

    #[test]
    fn empty_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}

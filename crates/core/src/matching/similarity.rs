//! Edit-distance similarity between normalized text spans and catalog
//! entries, scaled to [0, 100].

use crate::domain::catalog::CatalogEntry;
use crate::matching::normalize::normalize;

/// Normalized Levenshtein similarity on already-normalized text, in [0, 100].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// A catalog entry with its comparison strings pre-normalized, so one parse
/// call normalizes the catalog once instead of per span.
#[derive(Clone, Debug)]
pub struct IndexedEntry<'a> {
    pub entry: &'a CatalogEntry,
    normalized_name: String,
    normalized_aliases: Vec<String>,
}

impl<'a> IndexedEntry<'a> {
    pub fn new(entry: &'a CatalogEntry) -> Self {
        Self {
            normalized_name: normalize(&entry.canonical_name),
            normalized_aliases: entry.aliases.iter().map(|alias| normalize(alias)).collect(),
            entry,
        }
    }

    /// Best score of `span` against the canonical name and every alias.
    pub fn best_score(&self, span: &str) -> f64 {
        let name_score = similarity(span, &self.normalized_name);
        self.normalized_aliases
            .iter()
            .map(|alias| similarity(span, alias))
            .fold(name_score, f64::max)
    }
}

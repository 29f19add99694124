use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One sellable product as cached for matching and recommendation.
///
/// `canonical_name` is unique within a branch snapshot; aliases may overlap
/// across entries (ambiguity is resolved by best similarity score).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub canonical_name: String,
    pub category: String,
    pub unit_price: Decimal,
    pub aliases: Vec<String>,
}

/// A branch's catalog at one publication point. Insertion order is
/// preserved and used as the deterministic tie-breaker everywhere entries
/// are scored against each other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            snapshot.push(entry);
        }
        snapshot
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends an entry unless its canonical name is already present
    /// (first publication wins, keeping the uniqueness invariant).
    pub fn push(&mut self, entry: CatalogEntry) {
        let duplicate = self
            .entries
            .iter()
            .any(|existing| existing.canonical_name.eq_ignore_ascii_case(&entry.canonical_name));
        if !duplicate {
            self.entries.push(entry);
        }
    }

    /// Rebuilds a snapshot from the plain-text form a branch publishes.
    ///
    /// Line format:
    /// ```text
    /// Bebidas:
    /// Cappuccino - 3.50 | aka capuchino, capu
    /// Croissant - 2.25 | aka croisant
    /// ```
    /// `Name:` lines set the current category; `Name - price` lines add an
    /// entry, with an optional `| aka a, b` alias suffix. Malformed lines
    /// and negative prices are skipped.
    pub fn parse_text(text: &str) -> Self {
        let mut snapshot = Self::default();
        let mut current_category = String::from("general");

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_suffix(':') {
                if !header.is_empty() && !header.contains('-') {
                    current_category = header.trim().to_lowercase();
                    continue;
                }
            }

            let (item_part, alias_part) = match line.split_once('|') {
                Some((item, aliases)) => (item.trim(), Some(aliases.trim())),
                None => (line, None),
            };

            let Some((name, price_raw)) = item_part.rsplit_once(" - ") else {
                continue;
            };
            let name = name.trim();
            let price_raw = price_raw.trim().trim_start_matches('$');
            if name.is_empty() {
                continue;
            }
            let Ok(unit_price) = price_raw.parse::<Decimal>() else {
                continue;
            };
            if unit_price < Decimal::ZERO {
                continue;
            }

            let aliases = alias_part
                .and_then(|part| part.strip_prefix("aka"))
                .map(|names| {
                    names
                        .split(',')
                        .map(|alias| alias.trim().to_string())
                        .filter(|alias| !alias.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            snapshot.push(CatalogEntry {
                canonical_name: name.to_string(),
                category: current_category.clone(),
                unit_price,
                aliases,
            });
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogEntry, CatalogSnapshot};

    #[test]
    fn parses_published_catalog_text_with_categories_and_aliases() {
        let snapshot = CatalogSnapshot::parse_text(
            "# carta vigente\n\
             Bebidas:\n\
             Cappuccino - 3.50 | aka capuchino, capu\n\
             Jugo de Naranja - 2.80\n\
             Panaderia:\n\
             Croissant - 2.25 | aka croisant\n",
        );

        assert_eq!(snapshot.len(), 3);
        let cappuccino = &snapshot.entries()[0];
        assert_eq!(cappuccino.canonical_name, "Cappuccino");
        assert_eq!(cappuccino.category, "bebidas");
        assert_eq!(cappuccino.unit_price, Decimal::new(350, 2));
        assert_eq!(cappuccino.aliases, vec!["capuchino".to_string(), "capu".to_string()]);
        assert_eq!(snapshot.entries()[2].category, "panaderia");
    }

    #[test]
    fn skips_malformed_lines_and_negative_prices() {
        let snapshot = CatalogSnapshot::parse_text(
            "Cappuccino - 3.50\n\
             just some chatter without a price\n\
             Ghost Item - -4.00\n\
             Croissant - not-a-number\n",
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.entries()[0].canonical_name, "Cappuccino");
    }

    #[test]
    fn duplicate_canonical_names_keep_the_first_publication() {
        let mut snapshot = CatalogSnapshot::default();
        snapshot.push(CatalogEntry {
            canonical_name: "Latte".to_string(),
            category: "bebidas".to_string(),
            unit_price: Decimal::new(300, 2),
            aliases: Vec::new(),
        });
        snapshot.push(CatalogEntry {
            canonical_name: "latte".to_string(),
            category: "bebidas".to_string(),
            unit_price: Decimal::new(999, 2),
            aliases: Vec::new(),
        });

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.entries()[0].unit_price, Decimal::new(300, 2));
    }

    #[test]
    fn empty_text_yields_an_empty_snapshot() {
        assert!(CatalogSnapshot::parse_text("").is_empty());
    }
}

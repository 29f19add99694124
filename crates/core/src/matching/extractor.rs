//! Free-text order extraction: scans a message for quantity+product
//! mentions and resolves them to catalog lines.

use rust_decimal::Decimal;

use crate::domain::catalog::CatalogSnapshot;
use crate::domain::order::{OrderDraft, OrderLine};
use crate::matching::normalize::tokenize;
use crate::matching::similarity::IndexedEntry;

/// Minimum similarity score for a span to be accepted as a product mention.
pub const MATCH_THRESHOLD: f64 = 50.0;

/// Product names in the catalogs this serves run one to three words.
const MAX_SPAN_TOKENS: usize = 3;

/// Spans shorter than this many characters are never candidates; it keeps
/// ubiquitous two-letter particles ("la", "de", "un") from grazing the
/// threshold against short product names.
const MIN_SPAN_CHARS: usize = 3;

/// Extracts an order draft from free text.
///
/// Candidate spans are 1..=3 consecutive tokens scanned left to right;
/// quantity tokens delimit mentions and are never part of a span. For each
/// start position the highest-scoring (span, entry) pair at or above the
/// threshold wins, preferring shorter spans and then catalog insertion
/// order on ties. A quantity token directly before an accepted span sets
/// the line quantity; repeated mentions of one canonical product accumulate
/// into a single line. No accepted span at all yields an empty draft, not
/// an error.
pub fn extract_order(
    free_text: &str,
    catalog: &CatalogSnapshot,
    delivery_fee: Decimal,
) -> OrderDraft {
    let tokens = tokenize(free_text);
    let indexed: Vec<IndexedEntry<'_>> =
        catalog.entries().iter().map(IndexedEntry::new).collect();

    // (entry index, accumulated quantity) in first-mention order.
    let mut mentions: Vec<(usize, u32)> = Vec::new();

    let mut position = 0;
    while position < tokens.len() {
        if parse_quantity(&tokens[position]).is_some() {
            position += 1;
            continue;
        }

        match best_match(&tokens, position, &indexed) {
            Some((span_len, entry_index)) => {
                let quantity = position
                    .checked_sub(1)
                    .and_then(|previous| parse_quantity(&tokens[previous]))
                    .unwrap_or(1);

                match mentions.iter_mut().find(|(index, _)| *index == entry_index) {
                    Some((_, accumulated)) => *accumulated += quantity.max(1),
                    None => mentions.push((entry_index, quantity.max(1))),
                }
                position += span_len;
            }
            None => position += 1,
        }
    }

    let lines = mentions
        .into_iter()
        .map(|(entry_index, quantity)| {
            let entry = &catalog.entries()[entry_index];
            OrderLine::new(entry.canonical_name.clone(), entry.unit_price, quantity)
        })
        .collect();

    OrderDraft::from_lines(lines, delivery_fee)
}

/// Best accepted (span length, entry index) starting at `start`, or `None`
/// when nothing clears the threshold.
fn best_match(
    tokens: &[String],
    start: usize,
    indexed: &[IndexedEntry<'_>],
) -> Option<(usize, usize)> {
    let mut best: Option<(f64, usize, usize)> = None;

    for span_len in 1..=MAX_SPAN_TOKENS {
        let end = start + span_len;
        if end > tokens.len() {
            break;
        }
        // A quantity token starts the next mention; spans never cross it.
        if span_len > 1 && parse_quantity(&tokens[end - 1]).is_some() {
            break;
        }

        let span = tokens[start..end].join(" ");
        if span.chars().count() < MIN_SPAN_CHARS {
            continue;
        }
        for (entry_index, entry) in indexed.iter().enumerate() {
            let score = entry.best_score(&span);
            if score < MATCH_THRESHOLD {
                continue;
            }
            let improves = match best {
                None => true,
                Some((best_score, best_len, best_index)) => {
                    score > best_score
                        || (score == best_score
                            && (span_len < best_len
                                || (span_len == best_len && entry_index < best_index)))
                }
            };
            if improves {
                best = Some((score, span_len, entry_index));
            }
        }
    }

    best.map(|(_, span_len, entry_index)| (span_len, entry_index))
}

fn parse_quantity(token: &str) -> Option<u32> {
    token.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::catalog::{CatalogEntry, CatalogSnapshot};

    use super::{extract_order, MATCH_THRESHOLD};

    fn entry(name: &str, price_cents: i64, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            canonical_name: name.to_string(),
            category: "general".to_string(),
            unit_price: Decimal::new(price_cents, 2),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
        }
    }

    fn catalog_fixture() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            entry("Cappuccino", 350, &["capuchino"]),
            entry("Croissant", 225, &["croisant"]),
            entry("Jugo de Naranja", 280, &["naranjada"]),
            entry("Empanada", 180, &[]),
        ])
    }

    #[test]
    fn extracts_quantities_and_two_lines_from_noisy_spanish() {
        let draft = extract_order(
            "quiero 2 cappuccino y 1 croisant",
            &catalog_fixture(),
            Decimal::ZERO,
        );

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].product_name, "Cappuccino");
        assert_eq!(draft.lines[0].quantity, 2);
        assert_eq!(draft.lines[1].product_name, "Croissant");
        assert_eq!(draft.lines[1].quantity, 1);
        assert_eq!(draft.subtotal, draft.lines[0].line_total + draft.lines[1].line_total);
    }

    #[test]
    fn quantity_defaults_to_one_without_a_leading_integer() {
        let draft = extract_order("un capuchino por favor", &catalog_fixture(), Decimal::ZERO);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_name, "Cappuccino");
        assert_eq!(draft.lines[0].quantity, 1);
    }

    #[test]
    fn multiword_names_consume_their_whole_span() {
        let draft =
            extract_order("quiero 2 jugos de naranja", &catalog_fixture(), Decimal::ZERO);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_name, "Jugo de Naranja");
        assert_eq!(draft.lines[0].quantity, 2);
    }

    #[test]
    fn repeated_mentions_accumulate_into_one_line() {
        let draft =
            extract_order("2 empanadas y 1 empanada mas", &catalog_fixture(), Decimal::ZERO);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_name, "Empanada");
        assert_eq!(draft.lines[0].quantity, 3);
    }

    #[test]
    fn typo_noise_within_one_edit_still_matches() {
        for text in ["cappucino", "croissantt", "capuchino!"] {
            let draft = extract_order(text, &catalog_fixture(), Decimal::ZERO);
            assert_eq!(draft.lines.len(), 1, "expected a match for {text}");
        }
    }

    #[test]
    fn short_particles_never_graze_the_threshold() {
        // "la" sits exactly at score 50 against a four-letter name; the
        // minimum span length keeps it out.
        let catalog = CatalogSnapshot::new(vec![entry("Latte", 320, &[])]);
        let draft = extract_order("gracias por la informacion", &catalog, Decimal::ZERO);
        assert!(draft.is_empty());
    }

    #[test]
    fn unrelated_text_returns_an_empty_draft() {
        let draft = extract_order("hola buen dia gracias", &catalog_fixture(), Decimal::new(150, 2));
        assert!(draft.is_empty());
        assert_eq!(draft.total, Decimal::ZERO);
    }

    #[test]
    fn overlapping_aliases_resolve_by_insertion_order() {
        let catalog = CatalogSnapshot::new(vec![
            entry("Torta de Chocolate", 1200, &["torta"]),
            entry("Torta Helada", 1400, &["torta"]),
        ]);
        let draft = extract_order("una torta", &catalog, Decimal::ZERO);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_name, "Torta de Chocolate");
    }

    #[test]
    fn delivery_fee_is_added_to_the_total() {
        let draft =
            extract_order("1 croissant", &catalog_fixture(), Decimal::new(150, 2));
        assert_eq!(draft.subtotal, Decimal::new(225, 2));
        assert_eq!(draft.total, Decimal::new(375, 2));
    }

    #[test]
    fn threshold_is_the_documented_source_value() {
        assert_eq!(MATCH_THRESHOLD, 50.0);
    }
}

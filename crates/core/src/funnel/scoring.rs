//! Weighted-match scoring of catalog entries against the five collected
//! interview answers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogEntry, CatalogSnapshot};
use crate::errors::EngineError;
use crate::matching::normalize::normalize;

/// Minimum total score an entry must reach to be recommended at all.
pub const RELEVANCE_FLOOR: f64 = 0.35;

/// How many runner-ups accompany the main recommendation.
const MAX_ALTERNATIVES: usize = 2;

/// Weights for the five interview dimensions, in step order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub budget: f64,
    pub meal_type: f64,
    pub dietary: f64,
    pub cuisine: f64,
    pub occasion: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { budget: 0.30, meal_type: 0.25, dietary: 0.20, cuisine: 0.15, occasion: 0.10 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_name: String,
    pub category: String,
    pub unit_price: Decimal,
    /// `unit_price` scaled by the declared party size.
    pub total_price: Decimal,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub main: Recommendation,
    pub alternatives: Vec<Recommendation>,
    pub party_size: u32,
}

/// Scores every entry against the five answers and picks the winner plus up
/// to two runner-ups. Equal scores break by catalog insertion order, never
/// randomly, so a fixed catalog and answer sequence always produce the same
/// recommendation.
pub fn recommend(
    catalog: &CatalogSnapshot,
    answers: &[usize],
    party_size: u32,
    weights: &ScoringWeights,
) -> Result<RecommendationSet, EngineError> {
    if catalog.is_empty() {
        return Err(EngineError::CatalogUnavailable);
    }
    debug_assert_eq!(answers.len(), 5, "the funnel collects exactly five answers");

    let mut scored: Vec<(usize, f64)> = catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| (index, score_entry(entry, answers, weights)))
        .filter(|(_, score)| *score >= RELEVANCE_FLOOR)
        .collect();

    if scored.is_empty() {
        return Err(EngineError::NoMatch);
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0))
    });

    let party_size = party_size.max(1);
    let mut picks = scored.iter().map(|(index, score)| {
        let entry = &catalog.entries()[*index];
        Recommendation {
            product_name: entry.canonical_name.clone(),
            category: entry.category.clone(),
            unit_price: entry.unit_price,
            total_price: entry.unit_price * Decimal::from(party_size),
            score: *score,
        }
    });

    let main = picks.next().expect("scored is non-empty");
    let alternatives = picks.take(MAX_ALTERNATIVES).collect();

    Ok(RecommendationSet { main, alternatives, party_size })
}

fn score_entry(entry: &CatalogEntry, answers: &[usize], weights: &ScoringWeights) -> f64 {
    let haystack = normalize(&format!(
        "{} {} {}",
        entry.category,
        entry.canonical_name,
        entry.aliases.join(" ")
    ));

    let total = budget_score(entry.unit_price, answer(answers, 0)) * weights.budget
        + meal_type_score(&haystack, answer(answers, 1)) * weights.meal_type
        + dietary_score(&haystack, answer(answers, 2)) * weights.dietary
        + cuisine_score(&haystack, answer(answers, 3)) * weights.cuisine
        + occasion_score(entry.unit_price, &haystack, answer(answers, 4)) * weights.occasion;

    total.min(1.0)
}

fn answer(answers: &[usize], step: usize) -> usize {
    answers.get(step).copied().unwrap_or(0)
}

/// Budget bands follow the option order of question 1: full credit inside
/// the chosen band, half credit one band away.
fn budget_score(unit_price: Decimal, option: usize) -> f64 {
    if option == 0 {
        return 0.0;
    }

    let band = if unit_price < Decimal::from(5u32) {
        1
    } else if unit_price < Decimal::from(10u32) {
        2
    } else if unit_price < Decimal::from(20u32) {
        3
    } else {
        4
    };

    match (band as i32 - option as i32).abs() {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    }
}

const MEAL_TYPE_KEYWORDS: &[&[&str]] = &[
    &["desayuno", "breakfast", "tostada", "huevos", "pan", "cafe"],
    &["almuerzo", "lunch", "sandwich", "ensalada", "sopa", "bowl"],
    &["cena", "dinner", "pizza", "pasta", "parrilla", "lasagna"],
    &["snack", "galleta", "brownie", "muffin", "croissant", "postre", "torta"],
    &["bebida", "jugo", "cafe", "te", "cappuccino", "capuchino", "latte", "smoothie", "limonada"],
];

fn meal_type_score(haystack: &str, option: usize) -> f64 {
    keyword_score(haystack, MEAL_TYPE_KEYWORDS, option)
}

const DIETARY_KEYWORDS: &[&[&str]] = &[
    &["vegetariano", "vegetarian", "veggie", "verduras", "ensalada"],
    &["vegano", "vegan"],
    &["sin gluten", "gluten free"],
    &["sin lactosa", "lactose free", "deslactosado"],
    &["sin azucar", "sugar free"],
    &["light", "bajo en calorias", "fit"],
];

fn dietary_score(haystack: &str, option: usize) -> f64 {
    // Option 1 is "no restriction": every entry qualifies.
    if option == 1 {
        return 1.0;
    }
    keyword_score(haystack, DIETARY_KEYWORDS, option.saturating_sub(1))
}

const CUISINE_KEYWORDS: &[&[&str]] = &[
    &["italiana", "pizza", "pasta", "lasagna", "risotto", "panini"],
    &["mexicana", "taco", "burrito", "quesadilla", "nachos"],
    &["asiatica", "sushi", "ramen", "wok"],
    &["americana", "hamburguesa", "burger", "hot dog", "papas fritas", "alitas"],
];

fn cuisine_score(haystack: &str, option: usize) -> f64 {
    // Option 1 is "local": neutral fit for the whole catalog.
    if option == 1 {
        return 0.5;
    }
    keyword_score(haystack, CUISINE_KEYWORDS, option.saturating_sub(1))
}

const WORK_KEYWORDS: &[&str] = &["cafe", "cappuccino", "capuchino", "sandwich", "almuerzo", "ensalada"];
const FAMILY_KEYWORDS: &[&str] = &["pizza", "familiar", "combo", "parrilla", "compartir"];

fn occasion_score(unit_price: Decimal, haystack: &str, option: usize) -> f64 {
    match option {
        // Casual: everyday prices fit best.
        1 => {
            if unit_price < Decimal::from(10u32) {
                1.0
            } else {
                0.5
            }
        }
        // Celebration: favors the premium end of the menu.
        2 => {
            if unit_price >= Decimal::from(15u32) {
                1.0
            } else {
                0.3
            }
        }
        3 => {
            if contains_any(haystack, WORK_KEYWORDS) {
                1.0
            } else {
                0.4
            }
        }
        4 => {
            if contains_any(haystack, FAMILY_KEYWORDS) {
                1.0
            } else {
                0.4
            }
        }
        _ => 0.0,
    }
}

fn keyword_score(haystack: &str, table: &[&[&str]], option: usize) -> f64 {
    let Some(keywords) = option.checked_sub(1).and_then(|index| table.get(index)) else {
        return 0.0;
    };
    if contains_any(haystack, keywords) {
        1.0
    } else {
        0.0
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(&normalize(keyword)))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::catalog::{CatalogEntry, CatalogSnapshot};
    use crate::errors::EngineError;

    use super::{recommend, ScoringWeights, RELEVANCE_FLOOR};

    fn entry(name: &str, category: &str, price_cents: i64, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            canonical_name: name.to_string(),
            category: category.to_string(),
            unit_price: Decimal::new(price_cents, 2),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
        }
    }

    fn catalog_fixture() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            entry("Cappuccino", "bebidas", 350, &["capuchino"]),
            entry("Croissant", "panaderia", 225, &["croisant"]),
            entry("Pizza Familiar", "cena", 2200, &["pizza grande"]),
            entry("Ensalada César", "almuerzo", 850, &["cesar"]),
            entry("Hamburguesa Doble", "cena", 1250, &["burger doble"]),
        ])
    }

    #[test]
    fn cheap_drink_wins_for_low_budget_drink_answers() {
        // budget: hasta $5, meal: bebida, dietary: none, cuisine: local, occasion: trabajo
        let result = recommend(&catalog_fixture(), &[1, 5, 1, 1, 3], 1, &ScoringWeights::default())
            .expect("recommendation");
        assert_eq!(result.main.product_name, "Cappuccino");
    }

    #[test]
    fn family_dinner_answers_pick_the_family_pizza() {
        // budget: más de $20, meal: cena, dietary: none, cuisine: italiana, occasion: familiar
        let result = recommend(&catalog_fixture(), &[4, 3, 1, 2, 4], 1, &ScoringWeights::default())
            .expect("recommendation");
        assert_eq!(result.main.product_name, "Pizza Familiar");
    }

    #[test]
    fn same_answers_always_yield_the_same_recommendation() {
        let answers = [4, 1, 7, 3, 1];
        let first = recommend(&catalog_fixture(), &answers, 6, &ScoringWeights::default());
        let second = recommend(&catalog_fixture(), &answers, 6, &ScoringWeights::default());

        match (first, second) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.main.product_name, b.main.product_name);
                assert_eq!(a.alternatives, b.alternatives);
            }
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            other => panic!("runs diverged: {other:?}"),
        }
    }

    #[test]
    fn total_price_scales_unit_price_by_party_size() {
        let result = recommend(&catalog_fixture(), &[1, 5, 1, 1, 3], 6, &ScoringWeights::default())
            .expect("recommendation");
        assert_eq!(result.party_size, 6);
        assert_eq!(result.main.total_price, result.main.unit_price * Decimal::from(6u32));
    }

    #[test]
    fn alternatives_are_capped_at_two_and_ordered_by_score() {
        let result = recommend(&catalog_fixture(), &[2, 2, 1, 1, 1], 1, &ScoringWeights::default())
            .expect("recommendation");
        assert!(result.alternatives.len() <= 2);
        for alternative in &result.alternatives {
            assert!(alternative.score <= result.main.score);
            assert!(alternative.score >= RELEVANCE_FLOOR);
        }
    }

    #[test]
    fn empty_catalog_is_reported_as_unavailable() {
        let error = recommend(
            &CatalogSnapshot::default(),
            &[1, 1, 1, 1, 1],
            1,
            &ScoringWeights::default(),
        )
        .expect_err("empty catalog");
        assert!(matches!(error, EngineError::CatalogUnavailable));
    }

    #[test]
    fn nothing_above_the_floor_is_reported_as_no_match() {
        // A vegan request against a catalog with no vegan entries and an
        // out-of-band budget leaves every entry under the floor.
        let catalog = CatalogSnapshot::new(vec![entry("Pizza Familiar", "cena", 2200, &[])]);
        let error = recommend(&catalog, &[1, 5, 3, 3, 3], 1, &ScoringWeights::default())
            .expect_err("no relevant entry");
        assert!(matches!(error, EngineError::NoMatch));
    }

    #[test]
    fn ties_break_by_catalog_insertion_order() {
        // Two identical entries except for the name: the earlier one wins.
        let catalog = CatalogSnapshot::new(vec![
            entry("Jugo Verde", "bebidas", 300, &[]),
            entry("Jugo Rojo", "bebidas", 300, &[]),
        ]);
        let result = recommend(&catalog, &[1, 5, 1, 1, 1], 1, &ScoringWeights::default())
            .expect("recommendation");
        assert_eq!(result.main.product_name, "Jugo Verde");
    }
}

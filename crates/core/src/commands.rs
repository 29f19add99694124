//! Enumerated intent classifier for inbound messages. A single tagged union
//! with an explicit no-match variant keeps the router's priority order
//! auditable instead of scattering substring checks across handlers.

use serde::{Deserialize, Serialize};

use crate::matching::normalize::normalize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Greeting,
    MenuRequest,
    RecommendationTrigger { party_size: Option<u32> },
    Confirm,
    Cancel,
    HoursRequest,
    /// Not a recognized command; the message goes to the product matcher.
    None,
}

const CANCEL_KEYWORDS: &[&str] = &["cancelar", "cancela", "cancelo", "cancel", "ya no quiero"];
const CONFIRM_KEYWORDS: &[&str] =
    &["confirmar", "confirmo", "confirm", "confirmado", "asi esta bien", "así está bien"];
const RECOMMEND_KEYWORDS: &[&str] = &[
    "recomienda",
    "recomiendame",
    "recomiéndame",
    "recomendacion",
    "recomendación",
    "recommend",
    "sugerencia",
    "sugiereme",
    "que me recomiendas",
];
const MENU_KEYWORDS: &[&str] =
    &["menu", "menú", "carta", "catalogo", "catálogo", "productos", "ver menu"];
const HOURS_KEYWORDS: &[&str] = &["horario", "horarios", "hours", "a que hora", "abierto"];
const GREETING_KEYWORDS: &[&str] = &[
    "hola",
    "hello",
    "hi",
    "hey",
    "buenas",
    "buenos dias",
    "buenas tardes",
    "buenas noches",
    "saludos",
];

/// Classifies a raw inbound message. Priority is fixed: cancel and confirm
/// outrank the recommendation trigger, which outranks menu, hours, and
/// greeting; anything else is `None`.
pub fn classify_command(text: &str) -> CommandKind {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return CommandKind::None;
    }

    if matches_any(&normalized, CANCEL_KEYWORDS) {
        return CommandKind::Cancel;
    }
    if matches_any(&normalized, CONFIRM_KEYWORDS) {
        return CommandKind::Confirm;
    }
    if matches_any(&normalized, RECOMMEND_KEYWORDS) {
        return CommandKind::RecommendationTrigger { party_size: first_integer(&normalized) };
    }
    if matches_any(&normalized, MENU_KEYWORDS) {
        return CommandKind::MenuRequest;
    }
    if matches_any(&normalized, HOURS_KEYWORDS) {
        return CommandKind::HoursRequest;
    }
    if matches_any(&normalized, GREETING_KEYWORDS) {
        return CommandKind::Greeting;
    }

    CommandKind::None
}

/// Single-word keywords must match a whole token; multi-word keywords match
/// as normalized phrases.
fn matches_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| {
        let keyword = normalize(keyword);
        if keyword.contains(' ') {
            normalized.contains(&keyword)
        } else {
            normalized.split_whitespace().any(|token| token == keyword)
        }
    })
}

fn first_integer(normalized: &str) -> Option<u32> {
    normalized.split_whitespace().find_map(|token| token.parse::<u32>().ok())
}

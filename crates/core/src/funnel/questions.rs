//! The fixed five-question interview. Question order maps one dimension per
//! step: budget band, meal type, dietary restriction, cuisine preference,
//! occasion. Option indices are 1-based in customer-facing text and in
//! recorded answers.

pub const STEP_COUNT: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Budget,
    MealType,
    Dietary,
    Cuisine,
    Occasion,
}

#[derive(Clone, Copy, Debug)]
pub struct FunnelQuestion {
    pub dimension: Dimension,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
}

pub const QUESTIONS: [FunnelQuestion; STEP_COUNT as usize] = [
    FunnelQuestion {
        dimension: Dimension::Budget,
        prompt: "¿Cuánto te gustaría gastar por persona?",
        options: &["Hasta $5", "Entre $5 y $10", "Entre $10 y $20", "Más de $20"],
    },
    FunnelQuestion {
        dimension: Dimension::MealType,
        prompt: "¿Qué tipo de comida buscas?",
        options: &["Desayuno", "Almuerzo", "Cena", "Snack", "Bebida"],
    },
    FunnelQuestion {
        dimension: Dimension::Dietary,
        prompt: "¿Tienes alguna restricción alimentaria?",
        options: &[
            "Ninguna",
            "Vegetariano",
            "Vegano",
            "Sin gluten",
            "Sin lactosa",
            "Sin azúcar",
            "Bajo en calorías",
        ],
    },
    FunnelQuestion {
        dimension: Dimension::Cuisine,
        prompt: "¿Qué estilo de cocina prefieres?",
        options: &["Local", "Italiana", "Mexicana", "Asiática", "Americana"],
    },
    FunnelQuestion {
        dimension: Dimension::Occasion,
        prompt: "¿Para qué ocasión es?",
        options: &["Casual", "Celebración", "Trabajo", "Familiar"],
    },
];

pub fn question_for_step(step: u8) -> Option<&'static FunnelQuestion> {
    if (1..=STEP_COUNT).contains(&step) {
        Some(&QUESTIONS[(step - 1) as usize])
    } else {
        None
    }
}

/// Customer-facing rendering: prompt plus numbered options.
pub fn render_question(step: u8) -> Option<String> {
    let question = question_for_step(step)?;
    let mut text = format!("({step}/{STEP_COUNT}) {}\n", question.prompt);
    for (index, option) in question.options.iter().enumerate() {
        text.push_str(&format!("{}. {option}\n", index + 1));
    }
    text.push_str("Responde con el número de tu opción.");
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::{question_for_step, render_question, STEP_COUNT};

    #[test]
    fn every_step_has_a_question_with_options() {
        for step in 1..=STEP_COUNT {
            let question = question_for_step(step).expect("question exists");
            assert!(!question.prompt.is_empty());
            assert!(question.options.len() >= 4);
        }
        assert!(question_for_step(0).is_none());
        assert!(question_for_step(STEP_COUNT + 1).is_none());
    }

    #[test]
    fn rendered_question_lists_numbered_options() {
        let text = render_question(2).expect("step 2 renders");
        assert!(text.contains("(2/5)"));
        assert!(text.contains("1. Desayuno"));
        assert!(text.contains("5. Bebida"));
    }
}

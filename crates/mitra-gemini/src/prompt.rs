//! Prompt construction for the farming advisor.
//!
//! System-instruction injection is centralized here so every entry point
//! gets the same persona/language framing. The instruction is prepended to
//! the first User turn of an exchange — never sent as a separate turn and
//! never repeated into later turns. Callers' turn data is never mutated;
//! the builder returns a fresh sequence.

use crate::types::{Part, Role, Turn};

/// Persona + language rules for conversational chat, parameterized by the
/// target language.
pub fn system_instruction(language: &str) -> String {
    format!(
        "You are Kisan Mitra, an AI farming assistant designed specifically for Indian farmers.\n\
         \n\
         ABOUT YOU:\n\
         - Name: Kisan Mitra (किसान मित्र)\n\
         - Purpose: Help Indian farmers with agriculture, crop management, weather advice, market prices, and farming techniques\n\
         - Languages: You can communicate in 10 Indian languages - English, Hindi, Tamil, Telugu, Malayalam, Kannada, Gujarati, Bengali, Marathi, and Punjabi\n\
         - Current conversation language: {language}\n\
         \n\
         RESPONSE GUIDELINES:\n\
         1. ALWAYS respond in {language} using simple, farmer-friendly vocabulary\n\
         2. For agriculture questions, give practical, actionable advice suitable for Indian farming conditions\n\
         3. Use bullet points and clear formatting for readability\n\
         4. Include Hindi/local names for crops and practices when helpful\n\
         5. For non-agricultural topics, politely redirect to farming topics\n\
         \n\
         Be a helpful farming companion: conversational, but focused on farming."
    )
}

/// Fixed prompt for crop/plant image analysis.
pub const PATHOLOGY_INSTRUCTION: &str = "You are an expert agricultural pathologist and crop advisor for Indian farmers.\n\
    \n\
    Analyze this crop/plant image and provide:\n\
    1. Crop identification (if visible)\n\
    2. Disease/pest detection (if any)\n\
    3. Health assessment\n\
    4. Treatment recommendations (organic and chemical options)\n\
    5. Prevention tips\n\
    \n\
    ONLY discuss agriculture. If the image is not related to farming/crops, say: \
    \"This doesn't appear to be a crop or plant. Please upload an image of your crop or plant for diagnosis.\"\n\
    \n\
    Be practical and specific for Indian farming conditions.";

/// Structured advisory prompt for crop recommendation. The model answers in
/// prose; the output shape is never parsed.
pub fn crop_recommendation_prompt(soil_type: &str, location: &str, season: &str) -> String {
    format!(
        "You are an expert agricultural advisor for Indian farmers.\n\
         \n\
         Based on these farming conditions in India:\n\
         - Soil Type: {soil_type}\n\
         - Location: {location}\n\
         - Season: {season}\n\
         \n\
         Recommend the 3-4 BEST crops to grow with:\n\
         1. Crop name (in English and Hindi if possible)\n\
         2. Expected yield per acre\n\
         3. Water requirements\n\
         4. Ideal growing conditions\n\
         5. Market potential and selling price\n\
         6. Growing duration\n\
         7. Initial investment needed\n\
         \n\
         Focus on crops suitable for Indian climate and profitable in Indian markets.\n\
         Provide practical, actionable advice for Indian farmers."
    )
}

/// Return a copy of `turns` with the system instruction folded into the
/// first turn when that turn belongs to the user.
///
/// A history that opens with a Model turn is passed through unchanged — the
/// instruction was already injected when that exchange started.
pub fn inject_system_instruction(turns: &[Turn], language: &str) -> Vec<Turn> {
    let mut out: Vec<Turn> = turns.to_vec();

    if let Some(first) = out.first_mut() {
        if first.role == Role::User {
            let original = first_text(first);
            let combined = format!(
                "{}\n\nUser question: {}",
                system_instruction(language),
                original
            );
            // Replace only the leading text fragment; inline data (if any)
            // stays in place after it.
            let mut parts = vec![Part::text(combined)];
            parts.extend(
                first
                    .parts
                    .iter()
                    .filter(|p| !matches!(p, Part::Text { .. }))
                    .cloned(),
            );
            first.parts = parts;
        }
    }

    out
}

fn first_text(turn: &Turn) -> String {
    turn.parts
        .iter()
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

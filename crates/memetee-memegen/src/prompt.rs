//! Prompt assembly for the generation chain
//!
//! One enhanced prompt is built per request and shared by every strategy
//! except the legacy fallback, which deliberately sends a bare-bones one.

/// Used when the caller supplies no prompt of their own
pub const DEFAULT_PROMPT: &str = "Make it humorous and clever.";

/// Substituted when the vision step fails; keeps the run going
pub const FALLBACK_IMAGE_DESCRIPTION: &str =
    "an ordinary photo that gets funnier the longer you look at it";

/// Instruction for the vision model
pub const VISION_INSTRUCTION: &str = "You write prompts for an image generation model. \
    Describe this photo in one or two sentences, focusing on whatever makes it funny, \
    so the description can seed an internet meme. Reply with the description only.";

/// Fixed quality/format instructions appended to every enhanced prompt
const QUALITY_SUFFIX: &str = "Add a bold text overlay with a witty caption. \
    Make it suitable for social media sharing. High quality, clear text, internet meme format.";

/// Context-free prompt for the last-resort legacy strategy
pub const LEGACY_PROMPT: &str =
    "A funny internet meme with a bold, legible caption. High quality, shareable.";

/// Build the enhanced prompt shared by the main strategies
pub fn enhanced_prompt(
    image_description: Option<&str>,
    user_prompt: Option<&str>,
    style: &str,
) -> String {
    let mut prompt = String::new();

    match image_description {
        Some(description) => {
            prompt.push_str("Create a funny internet meme based on this image: ");
            prompt.push_str(description.trim().trim_end_matches('.'));
            prompt.push_str(". ");
        }
        None => prompt.push_str("Create a funny internet meme. "),
    }

    let user = user_prompt.map(str::trim).filter(|p| !p.is_empty());
    prompt.push_str(user.unwrap_or(DEFAULT_PROMPT).trim_end_matches('.'));
    prompt.push_str(". ");

    prompt.push_str("Style: ");
    prompt.push_str(style);
    prompt.push_str(". ");

    prompt.push_str(QUALITY_SUFFIX);
    prompt
}

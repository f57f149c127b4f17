//! Prompt construction for the generative text service.

use pitchboard_types::api::EnhanceAction;

pub fn enhance_prompt(action: EnhanceAction, title: &str, description: &str, pitch: &str) -> String {
    let instructions = match action {
        EnhanceAction::Rewrite => "You are a professional startup pitch writer. Rewrite the following startup pitch in a more professional, compelling tone while maintaining the core message and technical accuracy.

Instructions:
- Rewrite in a professional, engaging tone
- Fix any grammar and spelling errors
- Maintain the original meaning and key points
- Make it more compelling to investors
- Keep the same general length
- Format using Markdown",
        EnhanceAction::Improve => "You are a professional startup pitch consultant. Improve the following startup pitch by fixing grammar, enhancing clarity, and making it more professional.

Instructions:
- Fix all grammar and spelling errors
- Improve sentence structure and flow
- Enhance clarity and readability
- Make it more concise where possible
- Add professional polish
- Keep the core content intact
- Format using Markdown",
        EnhanceAction::Expand => "You are a professional startup pitch writer. Expand the following startup pitch by adding more details, clarity, and structure while keeping it focused and investor-friendly.

Instructions:
- Expand unclear or brief ideas with more detail
- Add structure (problem, solution, market, traction if mentioned)
- Clarify any ambiguous points
- Make value propositions more explicit
- Add context where needed
- Keep it concise but comprehensive (aim for 30-50% longer)
- Format using Markdown with clear sections",
    };

    format!(
        "{instructions}\n\nStartup Title: {title}\nDescription: {description}\n\nOriginal Pitch:\n{pitch}\n\nReturn ONLY the pitch content in Markdown format, without any preamble or explanation."
    )
}

pub fn suggestions_prompt(enhanced_pitch: &str) -> String {
    format!(
        "Based on this startup pitch, provide 3-5 brief, actionable suggestions for further improvement. Focus on content, structure, and messaging.\n\nPitch:\n{enhanced_pitch}\n\nReturn only a numbered list of suggestions, each on a new line. Be concise (10-15 words per suggestion)."
    )
}

/// Split the model's numbered list into at most five clean suggestions.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches('.')
                .trim_start_matches(')')
                .trim()
        })
        .filter(|line| !line.is_empty())
        .take(5)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_list_and_caps_at_five() {
        let text = "1. Tighten the opening hook\n2. Quantify the market size\n\n3) Name the competition\n4. Add traction numbers\n5. Shorten the team section\n6. Extra suggestion";
        let got = parse_suggestions(text);
        assert_eq!(got.len(), 5);
        assert_eq!(got[0], "Tighten the opening hook");
        assert_eq!(got[2], "Name the competition");
    }

    #[test]
    fn empty_input_yields_no_suggestions() {
        assert!(parse_suggestions("\n\n  \n").is_empty());
    }

    #[test]
    fn prompt_embeds_pitch_fields() {
        let p = enhance_prompt(EnhanceAction::Expand, "Acme", "Rockets", "We sell rockets.");
        assert!(p.contains("Startup Title: Acme"));
        assert!(p.contains("We sell rockets."));
        assert!(p.contains("30-50% longer"));
    }
}

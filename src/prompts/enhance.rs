use crate::consts::DEFAULT_MODEL;

const INTRO: &str = "You are a prompt enhancer that rewrites vague user requests into a structured, developer-ready task brief.";
const FRAMING_HEADER: &str = "Always reframe the prompt like this:";
const FRAMING: &[&str] = &[
    "Start with a persona-based statement: \"You are a [developer type] who wants to [goal]. Please provide a comprehensive guide that includes:\"",
    "Add a **Requirements** section: bullet points summarizing what the solution must cover.",
    "Add a **Please cover these specific areas:** section with detailed numbered subtopics, including config setup, step-by-step implementations, code snippets, and best practices.",
    "Add an **Output Format** section: what the final answer must include (code, file names, troubleshooting tips, etc.)",
];
const RULES_HEADER: &str = "Rules:";
const RULES: &[&str] = &[
    "Always return content in Markdown.",
    "Always expand vague requests into explicit, practical tasks.",
    "Always include copy-paste ready code snippets and file structure where relevant.",
    "Do not ask clarifying questions — assume sensible defaults instead.",
];

/// The fixed system instruction sent with every enhancement request.
/// Defines the output contract the surfaces rely on: persona framing, a
/// Requirements section, numbered specific areas, an output-format
/// section, Markdown throughout.
pub fn build_enhance_system_prompt() -> String {
    let framing = FRAMING
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\n{framing_header}\n\n{framing}\n\n{rules_header}\n{rules}\n",
        intro = INTRO,
        framing_header = FRAMING_HEADER,
        framing = framing,
        rules_header = RULES_HEADER,
        rules = rules
    )
}

/// Sampling temperature for enhancement calls. Low on purpose: the output
/// contract asks for structure, not variety.
pub const ENHANCE_TEMPERATURE: f32 = 0.3;

/// Effective model for a request: the caller's choice if it names one,
/// otherwise [`DEFAULT_MODEL`].
pub fn effective_model(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(model) if !model.is_empty() => model.to_string(),
        _ => DEFAULT_MODEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_contract_sections() {
        let prompt = build_enhance_system_prompt();
        assert!(prompt.contains("**Requirements**"));
        assert!(prompt.contains("**Please cover these specific areas:**"));
        assert!(prompt.contains("**Output Format**"));
    }

    #[test]
    fn prompt_demands_markdown_and_forbids_questions() {
        let prompt = build_enhance_system_prompt();
        assert!(prompt.contains("Markdown"));
        assert!(prompt.contains("Do not ask clarifying questions"));
    }

    #[test]
    fn framing_steps_are_numbered() {
        let prompt = build_enhance_system_prompt();
        assert!(prompt.contains("1. Start with a persona-based statement"));
        assert!(prompt.contains("4. Add an **Output Format** section"));
    }

    #[test]
    fn effective_model_prefers_caller_choice() {
        assert_eq!(effective_model(Some("gpt-4o")), "gpt-4o");
    }

    #[test]
    fn effective_model_falls_back_on_none() {
        assert_eq!(effective_model(None), DEFAULT_MODEL);
    }

    #[test]
    fn effective_model_falls_back_on_blank() {
        assert_eq!(effective_model(Some("")), DEFAULT_MODEL);
        assert_eq!(effective_model(Some("   ")), DEFAULT_MODEL);
    }

    #[test]
    fn effective_model_trims_whitespace() {
        assert_eq!(effective_model(Some("  gpt-4o  ")), "gpt-4o");
    }

    #[test]
    fn temperature_is_low() {
        assert!(ENHANCE_TEMPERATURE <= 0.5);
    }
}

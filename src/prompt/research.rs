//! Web research augmentation
//!
//! Instructions that ask for links, videos or articles get one web search
//! per execution, on the instruction's own text. The rendered results are
//! appended to the user message of every completion in that execution; a
//! failed search leaves the prompts untouched.

use super::{sections, PromptPair};
use crate::core::config::EngineConfig;
use crate::core::types::{collapse_whitespace, truncate_chars};
use crate::llm::LanguageModel;

/// Phrases that signal the user wants real external references
pub const RESEARCH_TRIGGERS: &[&str] = &[
    "youtube",
    "video",
    "link",
    "url",
    "article",
    "search for",
    "look up",
    "lookup",
    "website",
    "source",
    "reference",
    "recipe from",
    "blog",
    "podcast",
    "http",
    "www.",
    ".com",
    ".org",
    ".net",
    ".io",
];

const SEARCH_SYSTEM_PROMPT: &str = "You are a research assistant. Find real, currently available web resources \
     relevant to the request. For every result give its title, its full URL and one sentence on why it is relevant. \
     Never invent URLs.";

pub fn needs_web_research(instructions_text: &str) -> bool {
    let text = instructions_text.to_lowercase();
    RESEARCH_TRIGGERS.iter().any(|t| text.contains(t))
}

/// Search query derived from the instruction text
pub fn search_query(instructions_text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(instructions_text);
    truncate_chars(&collapsed, max_chars).to_string()
}

pub fn research_section(results: &str) -> String {
    format!(
        "## Web Research\n\
         The following results come from a live web search. When your answer references videos, articles or \
         other links, use ONLY these real URLs. Never fabricate or guess a URL; leave the link out if none of \
         these fit.\n\n{}\n\n## End of Web Research",
        results.trim()
    )
}

/// Run one web search and render its results as a prompt section
///
/// `None` when the instruction asks for nothing external, the model cannot
/// search, or the search fails or comes back empty.
pub async fn fetch_research(llm: &dyn LanguageModel, instructions_text: &str, config: &EngineConfig) -> Option<String> {
    if !needs_web_research(instructions_text) {
        return None;
    }
    if !llm.supports_web_search() {
        tracing::debug!("Instruction asks for web resources but the model has no web search");
        return None;
    }

    let query = search_query(instructions_text, config.web_query_chars);
    match llm.web_search(&query, SEARCH_SYSTEM_PROMPT).await {
        Ok(results) if !results.content.trim().is_empty() => {
            tracing::debug!(chars = results.content.len(), "Web research ready");
            Some(research_section(&results.content))
        }
        Ok(_) => {
            tracing::warn!("Web search returned no results, continuing without research");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Web search failed, continuing without research");
            None
        }
    }
}

/// Append a rendered research section to the user message
pub fn append_research(prompt: &mut PromptPair, section: Option<&str>) {
    if let Some(section) = section {
        prompt.user.push(sections::RESEARCH, section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers() {
        assert!(needs_web_research("Find YouTube videos for each recipe"));
        assert!(needs_web_research("add a link from seriouseats.com"));
        assert!(!needs_web_research("Suggest five dinner ideas"));
    }

    #[test]
    fn test_query_collapsed_and_truncated() {
        assert_eq!(search_query("find   a\n\nvideo", 300), "find a video");
        let long = "word ".repeat(200);
        assert_eq!(search_query(&long, 300).chars().count(), 300);
    }

    #[test]
    fn test_research_section_directive() {
        let section = research_section("1. Pad Thai - https://example.com/pad-thai\n");
        assert!(section.starts_with("## Web Research"));
        assert!(section.contains("use ONLY these real URLs"));
        assert!(section.contains("https://example.com/pad-thai"));
    }

    #[test]
    fn test_append_research_goes_last() {
        let mut prompt = PromptPair::default();
        prompt.user.push(sections::INSTRUCTIONS, "## Instructions\nFind videos");
        append_research(&mut prompt, None);
        assert!(!prompt.user.has(sections::RESEARCH));

        append_research(&mut prompt, Some("## Web Research\nresults"));
        assert_eq!(prompt.user.names().last(), Some(&sections::RESEARCH));
    }
}

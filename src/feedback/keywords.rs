//! Keyword extraction for preference matching

/// Words that carry no preference signal on their own
///
/// Covers pronouns, common verbs and adjectives, and filler words specific
/// to how people talk to the board ("cards", "generate", ...).
pub const STOP_WORDS: &[&str] = &[
    // pronouns and determiners
    "this", "that", "these", "those", "they", "them", "their", "there", "theirs", "what", "which",
    "whose", "your", "yours", "mine", "ours", "myself", "yourself", "everyone", "someone",
    "anyone", "each", "every", "some", "many", "much", "more", "most", "other", "another",
    // prepositions and conjunctions
    "with", "from", "into", "onto", "about", "above", "below", "over", "under", "than", "then",
    "when", "where", "while", "because", "since", "until", "also", "just", "only", "even",
    // common verbs
    "have", "having", "been", "being", "were", "will", "would", "could", "should", "might",
    "must", "does", "doing", "done", "make", "made", "makes", "making", "like", "likes", "love",
    "loves", "want", "wants", "prefer", "prefers", "enjoy", "enjoys", "need", "needs", "really",
    "think", "know", "feel", "keep", "give", "take", "find", "show", "tell", "please", "maybe",
    // common adjectives and adverbs
    "good", "great", "nice", "best", "better", "very", "always", "sometimes", "often", "usually",
    "things", "thing", "stuff", "something", "anything", "everything", "kind", "sort", "lots",
    // app-specific filler
    "cards", "card", "generate", "generated", "ideas", "idea", "suggest", "suggestions",
    "suggestion", "board", "column", "columns", "items", "item", "list", "food", "options",
];

/// Minimum keyword length in characters
pub const MIN_KEYWORD_CHARS: usize = 4;

/// Lowercased, deduplicated keywords of a free-text preference
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric() && c != '-') {
        let word = raw.trim_matches('-').to_lowercase();
        if word.chars().count() < MIN_KEYWORD_CHARS || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_filters_short_and_stop_words() {
        assert_eq!(extract_keywords("I love spicy Thai food"), vec!["spicy", "thai"]);
    }

    #[test]
    fn test_extract_keywords_deduplicates() {
        assert_eq!(
            extract_keywords("Gluten-free pasta, more gluten-free PASTA!"),
            vec!["gluten-free", "pasta"]
        );
    }

    #[test]
    fn test_only_filler_yields_nothing() {
        assert!(extract_keywords("Generate more cards like these").is_empty());
    }
}

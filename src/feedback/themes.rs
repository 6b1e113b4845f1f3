//! Content theme extraction from card text

use crate::board::Card;
use crate::core::config::EngineConfig;
use crate::core::types::truncate_chars;
use serde::Serialize;

/// A named group of keywords; a card matches when any keyword appears
pub struct ThemePattern {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Fixed theme catalog: cuisines, dietary terms, meal types, complexity
pub const THEME_CATALOG: &[ThemePattern] = &[
    // cuisines
    ThemePattern { name: "Italian", keywords: &["italian", "pasta", "risotto", "lasagna", "pizza"] },
    ThemePattern { name: "Mexican", keywords: &["mexican", "taco", "burrito", "enchilada", "quesadilla"] },
    ThemePattern { name: "Thai", keywords: &["thai", "pad thai", "green curry", "tom yum"] },
    ThemePattern { name: "Indian", keywords: &["indian", "curry", "masala", "tikka", "dal "] },
    ThemePattern { name: "Chinese", keywords: &["chinese", "stir fry", "stir-fry", "dumpling", "szechuan"] },
    ThemePattern { name: "Japanese", keywords: &["japanese", "sushi", "ramen", "teriyaki", "miso"] },
    ThemePattern { name: "Korean", keywords: &["korean", "kimchi", "bibimbap", "bulgogi", "gochujang"] },
    ThemePattern { name: "Vietnamese", keywords: &["vietnamese", "pho", "banh mi"] },
    ThemePattern { name: "Mediterranean", keywords: &["mediterranean", "hummus", "falafel", "tzatziki"] },
    ThemePattern { name: "Greek", keywords: &["greek", "gyro", "souvlaki", "feta"] },
    ThemePattern { name: "French", keywords: &["french", "ratatouille", "crepe", "coq au vin"] },
    ThemePattern { name: "Middle Eastern", keywords: &["middle eastern", "shawarma", "kebab", "tahini"] },
    ThemePattern { name: "American", keywords: &["american", "burger", "bbq", "barbecue", "mac and cheese"] },
    // dietary
    ThemePattern { name: "Vegetarian", keywords: &["vegetarian", "meatless", "veggie"] },
    ThemePattern { name: "Vegan", keywords: &["vegan", "plant-based", "plant based"] },
    ThemePattern { name: "Gluten-free", keywords: &["gluten-free", "gluten free", "celiac"] },
    ThemePattern { name: "Dairy-free", keywords: &["dairy-free", "dairy free", "lactose"] },
    ThemePattern { name: "Low-carb", keywords: &["low-carb", "low carb", "keto"] },
    ThemePattern { name: "High-protein", keywords: &["high-protein", "high protein", "protein-packed"] },
    ThemePattern { name: "Healthy", keywords: &["healthy", "light", "nutritious", "wholesome"] },
    ThemePattern { name: "Spicy", keywords: &["spicy", "chili", "chilli", "jalapeno", "hot sauce"] },
    ThemePattern { name: "Seafood", keywords: &["seafood", "salmon", "shrimp", "fish", "tuna"] },
    // meal types
    ThemePattern { name: "Breakfast", keywords: &["breakfast", "brunch", "pancake", "omelet", "oatmeal"] },
    ThemePattern { name: "Lunch", keywords: &["lunch", "sandwich", "wrap"] },
    ThemePattern { name: "Dessert", keywords: &["dessert", "cake", "cookie", "brownie", "ice cream"] },
    ThemePattern { name: "Soup", keywords: &["soup", "stew", "chowder", "broth"] },
    ThemePattern { name: "Salad", keywords: &["salad", "slaw"] },
    ThemePattern { name: "Snack", keywords: &["snack", "appetizer", "finger food"] },
    // complexity
    ThemePattern { name: "Quick", keywords: &["quick", "easy", "15-minute", "30-minute", "weeknight"] },
    ThemePattern { name: "One-pot", keywords: &["one-pot", "one pot", "sheet pan", "sheet-pan"] },
    ThemePattern { name: "Slow-cooked", keywords: &["slow cooker", "slow-cooked", "braised", "crockpot"] },
    ThemePattern { name: "Elaborate", keywords: &["elaborate", "gourmet", "advanced", "complex", "from scratch"] },
];

/// A qualifying theme and how many cards matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeMatch {
    pub name: &'static str,
    pub count: usize,
}

impl std::fmt::Display for ThemeMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.count)
    }
}

/// Text a card is matched on: title plus the start of its content
fn card_text(card: &Card, max_content_chars: usize) -> String {
    let content = card.content();
    format!("{} {}", card.title, truncate_chars(&content, max_content_chars)).to_lowercase()
}

/// Top themes across `cards`, most frequent first
///
/// A theme qualifies when it matches at least `max(min_matches, floor(share × cards))`
/// cards. Ties keep catalog order.
pub fn extract_themes(cards: &[&Card], config: &EngineConfig) -> Vec<ThemeMatch> {
    if cards.is_empty() {
        return Vec::new();
    }
    let threshold = config
        .theme_min_matches
        .max((config.theme_min_share * cards.len() as f64).floor() as usize);

    let texts: Vec<String> = cards
        .iter()
        .map(|c| card_text(c, config.theme_content_chars))
        .collect();

    let mut matches: Vec<ThemeMatch> = THEME_CATALOG
        .iter()
        .map(|pattern| ThemeMatch {
            name: pattern.name,
            count: texts
                .iter()
                .filter(|text| pattern.keywords.iter().any(|k| text.contains(k)))
                .count(),
        })
        .filter(|m| m.count >= threshold)
        .collect();

    // stable sort keeps catalog order among equal counts
    matches.sort_by(|a, b| b.count.cmp(&a.count));
    matches.truncate(config.max_themes);
    matches
}

/// "Thai (3), Spicy (2)"
pub fn format_themes(themes: &[ThemeMatch]) -> String {
    themes
        .iter()
        .map(ThemeMatch::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

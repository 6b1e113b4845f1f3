//! Keyword classification of instruction text into output capabilities
//!
//! Capabilities are strict opt-in: a field category may only appear in the
//! model's output when the instruction text mentions it. There is no
//! negation handling here. "Don't add tags" still enables tags, because the
//! raw instruction text (negation included) is what the model reads, and the
//! prompt still needs the tags field to honor it.

use serde::Serialize;

/// Output field categories gated by keyword presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Tasks,
    Properties,
    Tags,
    Assignment,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Tasks,
        Capability::Properties,
        Capability::Tags,
        Capability::Assignment,
    ];

    /// Lexicon matched case-insensitively as substrings
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Capability::Tasks => TASK_KEYWORDS,
            Capability::Properties => PROPERTY_KEYWORDS,
            Capability::Tags => TAG_KEYWORDS,
            Capability::Assignment => ASSIGNMENT_KEYWORDS,
        }
    }

    /// JSON field name the capability controls
    pub fn field_name(&self) -> &'static str {
        match self {
            Capability::Tasks => "tasks",
            Capability::Properties => "properties",
            Capability::Tags => "tags",
            Capability::Assignment => "assignedTo",
        }
    }

    /// Restriction line emitted into prompts when the capability is disabled
    pub fn restriction(&self) -> &'static str {
        match self {
            Capability::Tasks => "Do NOT add tasks or action items to cards.",
            Capability::Properties => "Do NOT add properties or metadata to cards.",
            Capability::Tags => "Do NOT add tags or labels to cards.",
            Capability::Assignment => "Do NOT assign cards to anyone.",
        }
    }
}

const TASK_KEYWORDS: &[&str] = &["task", "action item", "todo", "to-do", "checklist"];
const PROPERTY_KEYWORDS: &[&str] = &["property", "properties", "categorize", "metadata"];
const TAG_KEYWORDS: &[&str] = &["tag", "label"];
const ASSIGNMENT_KEYWORDS: &[&str] = &[
    "assign",
    "assignee",
    "delegate",
    "responsible",
    "owner of",
    "who should",
];

/// Enabled output capabilities for one instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub allow_tasks: bool,
    pub allow_properties: bool,
    pub allow_tags: bool,
    pub allow_assignment: bool,
}

impl Capabilities {
    /// Everything enabled; used by tests and trusted callers
    pub fn all() -> Self {
        Self {
            allow_tasks: true,
            allow_properties: true,
            allow_tags: true,
            allow_assignment: true,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Tasks => self.allow_tasks,
            Capability::Properties => self.allow_properties,
            Capability::Tags => self.allow_tags,
            Capability::Assignment => self.allow_assignment,
        }
    }

    pub fn enabled(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| self.allows(*c)).collect()
    }

    pub fn disabled(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| !self.allows(*c)).collect()
    }

    /// "Do NOT" lines for every disabled capability, in fixed order
    pub fn restrictions(&self) -> Vec<&'static str> {
        self.disabled().iter().map(Capability::restriction).collect()
    }
}

/// Classify instruction text into capabilities
pub fn parse_capabilities(instructions_text: &str) -> Capabilities {
    let text = instructions_text.to_lowercase();
    let mentions = |capability: Capability| capability.keywords().iter().any(|k| text.contains(k));

    Capabilities {
        allow_tasks: mentions(Capability::Tasks),
        allow_properties: mentions(Capability::Properties),
        allow_tags: mentions(Capability::Tags),
        allow_assignment: mentions(Capability::Assignment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_enables_nothing() {
        let caps = parse_capabilities("Suggest five cozy dinner ideas");
        assert_eq!(caps, Capabilities::default());
        assert_eq!(caps.restrictions().len(), 4);
    }

    #[test]
    fn test_each_group_detected() {
        assert!(parse_capabilities("Add a CHECKLIST").allow_tasks);
        assert!(parse_capabilities("add action items").allow_tasks);
        assert!(parse_capabilities("Categorize by cuisine").allow_properties);
        assert!(parse_capabilities("Label each card").allow_tags);
        assert!(parse_capabilities("Delegate to the team").allow_assignment);
        assert!(parse_capabilities("Who should cook this?").allow_assignment);
    }

    #[test]
    fn test_negation_still_enables() {
        let caps = parse_capabilities("Don't add tags, just rewrite titles");
        assert!(caps.allow_tags);
        assert!(!caps.allow_tasks);
        assert_eq!(caps.restrictions().len(), 3);
    }

    #[test]
    fn test_capabilities_never_inferred_from_wording_outside_lexicons() {
        let caps = parse_capabilities("Organize and enrich every card with details");
        assert!(caps.enabled().is_empty());
    }

    #[test]
    fn test_restriction_order_is_fixed() {
        let caps = Capabilities {
            allow_properties: true,
            ..Default::default()
        };
        assert_eq!(
            caps.restrictions(),
            vec![
                Capability::Tasks.restriction(),
                Capability::Tags.restriction(),
                Capability::Assignment.restriction(),
            ]
        );
    }
}

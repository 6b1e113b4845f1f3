//! Parse untrusted model output into validated results
//!
//! Model text is an external wire format. Every decoder here locates the
//! JSON payload inside whatever prose or code fences surround it, checks each
//! element's required fields, drops what does not fit, and never fails: the
//! worst case is an empty collection.

use crate::engine::result::{
    CardDraft, CardPatch, CardProperty, MoveDecision, MultiStepResult, TaskDraft,
};
use crate::instruction::{Capabilities, InstructionAction};
use serde_json::{Map, Value};

/// Keys of the unified multi-step response object
pub const GENERATED_KEY: &str = "generatedCards";
pub const MODIFIED_KEY: &str = "modifiedCards";
pub const MOVED_KEY: &str = "movedCards";

/// Outcome of scanning from one opening bracket
enum Scan<'a> {
    /// The bracket at the start closes here
    Balanced(&'a str),
    /// The text ended first; the nested spans that did close, by start offset
    Unterminated(Vec<&'a str>),
}

/// Scan for the `close` matching the `open` at `start`, skipping brackets inside strings
fn scan_span(text: &str, start: usize, open: char, close: char) -> Scan<'_> {
    let mut opens: Vec<usize> = Vec::new();
    let mut nested: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        let idx = start + offset;
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => opens.push(idx),
            c if c == close => {
                if let Some(from) = opens.pop() {
                    if opens.is_empty() {
                        return Scan::Balanced(&text[start..=idx]);
                    }
                    nested.push((from, idx));
                }
            }
            _ => {}
        }
    }

    nested.sort_unstable_by_key(|(from, _)| *from);
    Scan::Unterminated(nested.into_iter().map(|(from, to)| &text[from..=to]).collect())
}

/// Extract and parse the first JSON value delimited by `open`/`close`
///
/// Candidates are tried left to right so a stray bracket in leading prose
/// does not hide the real payload. A candidate that never closes contains
/// every later one, so its scan is the last.
fn extract_json(text: &str, open: char, close: char) -> Option<Value> {
    for (idx, _) in text.char_indices().filter(|(_, c)| *c == open) {
        match scan_span(text, idx, open, close) {
            Scan::Balanced(span) => {
                if let Ok(value) = serde_json::from_str::<Value>(span) {
                    return Some(value);
                }
            }
            Scan::Unterminated(nested) => {
                return nested
                    .into_iter()
                    .find_map(|span| serde_json::from_str::<Value>(span).ok());
            }
        }
    }
    None
}

/// First JSON array in the text, if any
pub fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    match extract_json(text, '[', ']')? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// First JSON object in the text, if any
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    match extract_json(text, '{', '}')? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Non-empty trimmed string field
fn string_field(item: &Map<String, Value>, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String elements of an array; `None` when the value is not an array or nothing survives
fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    let strings: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!strings.is_empty()).then_some(strings)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn property_array(value: Option<&Value>) -> Option<Vec<CardProperty>> {
    let items = value?.as_array()?;
    let properties: Vec<CardProperty> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            Some(CardProperty {
                key: string_field(obj, "key")?,
                value: scalar_to_string(obj.get("value")?)?,
            })
        })
        .collect();
    (!properties.is_empty()).then_some(properties)
}

fn task_array(value: Option<&Value>) -> Option<Vec<TaskDraft>> {
    let items = value?.as_array()?;
    let tasks: Vec<TaskDraft> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(TaskDraft {
                title: s.trim().to_string(),
                description: None,
            }),
            Value::Object(obj) => Some(TaskDraft {
                title: string_field(obj, "title")?,
                description: string_field(obj, "description"),
            }),
            _ => None,
        })
        .collect();
    (!tasks.is_empty()).then_some(tasks)
}

/// Decode one generated card; requires a string `title`
pub fn decode_draft(item: &Value, capabilities: &Capabilities) -> Option<CardDraft> {
    let obj = item.as_object()?;
    let title = string_field(obj, "title")?;
    let initial_message = string_field(obj, "content")
        .or_else(|| string_field(obj, "initialMessage"))
        .unwrap_or_default();

    Some(CardDraft {
        title,
        initial_message,
        column_id: string_field(obj, "columnId"),
        assigned_to: capabilities
            .allow_assignment
            .then(|| string_array(obj.get("assignedTo")))
            .flatten(),
    })
}

/// Decode one card patch; requires string `id` and `title`
pub fn decode_patch(item: &Value, capabilities: &Capabilities) -> Option<CardPatch> {
    let obj = item.as_object()?;
    let id = string_field(obj, "id")?;
    let title = string_field(obj, "title")?;

    Some(CardPatch {
        id,
        title,
        content: string_field(obj, "content"),
        tags: capabilities
            .allow_tags
            .then(|| string_array(obj.get("tags")))
            .flatten(),
        properties: capabilities
            .allow_properties
            .then(|| property_array(obj.get("properties")))
            .flatten(),
        tasks: capabilities
            .allow_tasks
            .then(|| task_array(obj.get("tasks")))
            .flatten(),
        assigned_to: capabilities
            .allow_assignment
            .then(|| string_array(obj.get("assignedTo")))
            .flatten(),
    })
}

/// Decode one move; requires string `cardId` and `destinationColumnId`
pub fn decode_move(item: &Value) -> Option<MoveDecision> {
    let obj = item.as_object()?;
    Some(MoveDecision {
        card_id: string_field(obj, "cardId")?,
        destination_column_id: string_field(obj, "destinationColumnId")?,
        reason: string_field(obj, "reason"),
    })
}

fn decode_drafts(items: &[Value], card_count: usize, capabilities: &Capabilities) -> Vec<CardDraft> {
    items
        .iter()
        .filter_map(|item| decode_draft(item, capabilities))
        .take(card_count)
        .collect()
}

fn decode_patches(items: &[Value], capabilities: &Capabilities) -> Vec<CardPatch> {
    items
        .iter()
        .filter_map(|item| decode_patch(item, capabilities))
        .collect()
}

fn decode_moves(items: &[Value]) -> Vec<MoveDecision> {
    items.iter().filter_map(decode_move).collect()
}

/// Parse a generate response, capped to `card_count` cards
pub fn parse_generate(text: &str, card_count: usize, capabilities: &Capabilities) -> Vec<CardDraft> {
    let drafts = extract_json_array(text)
        .map(|items| decode_drafts(&items, card_count, capabilities))
        .unwrap_or_default();
    tracing::debug!(count = drafts.len(), "Parsed generated cards");
    drafts
}

/// Parse a modify response
pub fn parse_modify(text: &str, capabilities: &Capabilities) -> Vec<CardPatch> {
    let patches = extract_json_array(text)
        .map(|items| decode_patches(&items, capabilities))
        .unwrap_or_default();
    tracing::debug!(count = patches.len(), "Parsed card patches");
    patches
}

/// Parse a move response; an empty array means "no moves"
pub fn parse_move(text: &str) -> Vec<MoveDecision> {
    let moves = extract_json_array(text)
        .map(|items| decode_moves(&items))
        .unwrap_or_default();
    tracing::debug!(count = moves.len(), "Parsed move decisions");
    moves
}

/// Parse a unified multi-step response object
///
/// Only collections for declared actions are kept; each is present (possibly
/// empty) even if the model left its key out.
pub fn parse_unified(
    text: &str,
    actions: &[InstructionAction],
    card_count: usize,
    capabilities: &Capabilities,
) -> MultiStepResult {
    let mut result = MultiStepResult::for_actions(actions);
    let Some(object) = extract_json_object(text) else {
        tracing::debug!("No JSON object in unified response");
        return result;
    };
    let array = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    if let Some(generated) = result.generated.as_mut() {
        *generated = decode_drafts(&array(GENERATED_KEY), card_count, capabilities);
    }
    if let Some(modified) = result.modified.as_mut() {
        *modified = decode_patches(&array(MODIFIED_KEY), capabilities);
    }
    if let Some(moved) = result.moved.as_mut() {
        *moved = decode_moves(&array(MOVED_KEY));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_round_trip() {
        let drafts = parse_generate(r#"[{"title":"X","content":"Y"}]"#, 5, &Capabilities::default());
        assert_eq!(drafts, vec![CardDraft::new("X", "Y")]);
    }

    #[test]
    fn test_not_json_is_empty() {
        assert!(parse_generate("not json", 5, &Capabilities::default()).is_empty());
        assert!(parse_modify("not json", &Capabilities::all()).is_empty());
        assert!(parse_move("not json").is_empty());
    }

    #[test]
    fn test_code_fence_and_prose_tolerated() {
        let response = "Sure! Here are [some] ideas:\n```json\n[\n  {\"title\": \"Ramen [spicy]\", \"content\": \"Use \\\"chili\\\" oil\"}\n]\n```\nEnjoy!";
        let drafts = parse_generate(response, 5, &Capabilities::default());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Ramen [spicy]");
        assert_eq!(drafts[0].initial_message, "Use \"chili\" oil");
    }

    #[test]
    fn test_generate_cap_and_invalid_items() {
        let response = r#"[{"title":"A"},{"content":"no title"},{"title":3},{"title":"B"},{"title":"C"}]"#;
        let drafts = parse_generate(response, 2, &Capabilities::default());
        let titles: Vec<_> = drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(drafts[0].initial_message, "");
    }

    #[test]
    fn test_assignment_dropped_when_disabled() {
        let response = r#"[{"title":"A","content":"x","assignedTo":["Dana"]}]"#;
        let drafts = parse_generate(response, 5, &Capabilities::default());
        assert!(drafts[0].assigned_to.is_none());

        let caps = Capabilities {
            allow_assignment: true,
            ..Default::default()
        };
        let drafts = parse_generate(response, 5, &caps);
        assert_eq!(drafts[0].assigned_to, Some(vec!["Dana".to_string()]));
    }

    #[test]
    fn test_modify_optional_arrays_validated() {
        let response = r#"[
            {"id":"c1","title":"T","tags":["a",2,"b"],"properties":[{"key":"cuisine","value":"Thai"},{"key":"servings","value":4},{"value":"orphan"}],
             "tasks":["Buy basil",{"title":"Prep"},{"nope":1}],"assignedTo":"Dana","extra":true},
            {"id":"c2"},
            {"title":"no id"}
        ]"#;
        let patches = parse_modify(response, &Capabilities::all());
        assert_eq!(patches.len(), 1);
        let patch = &patches[0];
        assert_eq!(patch.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            patch.properties,
            Some(vec![
                CardProperty { key: "cuisine".into(), value: "Thai".into() },
                CardProperty { key: "servings".into(), value: "4".into() },
            ])
        );
        assert_eq!(patch.tasks.as_ref().map(Vec::len), Some(2));
        // not an array: dropped entirely
        assert!(patch.assigned_to.is_none());
    }

    #[test]
    fn test_modify_disabled_capabilities_stripped() {
        let response = r#"[{"id":"c1","title":"T","tags":["a"],"tasks":["x"],"properties":[{"key":"k","value":"v"}]}]"#;
        let patches = parse_modify(response, &Capabilities::default());
        assert_eq!(patches[0].tags, None);
        assert_eq!(patches[0].tasks, None);
        assert_eq!(patches[0].properties, None);
    }

    #[test]
    fn test_move_requires_both_ids() {
        let response = r#"[{"cardId":"c1","destinationColumnId":"done","reason":"finished"},{"cardId":"c2"}]"#;
        let moves = parse_move(response);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].reason.as_deref(), Some("finished"));
        assert!(parse_move("No moves needed: []").is_empty());
    }

    #[test]
    fn test_unified_object() {
        let response = r#"Plan done.
{"modifiedCards":[{"id":"c1","title":"New"}],"movedCards":[{"cardId":"c1","destinationColumnId":"b"}],"generatedCards":[{"title":"ignored"}]}"#;
        let result = parse_unified(
            response,
            &[InstructionAction::Modify, InstructionAction::Move],
            5,
            &Capabilities::default(),
        );
        assert_eq!(result.modified.as_ref().map(Vec::len), Some(1));
        assert_eq!(result.moved.as_ref().map(Vec::len), Some(1));
        assert!(result.generated.is_none());
    }

    #[test]
    fn test_unified_missing_key_is_empty() {
        let result = parse_unified(
            "{\"generatedCards\": \"oops\"}",
            &[InstructionAction::Generate],
            5,
            &Capabilities::default(),
        );
        assert_eq!(result.generated, Some(Vec::new()));
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        assert!(extract_json_array(r#"{"title": "X"}"#).is_none());
        assert!(extract_json_object("[1, 2]").is_none());
    }

    #[test]
    fn test_unbalanced_is_empty() {
        assert!(parse_generate(r#"[{"title": "X""#, 5, &Capabilities::default()).is_empty());
    }

    #[test]
    fn test_payload_inside_unclosed_bracket() {
        let response = r#"Ideas [draft, see: [{"title": "A", "content": "x"}] and more"#;
        let drafts = parse_generate(response, 5, &Capabilities::default());
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "A");
    }

    #[test]
    fn test_unclosed_bracket_run_is_single_scan() {
        let noise = "[".repeat(200_000);
        assert!(extract_json_array(&noise).is_none());

        let text = format!("{}{}", "{".repeat(200_000), r#"{"movedCards": []}"#);
        assert!(extract_json_object(&text).is_some());
    }
}

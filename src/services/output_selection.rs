//! Choosing which structured output of a webhook holds the intake result
//!
//! The assistant attaches structured outputs as a JSON object keyed by output
//! id, so key order carries no meaning. Selection is deterministic:
//! 1. The first preferred name matching an entry's key or its `name` field
//! 2. Otherwise the entry with the smallest key

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Matched one of the configured output names
    Preferred,
    /// The only output present
    OnlyOutput,
    /// Several outputs, none preferred: smallest key wins
    SortedFallback,
}

#[derive(Debug)]
pub struct SelectedOutput<'a> {
    pub key: &'a str,
    /// The entry's `result`, if it has one
    pub result: Option<&'a Value>,
    pub reason: SelectionReason,
}

#[derive(Debug, Clone)]
pub struct OutputSelector {
    preferred: Vec<String>,
}

impl OutputSelector {
    pub fn new(preferred: Vec<String>) -> Self {
        Self { preferred }
    }

    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    pub fn select<'a>(&self, outputs: &'a Map<String, Value>) -> Option<SelectedOutput<'a>> {
        let mut keys: Vec<&'a String> = outputs.keys().collect();
        keys.sort();

        for name in &self.preferred {
            let found = keys.iter().find(|key| {
                key.eq_ignore_ascii_case(name)
                    || output_name(&outputs[key.as_str()])
                        .map(|n| n.eq_ignore_ascii_case(name))
                        .unwrap_or(false)
            });

            if let Some(key) = found {
                return Some(SelectedOutput {
                    key: key.as_str(),
                    result: outputs[key.as_str()].get("result"),
                    reason: SelectionReason::Preferred,
                });
            }
        }

        let first = keys.first()?;
        let reason = if keys.len() == 1 {
            SelectionReason::OnlyOutput
        } else {
            SelectionReason::SortedFallback
        };

        Some(SelectedOutput {
            key: first.as_str(),
            result: outputs[first.as_str()].get("result"),
            reason,
        })
    }
}

fn output_name(output: &Value) -> Option<&str> {
    output.get("name").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selector() -> OutputSelector {
        OutputSelector::new(vec!["lead_intake".to_string(), "intake".to_string()])
    }

    fn outputs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_select_only_output() {
        let map = outputs(json!({
            "7f3c": {"name": "whatever", "result": {"caller_name": "A"}}
        }));

        let selected = selector().select(&map).unwrap();

        assert_eq!(selected.key, "7f3c");
        assert_eq!(selected.reason, SelectionReason::OnlyOutput);
        assert_eq!(selected.result.unwrap()["caller_name"], "A");
    }

    #[test]
    fn test_select_preferred_by_name_field() {
        let map = outputs(json!({
            "aaa": {"name": "call_summary", "result": {"summary": "x"}},
            "zzz": {"name": "Lead_Intake", "result": {"caller_name": "B"}}
        }));

        let selected = selector().select(&map).unwrap();

        assert_eq!(selected.key, "zzz");
        assert_eq!(selected.reason, SelectionReason::Preferred);
    }

    #[test]
    fn test_select_preferred_by_key() {
        let map = outputs(json!({
            "aaa": {"result": {}},
            "intake": {"result": {"caller_name": "C"}}
        }));

        let selected = selector().select(&map).unwrap();

        assert_eq!(selected.key, "intake");
        assert_eq!(selected.reason, SelectionReason::Preferred);
    }

    #[test]
    fn test_preference_order_respected() {
        let map = outputs(json!({
            "a": {"name": "intake", "result": {}},
            "b": {"name": "lead_intake", "result": {}}
        }));

        assert_eq!(selector().select(&map).unwrap().key, "b");
    }

    #[test]
    fn test_fallback_is_independent_of_key_order() {
        let first = outputs(json!({
            "b-output": {"result": {"caller_name": "B"}},
            "a-output": {"result": {"caller_name": "A"}}
        }));
        let second = outputs(json!({
            "a-output": {"result": {"caller_name": "A"}},
            "b-output": {"result": {"caller_name": "B"}}
        }));

        let s1 = selector().select(&first).unwrap();
        let s2 = selector().select(&second).unwrap();

        assert_eq!(s1.key, "a-output");
        assert_eq!(s2.key, "a-output");
        assert_eq!(s1.reason, SelectionReason::SortedFallback);
    }

    #[test]
    fn test_select_empty() {
        assert!(selector().select(&Map::new()).is_none());
    }

    #[test]
    fn test_select_entry_without_result() {
        let map = outputs(json!({"only": {"name": "x"}}));
        let selected = selector().select(&map).unwrap();

        assert!(selected.result.is_none());
    }

    #[test]
    fn test_non_object_entries_tolerated() {
        let map = outputs(json!({"a": "text", "b": 3}));
        let selected = selector().select(&map).unwrap();

        assert_eq!(selected.key, "a");
        assert!(selected.result.is_none());
    }
}

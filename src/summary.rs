use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{DeliveryLine, LineState};

/// Count-based summary of a set of delivery lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u64,
    pub done: u64,
    /// Lines in `assigned`, `confirmed` or `waiting`
    pub active: u64,
    pub draft: u64,
    pub all_done: bool,
}

impl Summary {
    /// Lines counted in `total` but in none of done/active/draft.
    pub fn unclassified(&self) -> u64 {
        self.total
            .saturating_sub(self.done)
            .saturating_sub(self.active)
            .saturating_sub(self.draft)
    }

    /// Overlay a backend-supplied summary object on the zero summary, field by
    /// field. Missing or ill-typed fields keep their zero/false default.
    pub fn from_overrides(overrides: &Map<String, Value>) -> Self {
        let count = |key: &str| overrides.get(key).and_then(Value::as_u64).unwrap_or(0);
        let all_done = overrides
            .get("allDone")
            .or_else(|| overrides.get("all_done"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Summary {
            total: count("total"),
            done: count("done"),
            active: count("active"),
            draft: count("draft"),
            all_done,
        }
    }
}

/// Single-pass tally over `lines`.
pub fn aggregate(lines: &[DeliveryLine]) -> Summary {
    let mut summary = Summary {
        total: lines.len() as u64,
        ..Summary::default()
    };

    for line in lines {
        match &line.state {
            LineState::Done => summary.done += 1,
            LineState::Draft => summary.draft += 1,
            state if state.is_active() => summary.active += 1,
            _ => {}
        }
    }

    summary.all_done = summary.total > 0 && summary.done == summary.total;
    summary
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::TypeCode;

    fn lines(states: &[&str]) -> Vec<DeliveryLine> {
        states
            .iter()
            .enumerate()
            .map(|(i, s)| DeliveryLine::new(i as i64, LineState::parse(s), TypeCode::Outgoing))
            .collect()
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(
            aggregate(&[]),
            Summary {
                total: 0,
                done: 0,
                active: 0,
                draft: 0,
                all_done: false,
            }
        );
    }

    #[test]
    fn test_aggregate_mixed() {
        let summary = aggregate(&lines(&["done", "assigned", "confirmed", "waiting", "draft"]));
        assert_eq!(summary.total, 5);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.draft, 1);
        assert!(!summary.all_done);
        assert_eq!(summary.done + summary.active + summary.draft, summary.total);
    }

    #[test]
    fn test_aggregate_all_done() {
        let summary = aggregate(&lines(&["done", "done"]));
        assert!(summary.all_done);
        assert_eq!(summary.done, summary.total);
    }

    #[test]
    fn test_unknown_states_only_count_in_total() {
        let mut input = lines(&["archived", "done"]);
        input.push(DeliveryLine::from_value(&json!({"id": 9})));

        let summary = aggregate(&input);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.active, 0);
        assert_eq!(summary.draft, 0);
        assert_eq!(summary.unclassified(), 2);
        assert!(!summary.all_done);
        assert!(summary.done + summary.active + summary.draft < summary.total);
    }

    #[test]
    fn test_overrides_are_field_level() {
        let overrides = json!({"done": 99});
        let summary = Summary::from_overrides(overrides.as_object().unwrap());
        assert_eq!(summary.done, 99);
        assert_eq!(summary.total, 0);
        assert!(!summary.all_done);
    }

    #[test]
    fn test_overrides_ignore_bad_values() {
        let overrides = json!({"total": -3, "active": "2", "draft": 1.5, "all_done": true});
        let summary = Summary::from_overrides(overrides.as_object().unwrap());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.active, 0);
        assert_eq!(summary.draft, 0);
        assert!(summary.all_done);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(aggregate(&lines(&["done"]))).unwrap();
        assert_eq!(
            value,
            json!({"total": 1, "done": 1, "active": 0, "draft": 0, "allDone": true})
        );
    }
}

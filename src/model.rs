use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::summary::Summary;

/// Lifecycle state of a delivery line.
///
/// The set of states is open-ended: anything the backend sends that is not one
/// of the known five is kept verbatim in `Other`, and a missing state lands in
/// `Unknown`. Neither is counted as done, active or draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineState {
    Draft,
    Confirmed,
    Waiting,
    Assigned,
    Done,
    Other(String),
    Unknown,
}

impl LineState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "draft" => LineState::Draft,
            "confirmed" => LineState::Confirmed,
            "waiting" => LineState::Waiting,
            "assigned" => LineState::Assigned,
            "done" => LineState::Done,
            other => LineState::Other(other.to_string()),
        }
    }

    /// Read a state out of an arbitrary JSON value. Non-text values are `Unknown`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::parse(s),
            _ => LineState::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LineState::Draft => "draft",
            LineState::Confirmed => "confirmed",
            LineState::Waiting => "waiting",
            LineState::Assigned => "assigned",
            LineState::Done => "done",
            LineState::Other(s) => s,
            LineState::Unknown => "unknown",
        }
    }

    /// `assigned`, `confirmed` and `waiting` all count as in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LineState::Assigned | LineState::Confirmed | LineState::Waiting
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LineState::Other(_) | LineState::Unknown)
    }
}

impl Serialize for LineState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LineState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LineState::parse(&raw))
    }
}

/// Operation type of the transfer behind a delivery line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Incoming,
    Outgoing,
    Internal,
    Other(String),
    Unknown,
}

impl TypeCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "incoming" => TypeCode::Incoming,
            "outgoing" => TypeCode::Outgoing,
            "internal" => TypeCode::Internal,
            other => TypeCode::Other(other.to_string()),
        }
    }

    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::parse(s),
            _ => TypeCode::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeCode::Incoming => "incoming",
            TypeCode::Outgoing => "outgoing",
            TypeCode::Internal => "internal",
            TypeCode::Other(s) => s,
            TypeCode::Unknown => "unknown",
        }
    }
}

impl Serialize for TypeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TypeCode::parse(&raw))
    }
}

/// One fulfillment record as shown in the tracker.
///
/// Only `id`, `state` and `type_code` are interpreted. Everything else the
/// backend sends (name, dates, progress, products, ...) rides along in `extra`
/// and is serialized back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub state: LineState,
    pub type_code: TypeCode,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeliveryLine {
    pub fn new(id: i64, state: LineState, type_code: TypeCode) -> Self {
        DeliveryLine {
            id: Some(id),
            state,
            type_code,
            extra: Map::new(),
        }
    }

    /// Read a line out of one payload element. Never fails: a non-object
    /// element becomes a line with no identity and unknown state and type.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return DeliveryLine {
                id: None,
                state: LineState::Unknown,
                type_code: TypeCode::Unknown,
                extra: Map::new(),
            };
        };

        let mut extra = object.clone();
        let id = extra.remove("id").and_then(|v| v.as_i64());
        let state = LineState::from_value(extra.remove("state").as_ref());
        let snake = extra.remove("type_code");
        let camel = extra.remove("typeCode");
        let type_code = TypeCode::from_value(snake.as_ref().or(camel.as_ref()));

        DeliveryLine {
            id,
            state,
            type_code,
            extra,
        }
    }

    /// Identifier of the underlying record to open on activation.
    ///
    /// Payloads may carry an explicit `res_id`; otherwise the line is the record.
    pub fn record_id(&self) -> Option<i64> {
        self.extra
            .get("res_id")
            .and_then(Value::as_i64)
            .or(self.id)
    }

    /// Display name, if the backend sent one.
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

/// Canonical view of one payload: ordered lines plus their summary.
///
/// Built fresh on every normalization and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedModel {
    pub lines: Vec<DeliveryLine>,
    pub summary: Summary,
}

impl NormalizedModel {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, id: i64) -> Option<&DeliveryLine> {
        self.lines.iter().find(|line| line.id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!(LineState::parse("done"), LineState::Done);
        assert_eq!(LineState::parse("waiting"), LineState::Waiting);
        assert_eq!(
            LineState::parse("archived"),
            LineState::Other("archived".to_string())
        );
        assert!(LineState::Assigned.is_active());
        assert!(!LineState::Draft.is_active());
        assert!(!LineState::Unknown.is_known());
    }

    #[test]
    fn test_line_from_object() {
        let line = DeliveryLine::from_value(&json!({
            "id": 12,
            "state": "assigned",
            "type_code": "outgoing",
            "name": "WH/OUT/00012",
            "progress": 40.5
        }));

        assert_eq!(line.id, Some(12));
        assert_eq!(line.state, LineState::Assigned);
        assert_eq!(line.type_code, TypeCode::Outgoing);
        assert_eq!(line.name(), Some("WH/OUT/00012"));
        assert_eq!(line.extra.get("progress"), Some(&json!(40.5)));
        assert!(!line.extra.contains_key("id"));
    }

    #[test]
    fn test_line_camel_case_type_code() {
        let line = DeliveryLine::from_value(&json!({"id": 1, "typeCode": "incoming"}));
        assert_eq!(line.type_code, TypeCode::Incoming);
        assert_eq!(line.state, LineState::Unknown);
    }

    #[test]
    fn test_line_from_non_object() {
        let line = DeliveryLine::from_value(&json!(42));
        assert_eq!(line.id, None);
        assert_eq!(line.state, LineState::Unknown);
        assert_eq!(line.type_code, TypeCode::Unknown);
    }

    #[test]
    fn test_non_integer_id_is_dropped() {
        let line = DeliveryLine::from_value(&json!({"id": "7", "state": "done"}));
        assert_eq!(line.id, None);
        assert_eq!(line.state, LineState::Done);
    }

    #[test]
    fn test_record_id_prefers_res_id() {
        let line = DeliveryLine::from_value(&json!({"id": 3, "res_id": 44}));
        assert_eq!(line.record_id(), Some(44));

        let line = DeliveryLine::from_value(&json!({"id": 3}));
        assert_eq!(line.record_id(), Some(3));
    }

    #[test]
    fn test_line_serializes_passthrough_fields() {
        let line = DeliveryLine::from_value(&json!({
            "id": 5,
            "state": "archived",
            "partner": "Acme"
        }));
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(
            value,
            json!({"id": 5, "state": "archived", "type_code": "unknown", "partner": "Acme"})
        );
    }
}

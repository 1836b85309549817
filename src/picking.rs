//! Delivery lines built from stock pickings.
//!
//! An order's pickings form flows linked through move destinations
//! (pick -> pack -> ship). The tracker shows one line per flow stage that still
//! matters: a finished picking whose goods were fully handed to the next step is
//! replaced by that next step.

mod chain;
mod line;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::LineState;

pub use chain::build_tracker_lines;
pub use line::{ProductLine, TrackerLine};

const CANCEL: &str = "cancel";

/// One transfer document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picking {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "odoo_value::text")]
    pub type_code: Option<String>,
    #[serde(default, deserialize_with = "odoo_value::text")]
    pub type_name: Option<String>,
    pub state: LineState,
    #[serde(default, deserialize_with = "odoo_value::datetime")]
    pub scheduled_date: Option<chrono::NaiveDateTime>,
    #[serde(default, deserialize_with = "odoo_value::datetime")]
    pub date_done: Option<chrono::NaiveDateTime>,
    #[serde(default, deserialize_with = "odoo_value::text")]
    pub partner: Option<String>,
}

/// One product line of a picking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: i64,
    #[serde(default)]
    pub picking_id: Option<i64>,
    pub state: LineState,
    #[serde(default)]
    pub product: String,
    /// Demand
    #[serde(default)]
    pub product_uom_qty: f64,
    /// Quantity processed so far
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub uom: String,
    #[serde(default)]
    pub move_dest_ids: Vec<i64>,
}

/// Pickings and moves of one order, as exported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickingSnapshot {
    #[serde(default)]
    pub pickings: Vec<Picking>,
    #[serde(default)]
    pub moves: Vec<StockMove>,
}

impl PickingSnapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

fn is_cancelled(state: &LineState) -> bool {
    matches!(state, LineState::Other(s) if s == CANCEL)
}

/// The backend writes `false` for empty fields; read those as `None`.
mod odoo_value {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub fn datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = text(deserializer)? else {
            return Ok(None);
        };

        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
    }
}
